//! 配置管理
//!
//! 配置按以下优先级合并（从低到高）：
//!
//! 1. 内置默认值
//! 2. TOML 配置文件（显式指定，或默认位置 `batch-extract.toml` / `config/batch-extract.toml`）
//! 3. 以 `EXTRACT__` 为前缀、`__` 为分隔符的环境变量，例如 `EXTRACT__CLIENT__BASE_URL`
//!
//! ```rust,no_run
//! use extract_core::config::AppConfig;
//!
//! let config = AppConfig::load(Some("config/batch-extract.toml")).unwrap();
//! println!("endpoint: {}", config.client.endpoint_url());
//! ```

pub mod models;
pub mod validation;

use std::path::Path;

use ::config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub use models::*;
pub use validation::{ConfigValidator, ValidationUtils};

use crate::errors::{ExtractError, Result};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "EXTRACT";

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["batch-extract.toml", "config/batch-extract.toml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub scheduler: SchedulerConfig,
    pub output: OutputConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_env(
            config_path,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    /// 使用指定的环境变量来源加载配置
    pub fn load_with_env(config_path: Option<&str>, env: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        match config_path {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(ExtractError::Configuration(format!(
                        "配置文件不存在: {path}"
                    )));
                }
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
            None => {
                if let Some(path) = DEFAULT_CONFIG_PATHS
                    .iter()
                    .find(|path| Path::new(path).exists())
                {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                }
            }
        }

        let config: AppConfig = builder
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str)
            .map_err(|e| ExtractError::Configuration(format!("解析TOML配置失败: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractError::Configuration(format!("序列化配置为TOML失败: {e}")))
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.scheduler.validate()?;
        self.output.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
