use serde::{Deserialize, Serialize};

use super::validation::{ConfigValidator, ValidationUtils};
use crate::errors::Result;

/// 最大允许的并发数
pub const MAX_CONCURRENCY_LIMIT: usize = 64;

/// 提取服务客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoint_path: String,
    /// multipart 表单中文件字段的名称
    pub file_field: String,
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            endpoint_path: "/api/extract/single".to_string(),
            file_field: "file".to_string(),
            request_timeout_seconds: 120,
            connect_timeout_seconds: 10,
            user_agent: "batch-extract/1.0".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path
        )
    }
}

impl ConfigValidator for ClientConfig {
    fn validate(&self) -> Result<()> {
        ValidationUtils::validate_http_url(&self.base_url, "client.base_url")?;
        if !self.endpoint_path.starts_with('/') {
            return Err(crate::ExtractError::Configuration(format!(
                "client.endpoint_path must start with '/', got: {}",
                self.endpoint_path
            )));
        }
        ValidationUtils::validate_not_empty(&self.file_field, "client.file_field")?;
        ValidationUtils::validate_timeout_seconds(
            self.request_timeout_seconds,
            "client.request_timeout_seconds",
        )?;
        ValidationUtils::validate_timeout_seconds(
            self.connect_timeout_seconds,
            "client.connect_timeout_seconds",
        )?;
        ValidationUtils::validate_not_empty(&self.user_agent, "client.user_agent")?;
        Ok(())
    }
}

/// 调度器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 同时在途的最大请求数
    pub max_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_concurrency: 2 }
    }
}

impl ConfigValidator for SchedulerConfig {
    fn validate(&self) -> Result<()> {
        ValidationUtils::validate_count(
            self.max_concurrency,
            "scheduler.max_concurrency",
            MAX_CONCURRENCY_LIMIT,
        )
    }
}

/// 界面语言
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl std::str::FromStr for Language {
    type Err = crate::ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            _ => Err(crate::ExtractError::Configuration(format!(
                "Invalid language: {s}. Valid options: [\"en\", \"zh\"]"
            ))),
        }
    }
}

/// 结果输出配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 设置后将提取结果写入该目录下的 `.txt` 文件
    pub output_dir: Option<String>,
    /// 控制台预览的最大字符数
    pub preview_chars: usize,
    /// 是否在控制台打印完整文本
    pub print_content: bool,
    pub language: Language,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            preview_chars: 2000,
            print_content: false,
            language: Language::En,
        }
    }
}

impl ConfigValidator for OutputConfig {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            ValidationUtils::validate_not_empty(dir, "output.output_dir")?;
        }
        ValidationUtils::validate_count(self.preview_chars, "output.preview_chars", 1_000_000)?;
        Ok(())
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = crate::ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(crate::ExtractError::Configuration(format!(
                "不支持的日志格式: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> Result<()> {
        ValidationUtils::validate_one_of(
            &self.log_level,
            "observability.log_level",
            &["trace", "debug", "info", "warn", "error"],
        )
    }
}
