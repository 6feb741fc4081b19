use std::time::Duration;

use async_trait::async_trait;
use extract_core::config::ClientConfig;
use extract_core::{ExtractError, ExtractResult, ExtractionClient, FileHandle, Result};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

/// 错误响应体保留的最大字符数
const MAX_ERROR_BODY_CHARS: usize = 512;

/// 基于 reqwest 的提取服务客户端
///
/// 每次调用向 `{base_url}{endpoint_path}` 发送一个 multipart 请求，
/// 表单中只有一个文件字段。客户端本身无状态，可被多个worker共享。
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    http_client: reqwest::Client,
    endpoint_url: String,
    file_field: String,
}

/// HTTP客户端构建器
pub struct HttpExtractionClientBuilder {
    base_url: String,
    endpoint_path: String,
    file_field: String,
    request_timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
}

impl HttpExtractionClientBuilder {
    /// 创建新的构建器，其余参数使用默认配置
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: base_url.into(),
            endpoint_path: defaults.endpoint_path,
            file_field: defaults.file_field,
            request_timeout: Duration::from_secs(defaults.request_timeout_seconds),
            connect_timeout: Duration::from_secs(defaults.connect_timeout_seconds),
            user_agent: defaults.user_agent,
        }
    }

    /// 设置提取接口路径
    pub fn endpoint_path(mut self, endpoint_path: impl Into<String>) -> Self {
        self.endpoint_path = endpoint_path.into();
        self
    }

    /// 设置 multipart 文件字段名
    pub fn file_field(mut self, file_field: impl Into<String>) -> Self {
        self.file_field = file_field.into();
        self
    }

    /// 设置单次请求的总超时
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// 构建客户端
    pub fn build(self) -> Result<HttpExtractionClient> {
        if !self.endpoint_path.starts_with('/') {
            return Err(ExtractError::Configuration(format!(
                "接口路径必须以 '/' 开头: {}",
                self.endpoint_path
            )));
        }
        if self.file_field.trim().is_empty() {
            return Err(ExtractError::Configuration("文件字段名不能为空".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| ExtractError::Configuration(format!("创建HTTP客户端失败: {e}")))?;

        let endpoint_url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path
        );
        debug!("提取服务地址: {}", endpoint_url);

        Ok(HttpExtractionClient {
            http_client,
            endpoint_url,
            file_field: self.file_field,
        })
    }
}

impl HttpExtractionClient {
    pub fn builder(base_url: impl Into<String>) -> HttpExtractionClientBuilder {
        HttpExtractionClientBuilder::new(base_url)
    }

    /// 根据客户端配置创建
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::builder(config.base_url.clone())
            .endpoint_path(config.endpoint_path.clone())
            .file_field(config.file_field.clone())
            .request_timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    fn build_form(&self, file: &FileHandle) -> Result<Form> {
        let mut part = Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type).map_err(|e| {
                ExtractError::Internal(format!("无效的MIME类型 {content_type}: {e}"))
            })?;
        }
        Ok(Form::new().part(self.file_field.clone(), part))
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn submit(&self, file: &FileHandle) -> Result<ExtractResult> {
        let form = self.build_form(file)?;

        debug!(
            "提交文件到提取服务: file={}, size={}, url={}",
            file.name(),
            file.size(),
            self.endpoint_url
        );

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(format!("请求提取服务失败: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!("提取服务返回错误: file={}, HTTP {} - {}", file.name(), status, body);
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractError::Transport(format!("读取响应失败: {e}")))?;
        let mut result: ExtractResult = serde_json::from_slice(&bytes)
            .map_err(|e| ExtractError::Decode(format!("{}: {e}", file.name())))?;

        if result.file_name.is_none() {
            result.file_name = Some(file.name().to_string());
        }
        if result.file_size.is_none() {
            result.file_size = Some(file.size());
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "http"
    }
}
