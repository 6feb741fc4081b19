use thiserror::Error;

use crate::models::{TaskId, TaskStatus};

/// 批量提取错误类型定义
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("批处理已在运行中")]
    AlreadyRunning,

    #[error("无效的并发数: {0}，必须大于0")]
    InvalidConcurrency(usize),

    #[error("任务 {id} 的状态无法从 {from} 变更为 {to}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("任务未找到: {0}")]
    TaskNotFound(TaskId),

    #[error("传输错误: {0}")]
    Transport(String),

    #[error("HTTP状态码错误: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    #[error("响应解析错误: {0}")]
    Decode(String),

    #[error("文件读取错误: {path} - {message}")]
    Io { path: String, message: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("结果输出错误: {0}")]
    Output(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ExtractError {
    /// 是否属于传输层失败（请求未能完整完成）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExtractError::Transport(_) | ExtractError::HttpStatus { .. } | ExtractError::Decode(_)
        )
    }
}

impl From<::config::ConfigError> for ExtractError {
    fn from(err: ::config::ConfigError) -> Self {
        ExtractError::Configuration(err.to_string())
    }
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ExtractError::Transport("connection refused".into()).is_transport());
        assert!(ExtractError::HttpStatus {
            status: 502,
            body: String::new()
        }
        .is_transport());
        assert!(ExtractError::Decode("expected value".into()).is_transport());

        assert!(!ExtractError::AlreadyRunning.is_transport());
        assert!(!ExtractError::Configuration("bad".into()).is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = ExtractError::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP状态码错误: 500 - boom");
        assert_eq!(
            ExtractError::InvalidConcurrency(0).to_string(),
            "无效的并发数: 0，必须大于0"
        );
    }
}
