//! 提取服务客户端接口定义
//!
//! 调度器只依赖 [`ExtractionClient`] 抽象，不关心底层传输方式。
//! 任何返回 `Err` 的调用都被视为传输失败，调度器不会区分具体错误子类型。
//!
//! ## 实现自定义客户端
//!
//! ```rust
//! use async_trait::async_trait;
//! use extract_core::models::{ExtractResult, FileHandle};
//! use extract_core::traits::ExtractionClient;
//! use extract_core::Result;
//!
//! pub struct EchoClient;
//!
//! #[async_trait]
//! impl ExtractionClient for EchoClient {
//!     async fn submit(&self, file: &FileHandle) -> Result<ExtractResult> {
//!         Ok(ExtractResult {
//!             file_name: Some(file.name().to_string()),
//!             file_size: Some(file.size()),
//!             content: Some(String::from_utf8_lossy(file.bytes()).into_owned()),
//!             ..Default::default()
//!         })
//!     }
//!
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::models::{ExtractResult, FileHandle};
use crate::Result;

/// 远程提取服务客户端
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// 提交单个文件进行文本提取
    ///
    /// 服务端语义失败（`error_msg` 有值）以 `Ok` 返回；
    /// 网络错误、非2xx状态码或响应体无法解析以 `Err` 返回。
    async fn submit(&self, file: &FileHandle) -> Result<ExtractResult>;

    /// 客户端名称，用于日志
    fn name(&self) -> &str;
}
