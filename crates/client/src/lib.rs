//! 远程提取服务的HTTP客户端
//!
//! 以 multipart 表单把文件提交到提取服务，并把响应解析为 [`ExtractResult`]。
//!
//! [`ExtractResult`]: extract_core::ExtractResult

pub mod http_client;

pub use http_client::{HttpExtractionClient, HttpExtractionClientBuilder};
