use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{ExtractError, Result};

/// 源文件句柄
///
/// 持有文件的名称、大小、MIME类型和字节内容。句柄创建后不可变，
/// 字节通过 `Arc<[u8]>` 共享，克隆句柄不会复制文件内容。
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    size: u64,
    content_type: Option<String>,
    bytes: Arc<[u8]>,
}

impl FileHandle {
    /// 从文件名和字节内容创建句柄，MIME类型根据扩展名推断
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        let content_type = mime_guess::from_path(&name)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Self {
            size: bytes.len() as u64,
            name,
            content_type,
            bytes,
        }
    }

    /// 显式指定MIME类型
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// 从本地路径读取文件
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| ExtractError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// 字节内容可能很大，Debug 输出只保留元数据
impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish()
    }
}
