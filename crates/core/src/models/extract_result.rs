use serde::{Deserialize, Serialize};

/// 远程提取服务返回的结果
///
/// 所有字段相互独立且均可为空。`error_msg` 有值而 `content` 为空表示
/// HTTP 调用本身成功、但服务端未能提取出文本（提取失败），这与传输失败不同。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractResult {
    /// 原始文件名
    pub file_name: Option<String>,
    /// 文件大小（字节数）
    pub file_size: Option<u64>,
    /// 识别出的文件类型，如 PDF/WORD/TXT 等
    pub file_type: Option<String>,
    /// 提取出的纯文本内容
    pub content: Option<String>,
    /// 服务端错误信息
    pub error_msg: Option<String>,
}

impl ExtractResult {
    /// 服务端报告的语义失败
    pub fn is_extraction_failure(&self) -> bool {
        self.error_msg.is_some() && self.content.is_none()
    }

    /// 是否携带可复制/下载的文本
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}
