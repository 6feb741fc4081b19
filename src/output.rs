//! 提取结果的输出
//!
//! [`TextSink`] 接收已完成任务的快照并把提取出的文本交付到某个目的地：
//! [`DownloadSink`] 写入 `.txt` 文件，[`StdoutSink`] 打印到标准输出。
//! 没有文本的任务不会被交付，而是返回 [`Delivery::Skipped`]。

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use extract_core::{ExtractError, Result, TaskSnapshot};
use tracing::{debug, info};

use crate::i18n::{t, Language};

/// 没有文件名时使用的默认名称
const DEFAULT_FILE_STEM: &str = "extract";

/// 一次交付的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// 写入到指定文件
    Written(PathBuf),
    /// 已打印到标准输出
    Printed,
    /// 没有可交付的文本
    Skipped(String),
}

/// 结果输出目的地
pub trait TextSink: Send + Sync {
    fn name(&self) -> &str;

    fn deliver(&self, snapshot: &TaskSnapshot) -> Result<Delivery>;
}

/// 把提取文本写入输出目录下的 `<fileName>.txt`
pub struct DownloadSink {
    dir: PathBuf,
    language: Language,
    used_names: Mutex<HashSet<String>>,
}

impl DownloadSink {
    /// 创建输出目录（如不存在）
    pub fn new(dir: impl Into<PathBuf>, language: Language) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ExtractError::Output(format!("创建输出目录失败: {} - {e}", dir.display()))
        })?;

        Ok(Self {
            dir,
            language,
            used_names: Mutex::new(HashSet::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 为快照选择一个不冲突的输出文件名
    fn reserve_name(&self, snapshot: &TaskSnapshot) -> String {
        let stem = sanitize(download_stem(snapshot));
        let mut used = self
            .used_names
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut candidate = format!("{stem}.txt");
        let mut n = 1;
        while used.contains(&candidate) || self.dir.join(&candidate).exists() {
            candidate = format!("{stem}-{n}.txt");
            n += 1;
        }
        used.insert(candidate.clone());
        candidate
    }
}

impl TextSink for DownloadSink {
    fn name(&self) -> &str {
        "download"
    }

    fn deliver(&self, snapshot: &TaskSnapshot) -> Result<Delivery> {
        let Some(content) = snapshot.content() else {
            return Ok(Delivery::Skipped(t(self.language, "downloadFail").to_string()));
        };

        let file_name = self.reserve_name(snapshot);
        let path = self.dir.join(&file_name);
        std::fs::write(&path, content.as_bytes()).map_err(|e| {
            ExtractError::Output(format!("写入结果文件失败: {} - {e}", path.display()))
        })?;

        info!(
            task.id = %snapshot.id,
            path = %path.display(),
            "提取结果已写入文件"
        );
        Ok(Delivery::Written(path))
    }
}

/// 在标准输出打印完整的提取文本
pub struct StdoutSink {
    language: Language,
}

impl StdoutSink {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn render(&self, snapshot: &TaskSnapshot, content: &str) -> String {
        format!("===== {} =====\n{}\n", download_stem(snapshot), content)
    }
}

impl TextSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn deliver(&self, snapshot: &TaskSnapshot) -> Result<Delivery> {
        let Some(content) = snapshot.content() else {
            return Ok(Delivery::Skipped(t(self.language, "downloadFail").to_string()));
        };

        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(self.render(snapshot, content).as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| ExtractError::Output(format!("写入标准输出失败: {e}")))?;

        debug!(task.id = %snapshot.id, "提取结果已打印");
        Ok(Delivery::Printed)
    }
}

/// 下载文件名的主体：优先使用服务端返回的文件名
fn download_stem(snapshot: &TaskSnapshot) -> &str {
    snapshot
        .result
        .as_ref()
        .and_then(|r| r.file_name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_STEM)
}

// 服务端返回的文件名不可信，去掉路径分隔符
fn sanitize(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => DEFAULT_FILE_STEM.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// 以 1024 为基数格式化文件大小，保留两位小数
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.2} KB");
    }
    format!("{:.2} MB", kb / 1024.0)
}

/// 截取前 `max_chars` 个字符作为预览，被截断时追加 `...`
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}
