//! 界面文案查找

pub use extract_core::config::Language;
use extract_core::TaskStatus;

/// 按语言查找文案，未知的键原样返回
pub fn t<'a>(lang: Language, key: &'a str) -> &'a str {
    let text = match lang {
        Language::En => english(key),
        Language::Zh => chinese(key),
    };
    text.unwrap_or(key)
}

/// 任务状态对应的文案
pub fn status_label(lang: Language, status: TaskStatus) -> &'static str {
    let key = match status {
        TaskStatus::Pending => "statusPending",
        TaskStatus::InFlight => "statusUploading",
        TaskStatus::Done => "statusSuccess",
        TaskStatus::Failed => "statusError",
    };
    t(lang, key)
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "statusPending" => "Pending",
        "statusUploading" => "Uploading / Processing",
        "statusSuccess" => "Completed",
        "statusError" => "Failed",
        "uploadError" => "Upload or extraction failed, please try again later",
        "downloadFail" => "No text available to download",
        "error" => "Error",
        "fileType" => "File type",
        "currentTasks" => "Current tasks",
        "noTasks" => "No tasks yet, select some files to begin",
        "processing" => "Processing...",
        "startExtract" => "Start extraction",
        "saved" => "Saved",
        "skippedInput" => "Skipped input",
        "summary" => "Summary",
        _ => return None,
    })
}

fn chinese(key: &str) -> Option<&'static str> {
    Some(match key {
        "statusPending" => "等待中",
        "statusUploading" => "上传 / 解析中",
        "statusSuccess" => "已完成",
        "statusError" => "失败",
        "uploadError" => "上传或解析失败，请稍后重试",
        "downloadFail" => "没有可下载的文本",
        "error" => "错误",
        "fileType" => "文件类型",
        "currentTasks" => "当前任务",
        "noTasks" => "暂无任务，请先选择文件",
        "processing" => "处理中...",
        "startExtract" => "开始提取",
        "saved" => "已保存",
        "skippedInput" => "已跳过的输入",
        "summary" => "统计",
        _ => return None,
    })
}
