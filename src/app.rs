use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use extract_client::HttpExtractionClient;
use extract_core::config::AppConfig;
use extract_core::{
    ExtractionClient, FileHandle, RunSummary, TaskEvent, TaskId, TaskObserver, TaskSnapshot,
    TaskStatus,
};
use extract_dispatcher::BatchScheduler;
use tracing::{error, info, warn};

use crate::i18n::{status_label, t, Language};
use crate::output::{format_size, preview, Delivery, DownloadSink, StdoutSink, TextSink};

/// 无法读取而被跳过的输入文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: String,
}

/// 单个任务在单个输出目的地上的交付记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub task_id: TaskId,
    pub file_name: String,
    pub sink: String,
    pub outcome: std::result::Result<Delivery, String>,
}

/// 一次批处理的完整报告
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: RunSummary,
    /// 本次运行涉及的任务，按入队顺序
    pub tasks: Vec<TaskSnapshot>,
    pub skipped_inputs: Vec<SkippedInput>,
    pub deliveries: Vec<DeliveryRecord>,
}

impl BatchReport {
    /// 所有输入都已加载，且没有任务发生传输失败
    pub fn is_success(&self) -> bool {
        !self.tasks.is_empty() && self.summary.failed == 0
    }

    pub fn has_transport_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// 渲染最终结果表
    pub fn render(&self, lang: Language) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", t(lang, "currentTasks"), self.tasks.len());

        if self.tasks.is_empty() {
            let _ = writeln!(out, "{}", t(lang, "noTasks"));
        }

        for (index, task) in self.tasks.iter().enumerate() {
            let file_type = task
                .result
                .as_ref()
                .and_then(|r| r.file_type.as_deref())
                .unwrap_or("N/A");
            let _ = writeln!(
                out,
                "{:>3}  {:<24}  {:>10}  {:<10}  {}",
                index + 1,
                status_label(lang, task.status),
                format_size(task.file_size),
                file_type,
                task.file_name
            );

            if let Some(message) = task.result.as_ref().and_then(|r| r.error_msg.as_deref()) {
                let _ = writeln!(out, "     {}: {}", t(lang, "error"), message);
            }
            if task.status == TaskStatus::Failed {
                let _ = writeln!(out, "     {}", t(lang, "uploadError"));
            }
            for record in self.deliveries.iter().filter(|d| d.task_id == task.id) {
                match &record.outcome {
                    Ok(Delivery::Written(path)) => {
                        let _ = writeln!(out, "     {}: {}", t(lang, "saved"), path.display());
                    }
                    Ok(Delivery::Printed) => {}
                    Ok(Delivery::Skipped(reason)) | Err(reason) => {
                        let _ = writeln!(out, "     [{}] {}", record.sink, reason);
                    }
                }
            }
        }

        for skipped in &self.skipped_inputs {
            let _ = writeln!(
                out,
                "{}: {} ({})",
                t(lang, "skippedInput"),
                skipped.path.display(),
                skipped.reason
            );
        }

        let _ = writeln!(
            out,
            "{}: total={} done={} failed={} extraction_failures={} elapsed={}ms",
            t(lang, "summary"),
            self.summary.total,
            self.summary.done,
            self.summary.failed,
            self.summary.extraction_failures,
            self.summary.elapsed_ms
        );
        out
    }
}

/// 在控制台逐行打印每次状态变更
pub struct ConsoleObserver {
    language: Language,
    preview_chars: usize,
    show_preview: bool,
}

impl ConsoleObserver {
    pub fn new(language: Language, preview_chars: usize, show_preview: bool) -> Self {
        Self {
            language,
            preview_chars,
            show_preview,
        }
    }

    pub fn render(&self, event: &TaskEvent) -> String {
        let task = &event.snapshot;
        let mut line = format!(
            "[{}] {} ({})",
            status_label(self.language, event.status),
            task.file_name,
            format_size(task.file_size)
        );

        match event.status {
            TaskStatus::Done => {
                if let Some(result) = &task.result {
                    let _ = write!(
                        line,
                        " {}: {}",
                        t(self.language, "fileType"),
                        result.file_type.as_deref().unwrap_or("N/A")
                    );
                    if let Some(message) = &result.error_msg {
                        let _ = write!(line, "\n    {}: {}", t(self.language, "error"), message);
                    }
                    if let (true, Some(content)) = (self.show_preview, &result.content) {
                        let _ = write!(line, "\n{}", preview(content, self.preview_chars));
                    }
                }
            }
            TaskStatus::Failed => {
                let _ = write!(line, "\n    {}", t(self.language, "uploadError"));
                if let Some(error) = &task.error {
                    let _ = write!(line, " ({error})");
                }
            }
            TaskStatus::Pending | TaskStatus::InFlight => {}
        }
        line
    }
}

impl TaskObserver for ConsoleObserver {
    fn on_task_event(&self, event: &TaskEvent) {
        println!("{}", self.render(event));
    }
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    scheduler: BatchScheduler,
    sinks: Vec<Box<dyn TextSink>>,
}

impl Application {
    /// 使用配置中的HTTP提取服务创建应用
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = HttpExtractionClient::from_config(&config.client)
            .context("创建提取服务客户端失败")?;
        info!("提取服务地址: {}", client.endpoint_url());
        Self::with_client(config, Arc::new(client))
    }

    /// 使用任意提取客户端创建应用
    pub fn with_client(config: AppConfig, client: Arc<dyn ExtractionClient>) -> Result<Self> {
        let scheduler = BatchScheduler::from_config(client, &config.scheduler)
            .context("创建批量调度器失败")?;

        let mut sinks: Vec<Box<dyn TextSink>> = Vec::new();
        if let Some(dir) = &config.output.output_dir {
            sinks.push(Box::new(
                DownloadSink::new(dir, config.output.language)
                    .with_context(|| format!("初始化输出目录失败: {dir}"))?,
            ));
        }
        if config.output.print_content {
            sinks.push(Box::new(StdoutSink::new(config.output.language)));
        }

        scheduler.add_observer(Arc::new(ConsoleObserver::new(
            config.output.language,
            config.output.preview_chars,
            !config.output.print_content,
        )));

        Ok(Self {
            config,
            scheduler,
            sinks,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    /// 加载输入文件、执行一次批处理并交付结果
    pub async fn run(&self, paths: &[PathBuf]) -> Result<BatchReport> {
        let (files, skipped_inputs) = load_inputs(paths).await;
        let language = self.config.output.language;

        if files.is_empty() {
            warn!("没有可处理的输入文件");
            return Ok(BatchReport {
                skipped_inputs,
                ..Default::default()
            });
        }

        let ids = self.scheduler.enqueue(files);
        println!("{}", start_banner(language, ids.len()));

        let summary = self.scheduler.start().await.context("批处理运行失败")?;
        let tasks: Vec<TaskSnapshot> = ids
            .iter()
            .filter_map(|id| self.scheduler.task(*id))
            .collect();

        let deliveries = self.deliver(&tasks);

        Ok(BatchReport {
            summary,
            tasks,
            skipped_inputs,
            deliveries,
        })
    }

    fn deliver(&self, tasks: &[TaskSnapshot]) -> Vec<DeliveryRecord> {
        let mut records = Vec::new();
        for task in tasks.iter().filter(|task| task.status == TaskStatus::Done) {
            for sink in &self.sinks {
                let outcome = sink.deliver(task).map_err(|e| {
                    error!("交付提取结果失败: file={}, sink={}, error={e}", task.file_name, sink.name());
                    e.to_string()
                });
                records.push(DeliveryRecord {
                    task_id: task.id,
                    file_name: task.file_name.clone(),
                    sink: sink.name().to_string(),
                    outcome,
                });
            }
        }
        records
    }
}

fn start_banner(lang: Language, count: usize) -> String {
    format!(
        "{} ({}: {}) {}",
        t(lang, "startExtract"),
        t(lang, "currentTasks"),
        count,
        t(lang, "processing")
    )
}

/// 按参数顺序读取输入文件，无法读取的文件被跳过
async fn load_inputs(paths: &[PathBuf]) -> (Vec<FileHandle>, Vec<SkippedInput>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();

    for path in paths {
        match load_input(path).await {
            Ok(file) => files.push(file),
            Err(reason) => {
                warn!("跳过无法读取的输入: {} - {}", path.display(), reason);
                skipped.push(SkippedInput {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    (files, skipped)
}

async fn load_input(path: &Path) -> std::result::Result<FileHandle, String> {
    if tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
    {
        return Err("is a directory".to_string());
    }
    FileHandle::from_path(path).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract_core::{ExtractResult, Task};

    fn event_for(result: Option<ExtractResult>, error: Option<&str>) -> TaskEvent {
        let mut task = Task::new(FileHandle::new("doc.pdf", vec![0u8; 2048]));
        task.claim().unwrap();
        match (result, error) {
            (Some(result), _) => task.finish_done(result).unwrap(),
            (None, Some(error)) => task.finish_failed(error).unwrap(),
            (None, None) => {}
        }
        TaskEvent::from(task.snapshot())
    }

    #[test]
    fn test_console_line_for_in_flight() {
        let observer = ConsoleObserver::new(Language::En, 10, true);
        let line = observer.render(&event_for(None, None));
        assert_eq!(line, "[Uploading / Processing] doc.pdf (2.00 KB)");
    }

    #[test]
    fn test_console_line_for_done_with_preview() {
        let observer = ConsoleObserver::new(Language::En, 5, true);
        let line = observer.render(&event_for(
            Some(ExtractResult {
                file_type: Some("PDF".into()),
                content: Some("hello world".into()),
                ..Default::default()
            }),
            None,
        ));
        assert!(line.starts_with("[Completed] doc.pdf (2.00 KB) File type: PDF"));
        assert!(line.ends_with("\nhello..."));
    }

    #[test]
    fn test_console_line_for_failure() {
        let observer = ConsoleObserver::new(Language::Zh, 10, false);
        let line = observer.render(&event_for(None, Some("connection reset")));
        assert!(line.starts_with("[失败] doc.pdf"));
        assert!(line.contains("上传或解析失败"));
        assert!(line.contains("connection reset"));
    }

    #[test]
    fn test_start_banner() {
        assert_eq!(
            start_banner(Language::En, 3),
            "Start extraction (Current tasks: 3) Processing..."
        );
        assert_eq!(start_banner(Language::Zh, 1), "开始提取 (当前任务: 1) 处理中...");
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport::default();
        assert!(!report.is_success());
        let rendered = report.render(Language::En);
        assert!(rendered.contains("Current tasks: 0"));
        assert!(rendered.contains("No tasks yet"));
    }
}
