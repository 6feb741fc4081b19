//! Structured logging utilities
//!
//! Every scheduler lifecycle event is emitted through `tracing` with an
//! `event` field so that JSON log output can be filtered per event type.

use tracing::{error, info, warn};

use crate::models::{RunSummary, TaskSnapshot};

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    /// Log a batch of tasks appended to the queue
    pub fn log_tasks_enqueued(count: usize, queue_len: usize) {
        info!(
            event = "tasks_enqueued",
            tasks.count = count,
            queue.len = queue_len,
            "Tasks enqueued"
        );
    }

    /// Log the start of a run
    pub fn log_run_started(pending: usize, max_concurrency: usize) {
        info!(
            event = "run_started",
            run.pending = pending,
            run.max_concurrency = max_concurrency,
            "Batch run started"
        );
    }

    /// Log a rejected run request
    pub fn log_run_rejected(reason: &str) {
        warn!(event = "run_rejected", run.reason = reason, "Batch run rejected");
    }

    /// Log a task claimed by a worker
    pub fn log_task_claimed(worker_index: usize, task: &TaskSnapshot) {
        info!(
            event = "task_claimed",
            worker.index = worker_index,
            task.id = %task.id,
            task.file_name = %task.file_name,
            task.file_size = task.file_size,
            "Task claimed"
        );
    }

    /// Log a task whose extraction call completed
    pub fn log_task_completed(worker_index: usize, task: &TaskSnapshot, duration_ms: i64) {
        let error_msg = task.result.as_ref().and_then(|r| r.error_msg.as_deref());
        let extraction_failed = task
            .result
            .as_ref()
            .is_some_and(|r| r.is_extraction_failure());

        if extraction_failed {
            warn!(
                event = "task_extraction_failed",
                worker.index = worker_index,
                task.id = %task.id,
                task.file_name = %task.file_name,
                task.duration_ms = duration_ms,
                task.error = error_msg.unwrap_or("unknown"),
                "Service reported an extraction failure"
            );
        } else {
            info!(
                event = "task_completed",
                worker.index = worker_index,
                task.id = %task.id,
                task.file_name = %task.file_name,
                task.duration_ms = duration_ms,
                task.file_type = task
                    .result
                    .as_ref()
                    .and_then(|r| r.file_type.as_deref())
                    .unwrap_or("N/A"),
                "Task completed"
            );
        }
    }

    /// Log a task that failed at the transport level
    pub fn log_task_failed(worker_index: usize, task: &TaskSnapshot, error_message: &str) {
        error!(
            event = "task_failed",
            worker.index = worker_index,
            task.id = %task.id,
            task.file_name = %task.file_name,
            task.error = error_message,
            "Task failed"
        );
    }

    /// Log the end of a run
    pub fn log_run_finished(summary: &RunSummary) {
        info!(
            event = "run_finished",
            run.total = summary.total,
            run.done = summary.done,
            run.failed = summary.failed,
            run.extraction_failures = summary.extraction_failures,
            run.elapsed_ms = summary.elapsed_ms,
            "Batch run finished"
        );
    }
}
