use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ExtractResult, FileHandle};
use crate::errors::{ExtractError, Result};

/// 任务唯一标识
///
/// 在入队时生成，整个生命周期内保持不变。不从文件名推导，因为多个文件可能同名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 任务状态
///
/// 只允许单向流转 `pending → in-flight → {done | failed}`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-flight")]
    InFlight,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "failed")]
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InFlight => "in-flight",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    /// 终态：不会再发生任何状态变更
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InFlight)
                | (TaskStatus::InFlight, TaskStatus::Done)
                | (TaskStatus::InFlight, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个文件的提取任务
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    file: FileHandle,
    status: TaskStatus,
    result: Option<ExtractResult>,
    error: Option<String>,
    enqueued_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// 创建处于 `pending` 状态的新任务
    pub fn new(file: FileHandle) -> Self {
        Self {
            id: TaskId::new(),
            file,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn result(&self) -> Option<&ExtractResult> {
        self.result.as_ref()
    }

    /// 传输失败的原因，仅 `failed` 状态可能有值
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// 领取任务：`pending → in-flight`
    pub fn claim(&mut self) -> Result<()> {
        self.transition(TaskStatus::InFlight)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// 调用成功完成：`in-flight → done`
    pub fn finish_done(&mut self, result: ExtractResult) -> Result<()> {
        self.transition(TaskStatus::Done)?;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// 传输失败：`in-flight → failed`，不携带结果
    pub fn finish_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(TaskStatus::Failed)?;
        self.result = None;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_milliseconds()),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            file_name: self.file.name().to_string(),
            file_size: self.file.size(),
            file_type: self.file.content_type().map(str::to_string),
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
            enqueued_at: self.enqueued_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ExtractError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// 任务的只读快照，不包含文件字节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: Option<String>,
    pub status: TaskStatus,
    pub result: Option<ExtractResult>,
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskSnapshot {
    pub fn content(&self) -> Option<&str> {
        self.result.as_ref().and_then(|r| r.content.as_deref())
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_milliseconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_task() -> Task {
        Task::new(FileHandle::new("a.txt", b"abc".to_vec()))
    }

    #[test]
    fn test_status_chain() {
        use TaskStatus::*;

        assert!(Pending.can_transition_to(InFlight));
        assert!(InFlight.can_transition_to(Done));
        assert!(InFlight.can_transition_to(Failed));

        for (from, to) in [
            (Pending, Done),
            (Pending, Failed),
            (Pending, Pending),
            (InFlight, Pending),
            (InFlight, InFlight),
            (Done, Pending),
            (Done, Failed),
            (Failed, Pending),
            (Failed, Done),
        ] {
            assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InFlight).unwrap(),
            "\"in-flight\""
        );
        assert_eq!(TaskStatus::Done.to_string(), "done");
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::InFlight.is_terminal());
    }

    #[test]
    fn test_task_success_lifecycle() {
        let mut task = pending_task();
        assert!(task.started_at().is_none());

        task.claim().unwrap();
        assert_eq!(task.status(), TaskStatus::InFlight);
        assert!(task.started_at().is_some());

        let result = ExtractResult {
            content: Some("abc".into()),
            ..Default::default()
        };
        task.finish_done(result.clone()).unwrap();
        assert_eq!(task.status(), TaskStatus::Done);
        assert_eq!(task.result(), Some(&result));
        assert!(task.error().is_none());
        assert!(task.duration_ms().is_some());
    }

    #[test]
    fn test_task_failure_has_no_result() {
        let mut task = pending_task();
        task.claim().unwrap();
        task.finish_failed("connection reset").unwrap();

        assert_eq!(task.status(), TaskStatus::Failed);
        assert!(task.result().is_none());
        assert_eq!(task.error(), Some("connection reset"));
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut task = pending_task();
        let err = task.finish_done(ExtractResult::default()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Done,
                ..
            }
        ));

        task.claim().unwrap();
        assert!(task.claim().is_err());
        task.finish_failed("x").unwrap();
        assert!(task.finish_done(ExtractResult::default()).is_err());
        assert_eq!(task.status(), TaskStatus::Failed);
    }

    #[test]
    fn test_snapshot_copies_metadata() {
        let task = pending_task();
        let snapshot = task.snapshot();
        assert_eq!(snapshot.id, task.id());
        assert_eq!(snapshot.file_name, "a.txt");
        assert_eq!(snapshot.file_size, 3);
        assert_eq!(snapshot.status, TaskStatus::Pending);
        assert!(snapshot.content().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = pending_task();
        let b = pending_task();
        assert_ne!(a.id(), b.id());
    }
}
