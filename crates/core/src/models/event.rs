use serde::{Deserialize, Serialize};

use super::{TaskId, TaskSnapshot, TaskStatus};

/// 任务状态变更通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub id: TaskId,
    pub status: TaskStatus,
    pub snapshot: TaskSnapshot,
}

impl From<TaskSnapshot> for TaskEvent {
    fn from(snapshot: TaskSnapshot) -> Self {
        Self {
            id: snapshot.id,
            status: snapshot.status,
            snapshot,
        }
    }
}

/// 一次批处理运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 本次运行处理的任务数
    pub total: usize,
    /// 调用成功的任务数（包含提取失败）
    pub done: usize,
    /// 传输失败的任务数
    pub failed: usize,
    /// 调用成功但服务端报告提取失败的任务数
    pub extraction_failures: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn record(&mut self, snapshot: &TaskSnapshot) {
        self.total += 1;
        match snapshot.status {
            TaskStatus::Done => {
                self.done += 1;
                if snapshot
                    .result
                    .as_ref()
                    .is_some_and(|r| r.is_extraction_failure())
                {
                    self.extraction_failures += 1;
                }
            }
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Pending | TaskStatus::InFlight => {}
        }
    }
}
