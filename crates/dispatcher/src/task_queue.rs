use std::collections::HashMap;
use std::ops::Range;

use extract_core::{
    ExtractError, ExtractResult, FileHandle, Result, RunSummary, Task, TaskId, TaskSnapshot,
    TaskStatus,
};

/// 领取结果
#[derive(Debug)]
pub(crate) enum Claim {
    /// 成功领取，任务已切换为 `in-flight`
    Claimed {
        id: TaskId,
        file: FileHandle,
        snapshot: TaskSnapshot,
    },
    /// 没有待处理任务，但仍有任务在途，新任务可能随时入队
    Wait,
    /// 既没有待处理任务也没有在途任务
    Drained,
}

/// 调度器内部的有序任务队列
///
/// 任务按入队顺序领取，因此游标之前的任务都已离开 `pending`，
/// 游标及之后的任务都处于 `pending`。
#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
    next_pending: usize,
    in_flight: usize,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, files: impl IntoIterator<Item = FileHandle>) -> Vec<TaskId> {
        files
            .into_iter()
            .map(|file| {
                let task = Task::new(file);
                let id = task.id();
                self.index.insert(id, self.tasks.len());
                self.tasks.push(task);
                id
            })
            .collect()
    }

    pub(crate) fn claim_next(&mut self) -> Claim {
        let Some(task) = self.tasks.get_mut(self.next_pending) else {
            return if self.in_flight == 0 {
                Claim::Drained
            } else {
                Claim::Wait
            };
        };

        // 游标处的任务必然是 pending
        if let Err(e) = task.claim() {
            debug_assert!(false, "cursor points at a non-pending task: {e}");
            self.next_pending += 1;
            return self.claim_next();
        }

        self.next_pending += 1;
        self.in_flight += 1;

        Claim::Claimed {
            id: task.id(),
            file: task.file().clone(),
            snapshot: task.snapshot(),
        }
    }

    pub(crate) fn finish_done(&mut self, id: TaskId, result: ExtractResult) -> Result<TaskSnapshot> {
        let task = self.task_mut(id)?;
        task.finish_done(result)?;
        let snapshot = task.snapshot();
        self.in_flight -= 1;
        Ok(snapshot)
    }

    pub(crate) fn finish_failed(&mut self, id: TaskId, error: String) -> Result<TaskSnapshot> {
        let task = self.task_mut(id)?;
        task.finish_failed(error)?;
        let snapshot = task.snapshot();
        self.in_flight -= 1;
        Ok(snapshot)
    }

    /// 把仍处于 `in-flight` 的任务强制标记为失败
    pub(crate) fn fail_in_flight(&mut self, reason: &str) -> Vec<TaskSnapshot> {
        if self.in_flight == 0 {
            return Vec::new();
        }

        let mut stranded = Vec::new();
        for task in self.tasks[..self.next_pending]
            .iter_mut()
            .filter(|task| task.status() == TaskStatus::InFlight)
        {
            if task.finish_failed(reason).is_ok() {
                stranded.push(task.snapshot());
            }
        }
        self.in_flight -= stranded.len();
        stranded
    }

    pub(crate) fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.tasks.iter().map(Task::snapshot).collect()
    }

    pub(crate) fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.index.get(&id).map(|&i| self.tasks[i].snapshot())
    }

    /// 下一个待领取任务的位置
    pub(crate) fn cursor(&self) -> usize {
        self.next_pending
    }

    /// 汇总指定区间内任务的结果
    pub(crate) fn summarize(&self, range: Range<usize>) -> RunSummary {
        let mut summary = RunSummary::default();
        for task in &self.tasks[range] {
            summary.record(&task.snapshot());
        }
        summary
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.tasks.len() - self.next_pending
    }

    pub(crate) fn in_flight_count(&self) -> usize {
        self.in_flight
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        let index = *self.index.get(&id).ok_or(ExtractError::TaskNotFound(id))?;
        Ok(&mut self.tasks[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<FileHandle> {
        names
            .iter()
            .map(|name| FileHandle::new(*name, name.as_bytes().to_vec()))
            .collect()
    }

    fn claim(queue: &mut TaskQueue) -> TaskId {
        match queue.claim_next() {
            Claim::Claimed { id, snapshot, .. } => {
                assert_eq!(snapshot.status, TaskStatus::InFlight);
                id
            }
            other => panic!("expected a claim, got {other:?}"),
        }
    }

    #[test]
    fn test_push_assigns_unique_ids_in_order() {
        let mut queue = TaskQueue::new();
        let first = queue.push(files(&["a.pdf", "a.pdf"]));
        let second = queue.push(files(&["b.pdf"]));

        assert_eq!(first.len(), 2);
        assert_ne!(first[0], first[1]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pending_count(), 3);

        let names: Vec<_> = queue.snapshot().into_iter().map(|s| s.file_name).collect();
        assert_eq!(names, ["a.pdf", "a.pdf", "b.pdf"]);
        assert_eq!(queue.get(second[0]).unwrap().file_name, "b.pdf");
    }

    #[test]
    fn test_empty_push_is_noop() {
        let mut queue = TaskQueue::new();
        assert!(queue.push(Vec::new()).is_empty());
        assert_eq!(queue.len(), 0);
        assert!(matches!(queue.claim_next(), Claim::Drained));
    }

    #[test]
    fn test_claims_follow_enqueue_order() {
        let mut queue = TaskQueue::new();
        let ids = queue.push(files(&["1", "2", "3"]));

        assert_eq!(claim(&mut queue), ids[0]);
        assert_eq!(claim(&mut queue), ids[1]);
        assert_eq!(queue.in_flight_count(), 2);
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(claim(&mut queue), ids[2]);
    }

    #[test]
    fn test_wait_until_in_flight_finishes() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["only"]));
        let id = claim(&mut queue);

        assert!(matches!(queue.claim_next(), Claim::Wait));

        let snapshot = queue
            .finish_done(id, ExtractResult::default())
            .unwrap();
        assert_eq!(snapshot.status, TaskStatus::Done);
        assert!(matches!(queue.claim_next(), Claim::Drained));
    }

    #[test]
    fn test_enqueue_while_waiting_is_claimable() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["first"]));
        let _first = claim(&mut queue);
        assert!(matches!(queue.claim_next(), Claim::Wait));

        let late = queue.push(files(&["late"]));
        assert_eq!(claim(&mut queue), late[0]);
    }

    #[test]
    fn test_finish_failed_clears_result() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["x"]));
        let id = claim(&mut queue);

        let snapshot = queue.finish_failed(id, "timeout".into()).unwrap();
        assert_eq!(snapshot.status, TaskStatus::Failed);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.error.as_deref(), Some("timeout"));
        assert_eq!(queue.in_flight_count(), 0);
    }

    #[test]
    fn test_finishing_twice_is_rejected() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["x"]));
        let id = claim(&mut queue);
        queue.finish_done(id, ExtractResult::default()).unwrap();

        assert!(queue.finish_failed(id, "late".into()).is_err());
        assert_eq!(queue.in_flight_count(), 0);
        assert!(matches!(
            queue.finish_done(TaskId::new(), ExtractResult::default()),
            Err(ExtractError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_fail_in_flight() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["a", "b", "c"]));
        let a = claim(&mut queue);
        let _b = claim(&mut queue);
        queue.finish_done(a, ExtractResult::default()).unwrap();

        let stranded = queue.fail_in_flight("worker aborted");
        assert_eq!(stranded.len(), 1);
        assert_eq!(stranded[0].file_name, "b");
        assert_eq!(queue.in_flight_count(), 0);
        assert_eq!(queue.pending_count(), 1);
        assert!(queue.fail_in_flight("again").is_empty());
    }

    #[test]
    fn test_summarize_range() {
        let mut queue = TaskQueue::new();
        queue.push(files(&["ok", "semantic", "broken"]));
        let start = queue.cursor();

        let ok = claim(&mut queue);
        let semantic = claim(&mut queue);
        let broken = claim(&mut queue);
        queue
            .finish_done(
                ok,
                ExtractResult {
                    content: Some("text".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        queue
            .finish_done(
                semantic,
                ExtractResult {
                    error_msg: Some("unsupported format".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        queue.finish_failed(broken, "reset".into()).unwrap();

        let summary = queue.summarize(start..queue.cursor());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.done, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.extraction_failures, 1);
    }
}
