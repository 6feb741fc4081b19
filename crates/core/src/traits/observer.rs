use crate::models::TaskEvent;

/// 任务状态变更的同步回调
///
/// 回调在调度器释放内部锁之后调用，可以安全地读取调度器快照。
/// 回调应当快速返回，耗时的处理请改用通知通道。
pub trait TaskObserver: Send + Sync {
    fn on_task_event(&self, event: &TaskEvent);
}

impl<F> TaskObserver for F
where
    F: Fn(&TaskEvent) + Send + Sync,
{
    fn on_task_event(&self, event: &TaskEvent) {
        self(event)
    }
}
