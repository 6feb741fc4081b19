use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use extract_core::config::SchedulerConfig;
use extract_core::{
    ExtractError, ExtractionClient, FileHandle, Result, RunSummary, StructuredLogger, TaskEvent,
    TaskId, TaskObserver, TaskSnapshot,
};
use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::task_queue::{Claim, TaskQueue};

/// 批量提取调度器
///
/// 持有有序任务队列和并发上限 N。`start()` 启动 N 个worker，
/// 每个worker循环领取下一个 `pending` 任务、调用提取客户端并写回结果，
/// 直到队列中既没有待处理任务也没有在途任务。
///
/// 所有状态变更都通过 [`TaskObserver`] 回调和 [`BatchScheduler::subscribe`]
/// 通道以只读快照的形式通知订阅者，调度器从不暴露内部任务序列的可变引用。
///
/// 运行期间入队的任务会被空闲worker接手，不需要再次调用 `start()`。
#[derive(Clone)]
pub struct BatchScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    client: Arc<dyn ExtractionClient>,
    /// 唯一的互斥域：领取和状态更新都在这把锁内完成，且从不跨越 await
    queue: Mutex<TaskQueue>,
    max_concurrency: AtomicUsize,
    running: AtomicBool,
    /// 入队或任务结束时唤醒等待中的worker
    wakeup: Notify,
    notifier: Notifier,
}

/// 运行标记的持有者
///
/// `start()` 的 future 被中途丢弃时（例如外层超时），在析构中清除运行标记，
/// 已派生的worker会继续处理完当前队列。
struct RunningGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, armed: true })
    }

    fn release(&mut self) {
        if self.armed {
            self.armed = false;
            self.flag.store(false, Ordering::Release);
        }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("批处理运行被中途放弃，清除运行标记");
            self.release();
        }
    }
}

/// 状态通知分发
#[derive(Default)]
struct Notifier {
    observers: Mutex<Vec<Arc<dyn TaskObserver>>>,
    channels: Mutex<Vec<mpsc::UnboundedSender<TaskEvent>>>,
}

impl Notifier {
    fn emit(&self, snapshot: TaskSnapshot) {
        let event = TaskEvent::from(snapshot);

        let observers = lock(&self.observers).clone();
        for observer in &observers {
            // 回调panic不能中断worker，否则已领取的任务会一直停留在 in-flight
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| observer.on_task_event(&event)));
            if let Err(panic) = delivered {
                error!(
                    task.id = %event.id,
                    "状态回调panic: {}",
                    panic_message(panic.as_ref())
                );
            }
        }

        lock(&self.channels).retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl BatchScheduler {
    /// 创建调度器，`max_concurrency` 必须大于0
    pub fn new(client: Arc<dyn ExtractionClient>, max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(ExtractError::InvalidConcurrency(max_concurrency));
        }

        info!(
            "创建批量调度器: client={}, max_concurrency={}",
            client.name(),
            max_concurrency
        );

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                client,
                queue: Mutex::new(TaskQueue::new()),
                max_concurrency: AtomicUsize::new(max_concurrency),
                running: AtomicBool::new(false),
                wakeup: Notify::new(),
                notifier: Notifier::default(),
            }),
        })
    }

    pub fn from_config(client: Arc<dyn ExtractionClient>, config: &SchedulerConfig) -> Result<Self> {
        Self::new(client, config.max_concurrency)
    }

    pub fn max_concurrency(&self) -> usize {
        self.inner.max_concurrency.load(Ordering::Acquire)
    }

    /// 修改并发上限，仅允许在没有运行中的批处理时调用
    pub fn set_max_concurrency(&self, max_concurrency: usize) -> Result<()> {
        if max_concurrency == 0 {
            return Err(ExtractError::InvalidConcurrency(max_concurrency));
        }
        if self.is_running() {
            return Err(ExtractError::AlreadyRunning);
        }
        self.inner
            .max_concurrency
            .store(max_concurrency, Ordering::Release);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// 追加任务，每个文件生成一个 `pending` 任务
    ///
    /// 可在任意时刻调用，包括运行期间。空输入不产生任何变化。
    pub fn enqueue(&self, files: impl IntoIterator<Item = FileHandle>) -> Vec<TaskId> {
        let files: Vec<FileHandle> = files.into_iter().collect();
        if files.is_empty() {
            return Vec::new();
        }

        let (ids, queue_len) = {
            let mut queue = self.inner.lock_queue();
            let ids = queue.push(files);
            (ids, queue.len())
        };

        StructuredLogger::log_tasks_enqueued(ids.len(), queue_len);
        self.inner.wakeup.notify_waiters();
        ids
    }

    /// 启动一次批处理运行，所有worker退出后返回
    ///
    /// 已有运行在进行时返回 [`ExtractError::AlreadyRunning`]；
    /// 没有待处理任务时不启动任何worker，直接返回空统计。
    /// 返回前丢弃该 future 会清除运行标记，已启动的worker继续处理剩余任务。
    pub async fn start(&self) -> Result<RunSummary> {
        let Some(mut running) = RunningGuard::acquire(&self.inner.running) else {
            StructuredLogger::log_run_rejected("already running");
            return Err(ExtractError::AlreadyRunning);
        };

        let (first, pending) = {
            let queue = self.inner.lock_queue();
            (queue.cursor(), queue.pending_count())
        };
        if pending == 0 {
            running.release();
            debug!("没有待处理的任务，跳过本次运行");
            return Ok(RunSummary::default());
        }

        let started = Instant::now();
        let max_concurrency = self.max_concurrency();
        StructuredLogger::log_run_started(pending, max_concurrency);

        let mut generation = 0usize;
        let last = loop {
            generation += 1;
            self.run_generation(generation, max_concurrency).await;

            let (remaining, cursor) = {
                let queue = self.inner.lock_queue();
                let remaining = queue.pending_count();
                if remaining == 0 {
                    // 在队列锁内清除运行标记，之后的入队需要新的 start()
                    running.release();
                }
                (remaining, queue.cursor())
            };
            if remaining == 0 {
                break cursor;
            }
            debug!("worker退出后检测到 {remaining} 个新任务，启动下一轮worker");
        };

        let mut summary = self.inner.lock_queue().summarize(first..last);
        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        StructuredLogger::log_run_finished(&summary);
        Ok(summary)
    }

    /// 启动一轮 N 个worker并等待全部退出
    async fn run_generation(&self, generation: usize, max_concurrency: usize) {
        let handles: Vec<_> = (0..max_concurrency)
            .map(|worker_index| {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(
                    inner
                        .run_worker(worker_index)
                        .instrument(info_span!("worker", generation, index = worker_index)),
                )
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                error!("worker异常退出: {e}");
            }
        }

        // worker 被中止时可能遗留在途任务
        let stranded = self.inner.lock_queue().fail_in_flight("worker异常退出，任务未完成");
        for snapshot in stranded {
            error!(task.id = %snapshot.id, "任务因worker异常退出被标记为失败");
            self.inner.notifier.emit(snapshot);
        }
    }

    /// 按入队顺序返回所有任务的快照
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.inner.lock_queue().snapshot()
    }

    pub fn task(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.inner.lock_queue().get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock_queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock_queue().pending_count()
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock_queue().in_flight_count()
    }

    /// 订阅状态变更通知，通道不会丢弃事件
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TaskEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.notifier.channels).push(tx);
        rx
    }

    /// 注册同步回调
    pub fn add_observer(&self, observer: Arc<dyn TaskObserver>) {
        lock(&self.inner.notifier.observers).push(observer);
    }
}

impl SchedulerInner {
    fn lock_queue(&self) -> MutexGuard<'_, TaskQueue> {
        lock(&self.queue)
    }

    async fn run_worker(self: Arc<Self>, worker_index: usize) {
        debug!("worker启动");

        loop {
            // 先注册唤醒再检查队列，避免错过检查与等待之间的通知
            let notified = self.wakeup.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let claim = self.lock_queue().claim_next();
            match claim {
                Claim::Claimed { id, file, snapshot } => {
                    StructuredLogger::log_task_claimed(worker_index, &snapshot);
                    self.notifier.emit(snapshot);
                    self.process(worker_index, id, &file).await;
                }
                Claim::Wait => notified.await,
                Claim::Drained => break,
            }
        }

        debug!("worker退出");
    }

    async fn process(&self, worker_index: usize, id: TaskId, file: &FileHandle) {
        let outcome = AssertUnwindSafe(self.client.submit(file))
            .catch_unwind()
            .await;

        let finished = {
            let mut queue = self.lock_queue();
            match outcome {
                Ok(Ok(result)) => queue.finish_done(id, result),
                Ok(Err(e)) => queue.finish_failed(id, e.to_string()),
                Err(panic) => queue.finish_failed(
                    id,
                    format!("提取客户端panic: {}", panic_message(panic.as_ref())),
                ),
            }
        };
        self.wakeup.notify_waiters();

        match finished {
            Ok(snapshot) => {
                match (&snapshot.result, &snapshot.error) {
                    (Some(_), _) => StructuredLogger::log_task_completed(
                        worker_index,
                        &snapshot,
                        snapshot.duration_ms().unwrap_or_default(),
                    ),
                    (None, error) => StructuredLogger::log_task_failed(
                        worker_index,
                        &snapshot,
                        error.as_deref().unwrap_or("unknown"),
                    ),
                }
                self.notifier.emit(snapshot);
            }
            Err(e) => error!("写回任务结果失败: task_id={id}, error={e}"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
