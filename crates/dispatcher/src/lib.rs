//! 批量提取调度
//!
//! [`BatchScheduler`] 持有任务队列并以固定并发上限驱动每个任务走完
//! `pending → in-flight → {done | failed}` 的生命周期。

pub mod scheduler;
mod task_queue;

pub use scheduler::BatchScheduler;
