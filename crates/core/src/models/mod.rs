//! # 数据模型
//!
//! 定义批量文本提取系统的核心数据结构：待提取的文件、提取任务、提取结果以及任务状态通知。
//!
//! ## 核心模型
//!
//! ### FileHandle - 源文件句柄
//! 不可变的文件字节、名称、大小和MIME类型，克隆时共享底层字节。
//!
//! ### Task - 提取任务
//! 表示单个文件在提取流水线中的完整生命周期，只能由调度器内部修改。
//!
//! ### ExtractResult - 提取结果
//! 远程提取服务返回的结果，所有字段均可为空。
//!
//! ### TaskEvent / TaskSnapshot - 状态通知
//! 调度器每次状态变更时发出的只读快照。
//!
//! ## 任务状态流转
//!
//! ```text
//! pending → in-flight → done
//!                     ↘ failed
//! ```
//!
//! ## 使用示例
//!
//! ```rust
//! use extract_core::models::{FileHandle, Task, TaskStatus};
//!
//! let file = FileHandle::new("report.pdf", b"%PDF-1.7".to_vec());
//! let task = Task::new(file);
//! assert_eq!(task.status(), TaskStatus::Pending);
//! assert!(task.result().is_none());
//! ```

pub mod event;
pub mod extract_result;
pub mod file;
pub mod task;

pub use event::*;
pub use extract_result::*;
pub use file::*;
pub use task::*;
