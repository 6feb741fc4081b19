//! 批量文件文本提取
//!
//! 把本地文件以有限并发提交给远程提取服务，跟踪每个文件的进度，
//! 并把提取出的文本写入文件或打印到控制台。

pub mod app;
pub mod i18n;
pub mod output;

pub use app::{Application, BatchReport, ConsoleObserver, DeliveryRecord, SkippedInput};
pub use output::{format_size, preview, Delivery, DownloadSink, StdoutSink, TextSink};
