pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use errors::*;
pub use logging::StructuredLogger;
pub use models::{
    ExtractResult, FileHandle, RunSummary, Task, TaskEvent, TaskId, TaskSnapshot, TaskStatus,
};
pub use traits::{ExtractionClient, TaskObserver};
