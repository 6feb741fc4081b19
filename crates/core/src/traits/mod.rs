pub mod extraction_client;
pub mod observer;

pub use extraction_client::*;
pub use observer::*;
