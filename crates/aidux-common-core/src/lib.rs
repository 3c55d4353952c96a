//! Core types shared by the AiDuxCare integrity crates.

pub mod error;
pub mod timestamp;

pub use error::{Error, Result, StorageError, StorageResult};
pub use timestamp::Timestamp;
