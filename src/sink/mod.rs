//! Downstream delivery of classified map items
//!
//! Items carry stable uids, so re-delivering a batch after a retried walk
//! overwrites rather than duplicates on the receiving side.

pub mod http_sink;
pub mod jsonl_sink;

pub use http_sink::HttpSink;
pub use jsonl_sink::JsonlSink;

use crate::aggregate::OutputItem;
use async_trait::async_trait;

#[derive(Debug)]
pub enum SinkError {
    Http(reqwest::Error),
    Status(u16),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Http(err)
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Http(e) => write!(f, "HTTP error: {}", e),
            SinkError::Status(code) => write!(f, "Bulk push rejected with status {}", code),
            SinkError::Io(e) => write!(f, "IO error: {}", e),
            SinkError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

#[async_trait]
pub trait MapSink: Send + Sync {
    /// Deliver one walk's batch
    async fn deliver(&self, items: &[OutputItem]) -> Result<(), SinkError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
