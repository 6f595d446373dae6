//! Error types for the platform-independent core

use thiserror::Error;

/// Errors raised while turning target data into a response
#[derive(Error, Debug)]
pub enum CoreError {
    /// Snapshot could not be encoded as JSON
    #[error("Cannot encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
