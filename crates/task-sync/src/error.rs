//! Sync Errors
//!
//! Failure taxonomy for remote calls and locally rejected input.

/// Errors produced by the task sync layer
///
/// None of these is fatal: the store logs each one and reconciles its state
/// before handing it back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// The request never reached the server, or no response came back.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    /// A 2xx response whose body was not the expected JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Input rejected locally; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The task is not in local state; nothing was sent.
    #[error("task {0} not found")]
    NotFound(u32),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

impl SyncError {
    /// True when the operation was rejected before any request was issued
    pub fn is_local(&self) -> bool {
        matches!(self, SyncError::Validation(_) | SyncError::NotFound(_) | SyncError::Config(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            SyncError::Server { status: status.as_u16(), body: e.to_string() }
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

/// Common result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
