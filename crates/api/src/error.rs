use serde_json::Value;
use thiserror::Error;

/// Failure of a Workbench API call.
///
/// `Display` renders the text shown to users; for API errors that is the
/// server-provided message alone.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with an `error` object.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        errors: Option<Value>,
    },
    /// Non-success status without a structured error body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// A success status with a body that is not JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
