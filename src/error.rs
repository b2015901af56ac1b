//! Upload error type.
//!
//! The widget treats every variant the same way ("upload failed"); the
//! variants only sharpen the log line and the reported reason.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not format response: {0}")]
    Format(#[from] serde_json::Error),
}
