//! Error taxonomy for proof verification
//!
//! Failures never cross the public boundary as panics or thrown errors;
//! they are categorized here and converted into the error channel of
//! [`VerificationResult`](crate::verifier::VerificationResult). The
//! categories keep timeouts distinguishable from hard rejections so a
//! caller can decide what is worth retrying.

use crate::classify::Platform;
use thiserror::Error;

/// Failure categories reported by the verification subsystem
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid proof payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown verifier: {0}")]
    UnknownVerifier(String),

    #[error("platform not permitted for this mission: {0}")]
    PlatformNotAllowed(Platform),
}

impl VerifyError {
    /// Categorize an outbound request failure, keeping timeouts distinct
    /// from DNS/connect/TLS failures.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VerifyError::Timeout
        } else if err.is_connect() {
            VerifyError::Transport(format!("connection failed: {}", err))
        } else {
            VerifyError::Transport(err.to_string())
        }
    }
}
