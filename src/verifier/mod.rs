//! Verifier contract and shared result type
//!
//! Every verification strategy implements [`ApiVerifier`] and produces a
//! [`VerificationResult`]. Strategies validate their own input: a missing
//! or malformed field comes back as an invalid result, never a panic.
//! The scoring shape is shared across strategies: start near maximum
//! confidence, subtract a fixed penalty when a threshold is missed, floor
//! at zero.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VerifyError;

pub mod game_playtime;
pub mod http_ping;
pub mod listen_time;
pub mod website_visit;

/// Maximum confidence score
pub const MAX_SCORE: u8 = 100;

/// Universal output of every verification strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether verification passed
    pub is_valid: bool,
    /// Confidence score, 0-100; higher is more confident, not a probability
    pub score: u8,
    /// Strategy-specific details
    pub metadata: Option<Value>,
    /// Error message if any
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn passed(score: u8) -> Self {
        Self {
            is_valid: true,
            score: score.min(MAX_SCORE),
            metadata: None,
            error: None,
        }
    }

    pub fn passed_with_metadata(score: u8, metadata: Value) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::passed(score)
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            is_valid: false,
            score: 0,
            metadata: None,
            error: Some(error.to_string()),
        }
    }

    /// Failure that still carries partial-completion confidence. The score
    /// is clamped into 0-100.
    pub fn failed_with_score(error: &str, score: i64) -> Self {
        Self {
            score: score.clamp(0, MAX_SCORE as i64) as u8,
            ..Self::failed(error)
        }
    }

    pub fn timeout() -> Self {
        Self::failed("request timed out")
    }
}

impl From<VerifyError> for VerificationResult {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Timeout => VerificationResult::timeout(),
            other => VerificationResult::failed(&other.to_string()),
        }
    }
}

/// Descriptor for a registered strategy, used for discovery and UI hints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

/// Contract implemented by every verification strategy
#[async_trait]
pub trait ApiVerifier: Send + Sync {
    /// Unique registry key
    fn key(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// What this strategy checks
    fn description(&self) -> &'static str;

    /// Verify a structured proof payload
    async fn verify(&self, input: &Value) -> VerificationResult;

    /// Discovery projection of this strategy
    fn info(&self) -> VerifierInfo {
        VerifierInfo {
            key: self.key().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

/// Score a measured value against a required minimum.
///
/// Meeting the threshold passes at `base`; a miss subtracts `penalty`,
/// floors at zero, and marks the result invalid while keeping the partial
/// credit in the score.
pub(crate) fn score_against_threshold(
    measured: f64,
    required: f64,
    base: u8,
    penalty: u8,
    quantity: &str,
    unit: &str,
) -> VerificationResult {
    if measured >= required {
        VerificationResult::passed(base)
    } else {
        VerificationResult::failed_with_score(
            &format!(
                "{} {:.0}{} below required {:.0}{}",
                quantity, measured, unit, required, unit
            ),
            base as i64 - penalty as i64,
        )
    }
}
