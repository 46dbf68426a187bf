//! Listen time verifier
//!
//! Checks a measured listening duration against the mission's minimum,
//! for music/podcast engagement missions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{score_against_threshold, ApiVerifier, VerificationResult};
use crate::error::VerifyError;

/// Confidence granted when listening meets the minimum. Tunable.
pub const LISTEN_BASE_SCORE: u8 = 95;

/// Penalty applied when listening misses the minimum. Tunable.
pub const LISTEN_THRESHOLD_PENALTY: u8 = 30;

/// Minimum listening time in seconds used when the mission does not supply one
pub const DEFAULT_MIN_LISTEN_SECS: f64 = 30.0;

fn default_min_listen() -> f64 {
    DEFAULT_MIN_LISTEN_SECS
}

#[derive(Debug, Deserialize)]
struct ListenTimeInput {
    #[serde(default)]
    track_id: Option<String>,
    listened_secs: f64,
    #[serde(default = "default_min_listen")]
    min_listen_secs: f64,
}

/// Listening duration check for music missions
pub struct ListenTimeVerifier;

impl ListenTimeVerifier {
    pub const KEY: &'static str = "listen_time";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ListenTimeVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiVerifier for ListenTimeVerifier {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Listen Time"
    }

    fn description(&self) -> &'static str {
        "Checks that the listener played the target track for the required time"
    }

    async fn verify(&self, input: &Value) -> VerificationResult {
        let input: ListenTimeInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return VerifyError::InvalidPayload(e.to_string()).into(),
        };

        if input.listened_secs < 0.0 {
            return VerifyError::InvalidPayload("listened_secs must be non-negative".to_string())
                .into();
        }

        debug!(
            track = input.track_id.as_deref().unwrap_or("<unspecified>"),
            listened = input.listened_secs,
            "listen time check"
        );

        let mut result = score_against_threshold(
            input.listened_secs,
            input.min_listen_secs,
            LISTEN_BASE_SCORE,
            LISTEN_THRESHOLD_PENALTY,
            "listening time",
            "s",
        );
        result.metadata = Some(json!({
            "track_id": input.track_id,
            "listened_secs": input.listened_secs,
            "min_listen_secs": input.min_listen_secs,
        }));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listen_meeting_minimum_passes() {
        let verifier = ListenTimeVerifier::new();
        let input = json!({
            "track_id": "spotify:track:abc123",
            "listened_secs": 95.0,
            "min_listen_secs": 60.0,
        });
        let result = verifier.verify(&input).await;

        assert!(result.is_valid);
        assert_eq!(result.score, LISTEN_BASE_SCORE);
    }

    #[tokio::test]
    async fn test_short_listen_keeps_partial_credit() {
        let verifier = ListenTimeVerifier::new();
        let input = json!({"listened_secs": 10.0, "min_listen_secs": 60.0});
        let result = verifier.verify(&input).await;

        assert!(!result.is_valid);
        assert_eq!(result.score, LISTEN_BASE_SCORE - LISTEN_THRESHOLD_PENALTY);
        assert_eq!(
            result.error.as_deref(),
            Some("listening time 10s below required 60s")
        );
    }

    #[tokio::test]
    async fn test_track_id_is_optional() {
        let verifier = ListenTimeVerifier::new();
        let result = verifier.verify(&json!({"listened_secs": 45.0})).await;

        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_missing_listened_secs_is_invalid_payload() {
        let verifier = ListenTimeVerifier::new();
        let result = verifier
            .verify(&json!({"track_id": "spotify:track:abc123"}))
            .await;

        assert!(!result.is_valid);
        assert_eq!(result.score, 0);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("invalid proof payload"));
    }
}
