//! Website visit verifier
//!
//! Checks a measured time-on-page against the mission's minimum. The
//! measurement arrives from the client-side tracker; this strategy only
//! enforces the threshold and scores the outcome.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{score_against_threshold, ApiVerifier, VerificationResult};
use crate::error::VerifyError;

/// Confidence granted when the visit meets the required duration. Tunable.
pub const VISIT_BASE_SCORE: u8 = 95;

/// Penalty applied when the measured duration misses the minimum. Tunable.
pub const VISIT_THRESHOLD_PENALTY: u8 = 35;

/// Minimum time-on-page used when the mission does not supply one
pub const DEFAULT_MIN_DURATION_SECS: f64 = 10.0;

fn default_min_duration() -> f64 {
    DEFAULT_MIN_DURATION_SECS
}

#[derive(Debug, Deserialize)]
struct WebsiteVisitInput {
    url: String,
    duration_secs: f64,
    #[serde(default = "default_min_duration")]
    min_duration_secs: f64,
}

/// Time-on-page check for website visit missions
pub struct WebsiteVisitVerifier;

impl WebsiteVisitVerifier {
    pub const KEY: &'static str = "website_visit";

    pub fn new() -> Self {
        Self
    }
}

impl Default for WebsiteVisitVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiVerifier for WebsiteVisitVerifier {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Website Visit"
    }

    fn description(&self) -> &'static str {
        "Checks that the visitor stayed on the target page for the required time"
    }

    async fn verify(&self, input: &Value) -> VerificationResult {
        let input: WebsiteVisitInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return VerifyError::InvalidPayload(e.to_string()).into(),
        };

        if input.duration_secs < 0.0 {
            return VerifyError::InvalidPayload("duration_secs must be non-negative".to_string())
                .into();
        }

        debug!(url = %input.url, duration = input.duration_secs, "website visit check");

        let mut result = score_against_threshold(
            input.duration_secs,
            input.min_duration_secs,
            VISIT_BASE_SCORE,
            VISIT_THRESHOLD_PENALTY,
            "time on page",
            "s",
        );
        result.metadata = Some(json!({
            "url": input.url,
            "duration_secs": input.duration_secs,
            "min_duration_secs": input.min_duration_secs,
        }));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_visit_meeting_minimum_passes() {
        let verifier = WebsiteVisitVerifier::new();
        let input = json!({
            "url": "https://shop.example.com/landing",
            "duration_secs": 25.0,
            "min_duration_secs": 15.0,
        });
        let result = verifier.verify(&input).await;

        assert!(result.is_valid);
        assert_eq!(result.score, VISIT_BASE_SCORE);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_short_visit_keeps_partial_credit() {
        let verifier = WebsiteVisitVerifier::new();
        let input = json!({
            "url": "https://shop.example.com/landing",
            "duration_secs": 5.0,
            "min_duration_secs": 15.0,
        });
        let result = verifier.verify(&input).await;

        assert!(!result.is_valid);
        assert_eq!(
            result.score,
            VISIT_BASE_SCORE - VISIT_THRESHOLD_PENALTY
        );
        assert_eq!(
            result.error.as_deref(),
            Some("time on page 5s below required 15s")
        );
    }

    #[tokio::test]
    async fn test_default_minimum_applies() {
        let verifier = WebsiteVisitVerifier::new();
        let input = json!({"url": "https://example.com", "duration_secs": 10.0});
        let result = verifier.verify(&input).await;

        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_missing_duration_is_invalid_payload() {
        let verifier = WebsiteVisitVerifier::new();
        let result = verifier.verify(&json!({"url": "https://example.com"})).await;

        assert!(!result.is_valid);
        assert_eq!(result.score, 0);
    }

    #[tokio::test]
    async fn test_negative_duration_rejected() {
        let verifier = WebsiteVisitVerifier::new();
        let input = json!({"url": "https://example.com", "duration_secs": -3.0});
        let result = verifier.verify(&input).await;

        assert!(!result.is_valid);
        assert_eq!(result.score, 0);
    }
}
