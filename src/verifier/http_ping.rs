//! HTTP reachability verifier
//!
//! Confirms that a submitted URL answers with the expected status code.
//! A differing status keeps partial credit scaled by how far off it is.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ApiVerifier, VerificationResult, MAX_SCORE};
use crate::error::VerifyError;
use crate::probe::PROBE_USER_AGENT;

/// Points subtracted per unit of status-code distance. Tunable.
pub const STATUS_DISTANCE_PENALTY: u32 = 10;

/// Request timeout used when the payload does not supply one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_expected_status() -> u16 {
    200
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
struct HttpPingInput {
    url: String,
    #[serde(default = "default_expected_status")]
    expected_status: u16,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

/// Reachability check against an expected status code
pub struct HttpPingVerifier {
    client: reqwest::Client,
}

impl HttpPingVerifier {
    pub const KEY: &'static str = "http_ping";

    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpPingVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiVerifier for HttpPingVerifier {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "HTTP Ping"
    }

    fn description(&self) -> &'static str {
        "Checks that a URL is reachable and answers with the expected status code"
    }

    async fn verify(&self, input: &Value) -> VerificationResult {
        let input: HttpPingInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return VerifyError::InvalidPayload(e.to_string()).into(),
        };

        debug!(url = %input.url, expected = input.expected_status, "http ping");

        let response = self
            .client
            .get(&input.url)
            .header(USER_AGENT, PROBE_USER_AGENT)
            .timeout(Duration::from_secs(input.timeout_secs))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return VerifyError::from_reqwest(e).into(),
        };

        let actual = response.status().as_u16();
        let metadata = json!({
            "status": actual,
            "expected_status": input.expected_status,
            "url": input.url,
        });

        if actual == input.expected_status {
            VerificationResult::passed_with_metadata(MAX_SCORE, metadata)
        } else {
            let distance = (actual as i64 - input.expected_status as i64).abs();
            let mut result = VerificationResult::failed_with_score(
                &format!(
                    "expected status {}, got {}",
                    input.expected_status, actual
                ),
                MAX_SCORE as i64 - distance * STATUS_DISTANCE_PENALTY as i64,
            );
            result.metadata = Some(metadata);
            result
        }
    }
}
