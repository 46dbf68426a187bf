//! Social post prober
//!
//! Issues a lightweight existence check against a classified post URL: a
//! HEAD request with an identifying client signature and a caller-supplied
//! timeout. Content-level engagement checks (likes, comments) are an
//! extension point, not part of the base probe.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::classify::ClassificationResult;
use crate::error::VerifyError;
use crate::verifier::{VerificationResult, MAX_SCORE};

/// Client signature sent with every outbound probe
pub const PROBE_USER_AGENT: &str = "mission-proof/0.1";

/// Existence check against a classified social post.
///
/// Only called with a valid classification; the orchestrator filters
/// invalid and policy-rejected URLs before any probe runs.
#[async_trait]
pub trait SocialProber: Send + Sync {
    async fn probe(
        &self,
        classification: &ClassificationResult,
        timeout: Duration,
    ) -> VerificationResult;
}

/// Prober backed by a shared HTTP client
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SocialProber for HttpProber {
    async fn probe(
        &self,
        classification: &ClassificationResult,
        timeout: Duration,
    ) -> VerificationResult {
        debug!(
            url = %classification.normalized_url,
            platform = %classification.platform,
            "probing social post"
        );

        let response = self
            .client
            .head(&classification.normalized_url)
            .header(USER_AGENT, PROBE_USER_AGENT)
            .timeout(timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %classification.normalized_url, error = %e, "probe failed");
                return VerifyError::from_reqwest(e).into();
            }
        };

        let status = response.status();
        if status.is_success() {
            VerificationResult::passed_with_metadata(
                MAX_SCORE,
                json!({
                    "status": status.as_u16(),
                    "final_url": response.url().to_string(),
                    "checked_at": Utc::now().to_rfc3339(),
                }),
            )
        } else {
            warn!(url = %classification.normalized_url, status = status.as_u16(), "post not reachable");
            VerifyError::UnexpectedStatus(status.as_u16()).into()
        }
    }
}
