//! Verification orchestrator
//!
//! Routes submitted proofs to the right strategy: social-post proofs run
//! through classification and the mission's platform allow-list before any
//! network probe; API proofs dispatch straight to the registry. Batches run
//! concurrently up to a fan-out bound, and results come back in input
//! order with failures isolated per item.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::classify::{classify, Platform};
use crate::config::VerifyConfig;
use crate::error::VerifyError;
use crate::probe::{HttpProber, SocialProber};
use crate::registry::VerifierRegistry;
use crate::verifier::VerificationResult;

/// How a mission expects its proof to be checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofMode {
    /// Proof is a link to a social media post
    SocialPost,
    /// Proof is structured data for a named verifier
    Api,
}

/// Mission-level policy describing acceptable proof.
///
/// Attached to a mission and immutable once the mission is published; this
/// subsystem only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRequirement {
    pub mode: ProofMode,
    /// Platforms accepted for social post proof; empty means unrestricted
    #[serde(default)]
    pub allowed_networks: HashSet<Platform>,
    /// Registry key, required when `mode` is [`ProofMode::Api`]
    #[serde(default)]
    pub verifier_key: Option<String>,
}

impl ProofRequirement {
    pub fn social_post() -> Self {
        Self {
            mode: ProofMode::SocialPost,
            allowed_networks: HashSet::new(),
            verifier_key: None,
        }
    }

    pub fn api(verifier_key: &str) -> Self {
        Self {
            mode: ProofMode::Api,
            allowed_networks: HashSet::new(),
            verifier_key: Some(verifier_key.to_string()),
        }
    }

    pub fn with_allowed_networks(mut self, networks: impl IntoIterator<Item = Platform>) -> Self {
        self.allowed_networks = networks.into_iter().collect();
        self
    }
}

/// A single submitted proof
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofPayload {
    /// Raw URL pointing at a social post
    Url(String),
    /// Structured verifier-specific data
    Data(Value),
}

/// Entry point for proof verification.
///
/// Takes its registry and prober as injected collaborators so callers and
/// tests can substitute their own.
pub struct ProofVerifier {
    registry: Arc<VerifierRegistry>,
    prober: Arc<dyn SocialProber>,
    config: VerifyConfig,
}

impl ProofVerifier {
    pub fn new(
        registry: Arc<VerifierRegistry>,
        prober: Arc<dyn SocialProber>,
        config: VerifyConfig,
    ) -> Self {
        Self {
            registry,
            prober,
            config,
        }
    }

    /// Verifier wired with the standard registry and HTTP prober.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(VerifierRegistry::with_default_verifiers()),
            Arc::new(HttpProber::new()),
            VerifyConfig::default(),
        )
    }

    /// Verify one submitted proof against a mission's requirement.
    ///
    /// Every outcome is a result value; this never panics on user input.
    pub async fn verify_proof(
        &self,
        requirement: &ProofRequirement,
        payload: &ProofPayload,
    ) -> VerificationResult {
        match requirement.mode {
            ProofMode::SocialPost => self.verify_social_post(requirement, payload).await,
            ProofMode::Api => self.verify_api(requirement, payload).await,
        }
    }

    /// Verify many proofs concurrently.
    ///
    /// Results come back in input order and one item's failure never aborts
    /// the rest. Concurrency is bounded by
    /// [`VerifyConfig::max_concurrent_proofs`].
    pub async fn verify_batch(
        &self,
        requirement: &ProofRequirement,
        payloads: &[ProofPayload],
    ) -> Vec<VerificationResult> {
        info!(count = payloads.len(), "verifying proof batch");
        stream::iter(payloads)
            .map(|payload| self.verify_proof(requirement, payload))
            .buffered(self.config.max_concurrent_proofs.max(1))
            .collect()
            .await
    }

    async fn verify_social_post(
        &self,
        requirement: &ProofRequirement,
        payload: &ProofPayload,
    ) -> VerificationResult {
        let url = match payload {
            ProofPayload::Url(url) => url,
            ProofPayload::Data(_) => {
                return VerifyError::InvalidPayload(
                    "social post proof must be a URL".to_string(),
                )
                .into();
            }
        };

        let classification = classify(url);
        if !classification.is_valid {
            let reason = classification
                .error
                .unwrap_or_else(|| "unclassifiable URL".to_string());
            return VerificationResult::failed(&reason);
        }

        // Policy check runs before any network traffic.
        if !requirement.allowed_networks.is_empty()
            && !requirement.allowed_networks.contains(&classification.platform)
        {
            debug!(platform = %classification.platform, "platform rejected by mission policy");
            return VerifyError::PlatformNotAllowed(classification.platform).into();
        }

        let timeout = Duration::from_secs(self.config.probe_timeout_secs);
        self.prober.probe(&classification, timeout).await
    }

    async fn verify_api(
        &self,
        requirement: &ProofRequirement,
        payload: &ProofPayload,
    ) -> VerificationResult {
        let key = match &requirement.verifier_key {
            Some(key) => key,
            None => return VerifyError::MissingField("verifier_key").into(),
        };

        let input = match payload {
            ProofPayload::Data(value) => value.clone(),
            ProofPayload::Url(url) => json!({ "url": url }),
        };

        self.registry.verify_with_api(key, &input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationResult;
    use crate::verifier::MAX_SCORE;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Prober that records how often it was called and answers a canned result.
    struct CountingProber {
        calls: AtomicUsize,
        result: fn() -> VerificationResult,
    }

    impl CountingProber {
        fn passing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: || VerificationResult::passed(MAX_SCORE),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: || VerificationResult::failed("unexpected status: 404"),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SocialProber for CountingProber {
        async fn probe(
            &self,
            _classification: &ClassificationResult,
            _timeout: Duration,
        ) -> VerificationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn verifier_with_prober(prober: Arc<CountingProber>) -> ProofVerifier {
        ProofVerifier::new(
            Arc::new(VerifierRegistry::with_default_verifiers()),
            prober,
            VerifyConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_valid_social_post_is_probed() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::social_post();
        let payload = ProofPayload::Url("https://x.com/alice/status/123".to_string());

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(result.is_valid);
        assert_eq!(prober.call_count(), 1);
    }

    #[tokio::test]
    async fn test_disallowed_platform_fails_before_probe() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::social_post()
            .with_allowed_networks([Platform::Instagram, Platform::TikTok]);
        let payload = ProofPayload::Url("https://twitter.com/alice/status/123".to_string());

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert_eq!(
            result.error.as_deref(),
            Some("platform not permitted for this mission: Twitter")
        );
        assert_eq!(prober.call_count(), 0, "policy rejection must not probe");
    }

    #[tokio::test]
    async fn test_allowed_platform_passes_policy() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement =
            ProofRequirement::social_post().with_allowed_networks([Platform::Twitter]);
        let payload = ProofPayload::Url("https://x.com/alice/status/123".to_string());

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(result.is_valid);
        assert_eq!(prober.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unclassifiable_url_fails_with_classifier_error() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::social_post();
        let payload = ProofPayload::Url("not a url".to_string());

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert_eq!(result.error.as_deref(), Some("malformed URL"));
        assert_eq!(prober.call_count(), 0);
    }

    #[tokio::test]
    async fn test_structured_payload_in_social_mode_is_malformed() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::social_post();
        let payload = ProofPayload::Data(json!({"anything": 1}));

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert_eq!(prober.call_count(), 0);
    }

    #[tokio::test]
    async fn test_api_mode_skips_classification() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::api("listen_time");
        let payload = ProofPayload::Data(json!({"listened_secs": 45.0}));

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(result.is_valid);
        assert_eq!(prober.call_count(), 0, "api mode must not touch the prober");
    }

    #[tokio::test]
    async fn test_api_mode_unknown_key_names_the_key() {
        let verifier = verifier_with_prober(Arc::new(CountingProber::passing()));
        let requirement = ProofRequirement::api("not_a_real_key");
        let payload = ProofPayload::Data(json!({}));

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Unknown verifier: not_a_real_key")
        );
    }

    #[tokio::test]
    async fn test_api_mode_without_key_is_reported() {
        let verifier = verifier_with_prober(Arc::new(CountingProber::passing()));
        let requirement = ProofRequirement {
            mode: ProofMode::Api,
            allowed_networks: HashSet::new(),
            verifier_key: None,
        };
        let payload = ProofPayload::Data(json!({}));

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert_eq!(
            result.error.as_deref(),
            Some("missing required field: verifier_key")
        );
    }

    #[tokio::test]
    async fn test_api_mode_wraps_url_payload() {
        let verifier = verifier_with_prober(Arc::new(CountingProber::passing()));
        // website_visit needs more than a URL, so the wrapped payload is
        // rejected by the strategy's own input validation, not a panic.
        let requirement = ProofRequirement::api("website_visit");
        let payload = ProofPayload::Url("https://example.com".to_string());

        let result = verifier.verify_proof(&requirement, &payload).await;

        assert!(!result.is_valid);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("invalid proof payload"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let prober = Arc::new(CountingProber::passing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::social_post();
        let payloads = vec![
            ProofPayload::Url("https://x.com/alice/status/1".to_string()),
            ProofPayload::Url("not a url".to_string()),
            ProofPayload::Url("https://t.me/channel/9".to_string()),
        ];

        let results = verifier.verify_batch(&requirement, &payloads).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_valid);
        assert!(!results[1].is_valid);
        assert_eq!(results[1].error.as_deref(), Some("malformed URL"));
        assert!(results[2].is_valid);
        // Only the two classifiable URLs reached the prober.
        assert_eq!(prober.call_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_with_failing_probe_keeps_other_items() {
        let prober = Arc::new(CountingProber::failing());
        let verifier = verifier_with_prober(prober.clone());
        let requirement = ProofRequirement::api("listen_time");
        let payloads = vec![
            ProofPayload::Data(json!({"listened_secs": 45.0})),
            ProofPayload::Data(json!({"listened_secs": 5.0, "min_listen_secs": 60.0})),
            ProofPayload::Data(json!({})),
        ];

        let results = verifier.verify_batch(&requirement, &payloads).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_valid);
        assert!(!results[1].is_valid);
        assert!(results[1].score > 0, "threshold miss keeps partial credit");
        assert!(!results[2].is_valid);
        assert_eq!(results[2].score, 0);
    }

    #[tokio::test]
    async fn test_all_scores_stay_in_range() {
        let verifier = verifier_with_prober(Arc::new(CountingProber::passing()));
        let requirement = ProofRequirement::api("game_playtime");
        let payloads = vec![
            ProofPayload::Data(json!({"game_id": "g", "playtime_minutes": 0.0, "min_playtime_minutes": 9999.0})),
            ProofPayload::Data(json!({"game_id": "g", "playtime_minutes": 1e12})),
            ProofPayload::Data(json!({"bogus": true})),
        ];

        for result in verifier.verify_batch(&requirement, &payloads).await {
            assert!(result.score <= 100);
        }
    }
}
