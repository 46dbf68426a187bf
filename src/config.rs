//! Verification configuration
//!
//! Network and fan-out knobs for the orchestrator. Scoring constants live
//! next to the strategy that uses them; all of them are tunable rather
//! than load-bearing business logic.

use serde::{Deserialize, Serialize};

/// Configuration for the verification orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Timeout applied to each social post probe, in seconds
    pub probe_timeout_secs: u64,
    /// Maximum number of proofs verified concurrently in a batch
    pub max_concurrent_proofs: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 10,
            max_concurrent_proofs: 8,
        }
    }
}
