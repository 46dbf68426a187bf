//! Mission Proof Verification
//!
//! Verifies user-submitted proof that a paid engagement mission was
//! completed, before rewards are released. Proof is either a URL pointing
//! at a social media post or structured data checked by a named verifier.
//! The subsystem decides validity and confidence only; rewards,
//! persistence, and presentation belong to the calling systems.
//!
//! ## Module Structure
//!
//! - `classify`: platform classification of social post URLs
//! - `probe`: lightweight existence checks against classified posts
//! - `verifier`: shared strategy contract and the standard strategies
//! - `registry`: keyed, lazily-built catalog of strategies
//! - `orchestrator`: routing, allow-list policy, batch aggregation
//! - `config`: network and fan-out tunables
//! - `error`: failure taxonomy
//!
//! Every public operation returns a result value; no failure mode panics
//! across this boundary.

/// Platform classification of social post URLs
pub mod classify;

/// Verification configuration
pub mod config;

/// Failure taxonomy
pub mod error;

/// Proof routing and batch aggregation
pub mod orchestrator;

/// Social post existence probing
pub mod probe;

/// Verifier catalog
pub mod registry;

/// Verifier contract and the standard strategies
pub mod verifier;

pub use classify::{classify, ClassificationResult, Platform};
pub use config::VerifyConfig;
pub use error::VerifyError;
pub use orchestrator::{ProofMode, ProofPayload, ProofRequirement, ProofVerifier};
pub use probe::{HttpProber, SocialProber, PROBE_USER_AGENT};
pub use registry::VerifierRegistry;
pub use verifier::{ApiVerifier, VerificationResult, VerifierInfo, MAX_SCORE};
