//! Verifier registry
//!
//! Keyed catalog of verification strategies. Each strategy is constructed
//! on first use, guarded by a per-key once cell, so unused strategies pay
//! no initialization cost and a race to first access yields one shared
//! instance. After construction the catalog is read-only.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::VerifyError;
use crate::verifier::{
    game_playtime::GamePlaytimeVerifier, http_ping::HttpPingVerifier,
    listen_time::ListenTimeVerifier, website_visit::WebsiteVisitVerifier, ApiVerifier,
    VerificationResult, VerifierInfo,
};

type VerifierFactory = Box<dyn Fn() -> Arc<dyn ApiVerifier> + Send + Sync>;

struct RegistryEntry {
    factory: VerifierFactory,
    instance: OnceCell<Arc<dyn ApiVerifier>>,
}

/// Catalog of named verification strategies
pub struct VerifierRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl VerifierRegistry {
    /// Empty registry; strategies are added with [`register`](Self::register).
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry holding the standard strategies.
    pub fn with_default_verifiers() -> Self {
        let mut registry = Self::new();
        registry.register(HttpPingVerifier::KEY, || Arc::new(HttpPingVerifier::new()));
        registry.register(WebsiteVisitVerifier::KEY, || {
            Arc::new(WebsiteVisitVerifier::new())
        });
        registry.register(GamePlaytimeVerifier::KEY, || {
            Arc::new(GamePlaytimeVerifier::new())
        });
        registry.register(ListenTimeVerifier::KEY, || Arc::new(ListenTimeVerifier::new()));
        registry
    }

    /// Register a strategy factory under `key`.
    ///
    /// Requires exclusive ownership: once the registry is shared behind an
    /// `Arc` the catalog can no longer change.
    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Arc<dyn ApiVerifier> + Send + Sync + 'static,
    {
        self.entries.insert(
            key.to_string(),
            RegistryEntry {
                factory: Box::new(factory),
                instance: OnceCell::new(),
            },
        );
    }

    /// Whether `key` is registered. Never constructs the strategy.
    pub fn has_verifier(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Resolve the strategy for `key`, constructing it on first use.
    pub fn get_verifier(&self, key: &str) -> Option<Arc<dyn ApiVerifier>> {
        self.entries.get(key).map(|entry| {
            entry
                .instance
                .get_or_init(|| {
                    debug!(key, "constructing verifier");
                    (entry.factory)()
                })
                .clone()
        })
    }

    /// Resolve every registered strategy. Discovery only, not a hot path.
    pub fn list_verifiers(&self) -> Vec<VerifierInfo> {
        let mut infos: Vec<VerifierInfo> = self
            .entries
            .keys()
            .filter_map(|key| self.get_verifier(key))
            .map(|verifier| verifier.info())
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    /// Run the strategy registered under `key` against `input`.
    ///
    /// An unknown key and a strategy that panics internally both come back
    /// as structured failures; no fault escapes this boundary.
    pub async fn verify_with_api(&self, key: &str, input: &Value) -> VerificationResult {
        let verifier = match self.get_verifier(key) {
            Some(v) => v,
            None => {
                warn!(key, "verifier lookup failed");
                return VerifyError::UnknownVerifier(key.to_string()).into();
            }
        };

        match AssertUnwindSafe(verifier.verify(input)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                warn!(key, detail = %detail, "verifier panicked");
                VerificationResult::failed(&format!(
                    "verifier '{}' failed internally: {}",
                    key, detail
                ))
            }
        }
    }
}

impl Default for VerifierRegistry {
    fn default() -> Self {
        Self::with_default_verifiers()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
