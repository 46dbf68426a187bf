//! Game playtime verifier
//!
//! Checks a measured playtime against the mission's minimum. The proof
//! names the game either by id or by a Steam profile URL; at least one of
//! the two is required.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{score_against_threshold, ApiVerifier, VerificationResult};
use crate::error::VerifyError;

/// Confidence granted when playtime meets the minimum. Tunable.
pub const PLAYTIME_BASE_SCORE: u8 = 95;

/// Penalty applied when playtime misses the minimum. Tunable.
pub const PLAYTIME_THRESHOLD_PENALTY: u8 = 40;

/// Minimum playtime in minutes used when the mission does not supply one
pub const DEFAULT_MIN_PLAYTIME_MINUTES: f64 = 30.0;

fn default_min_playtime() -> f64 {
    DEFAULT_MIN_PLAYTIME_MINUTES
}

#[derive(Debug, Deserialize)]
struct GamePlaytimeInput {
    #[serde(default)]
    game_id: Option<String>,
    #[serde(default)]
    steam_profile_url: Option<String>,
    playtime_minutes: f64,
    #[serde(default = "default_min_playtime")]
    min_playtime_minutes: f64,
}

/// Playtime check for game missions
pub struct GamePlaytimeVerifier;

impl GamePlaytimeVerifier {
    pub const KEY: &'static str = "game_playtime";

    pub fn new() -> Self {
        Self
    }
}

impl Default for GamePlaytimeVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiVerifier for GamePlaytimeVerifier {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "Game Playtime"
    }

    fn description(&self) -> &'static str {
        "Checks that the player logged the required playtime in the target game"
    }

    async fn verify(&self, input: &Value) -> VerificationResult {
        let input: GamePlaytimeInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return VerifyError::InvalidPayload(e.to_string()).into(),
        };

        if input.game_id.is_none() && input.steam_profile_url.is_none() {
            return VerifyError::MissingField("game_id or steam_profile_url").into();
        }
        if input.playtime_minutes < 0.0 {
            return VerifyError::InvalidPayload(
                "playtime_minutes must be non-negative".to_string(),
            )
            .into();
        }

        let game = input
            .game_id
            .as_deref()
            .or(input.steam_profile_url.as_deref())
            .unwrap_or_default();
        debug!(game = %game, playtime = input.playtime_minutes, "game playtime check");

        let mut result = score_against_threshold(
            input.playtime_minutes,
            input.min_playtime_minutes,
            PLAYTIME_BASE_SCORE,
            PLAYTIME_THRESHOLD_PENALTY,
            "playtime",
            "min",
        );
        result.metadata = Some(json!({
            "game_id": input.game_id,
            "steam_profile_url": input.steam_profile_url,
            "playtime_minutes": input.playtime_minutes,
            "min_playtime_minutes": input.min_playtime_minutes,
        }));
        result
    }
}
