//! Social platform classification
//!
//! Pattern-matches raw proof URLs against the known platform URL shapes,
//! extracts the canonical post identifier, and normalizes the URL. Pure
//! functions, no network access.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Social platforms a mission can accept proof from.
///
/// Extended by adding a new pattern set to [`platform_shapes`], never by
/// runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Instagram,
    TikTok,
    Facebook,
    Telegram,
    Unknown,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Twitter => "Twitter",
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::Facebook => "Facebook",
            Platform::Telegram => "Telegram",
            Platform::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of classifying one raw URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Platform the URL belongs to, `Unknown` when classification failed
    pub platform: Platform,
    /// Trimmed URL with a single trailing slash removed
    pub normalized_url: String,
    /// Canonical post identifier extracted from the URL
    pub post_id: String,
    /// Whether a platform matched and an identifier was extracted
    pub is_valid: bool,
    /// Error message if any
    pub error: Option<String>,
}

impl ClassificationResult {
    fn invalid(normalized_url: String, error: &str) -> Self {
        Self {
            platform: Platform::Unknown,
            normalized_url,
            post_id: String::new(),
            is_valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Rough URL shape used to tell "malformed URL" apart from "no platform matched"
static URL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:https?)://[^/\s]+\.[^/\s]+(?:/\S*)?$").expect("static pattern")
});

fn compile(shapes: &[&str]) -> Vec<Regex> {
    shapes
        .iter()
        .map(|s| Regex::new(s).expect("static pattern"))
        .collect()
}

/// Accepted URL shapes per platform, tried in this order.
///
/// The order is fixed so a crafted string that could match more than one
/// platform's pattern always classifies the same way. Host matching is
/// case-insensitive; `twitter.com` and `x.com` are the same platform.
static PLATFORM_SHAPES: Lazy<Vec<(Platform, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            Platform::Twitter,
            compile(&[
                r"^(?i:https?://(?:www\.)?(?:twitter\.com|x\.com))/[A-Za-z0-9_]+/status(?:es)?/(?P<id>\d+)(?:[/?].*)?$",
                r"^(?i:https?://(?:www\.)?(?:twitter\.com|x\.com))/i/web/status/(?P<id>\d+)(?:[/?].*)?$",
            ]),
        ),
        (
            Platform::Instagram,
            compile(&[
                r"^(?i:https?://(?:www\.)?instagram\.com)/(?:p|reel|tv)/(?P<id>[A-Za-z0-9_-]+)(?:[/?].*)?$",
            ]),
        ),
        (
            Platform::TikTok,
            compile(&[
                r"^(?i:https?://(?:www\.|m\.)?tiktok\.com)/@[A-Za-z0-9_.]+/video/(?P<id>\d+)(?:[/?].*)?$",
                r"^(?i:https?://(?:www\.|m\.)?tiktok\.com)/v/(?P<id>\d+)(?:\.html)?(?:[/?].*)?$",
            ]),
        ),
        (
            Platform::Facebook,
            compile(&[
                r"^(?i:https?://(?:www\.|m\.)?facebook\.com)/[A-Za-z0-9.]+/posts/(?P<id>\d+)(?:[/?].*)?$",
                r"^(?i:https?://(?:www\.|m\.)?facebook\.com)/(?:permalink|story)\.php\?(?:[^#]*&)?story_fbid=(?P<id>\d+)(?:&.*)?$",
                r"^(?i:https?://(?:www\.|m\.)?facebook\.com)/photo\.php\?(?:[^#]*&)?fbid=(?P<id>\d+)(?:&.*)?$",
            ]),
        ),
        (
            Platform::Telegram,
            compile(&[
                r"^(?i:https?://(?:www\.)?(?:t\.me|telegram\.me))/(?P<channel>[A-Za-z0-9_]+)/(?P<msg>\d+)(?:[/?].*)?$",
            ]),
        ),
    ]
});

/// Trim whitespace and strip a single trailing slash.
fn normalize_url(raw_url: &str) -> String {
    let trimmed = raw_url.trim();
    match trimmed.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => trimmed.to_string(),
    }
}

/// Telegram identifiers are composite `channel_messageId`; everything else
/// captures a single `id` group.
fn extract_post_id(caps: &regex::Captures<'_>) -> String {
    match (caps.name("channel"), caps.name("msg")) {
        (Some(channel), Some(msg)) => format!("{}_{}", channel.as_str(), msg.as_str()),
        _ => caps
            .name("id")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    }
}

/// Classify a raw proof URL.
///
/// Never fails with a panic: any input comes back as a
/// [`ClassificationResult`], with `is_valid == false` and an error message
/// that distinguishes a malformed URL from an unrecognized platform.
pub fn classify(raw_url: &str) -> ClassificationResult {
    let cleaned = normalize_url(raw_url);

    if !URL_SHAPE.is_match(&cleaned) {
        return ClassificationResult::invalid(cleaned, "malformed URL");
    }

    for (platform, shapes) in PLATFORM_SHAPES.iter() {
        for shape in shapes {
            if let Some(caps) = shape.captures(&cleaned) {
                let post_id = extract_post_id(&caps);
                if post_id.is_empty() {
                    // Matched a platform shape but carries no identifier.
                    return ClassificationResult::invalid(
                        cleaned,
                        &format!("{} URL has no extractable post id", platform),
                    );
                }
                debug!(platform = %platform, post_id = %post_id, "classified proof url");
                return ClassificationResult {
                    platform: *platform,
                    normalized_url: cleaned,
                    post_id,
                    is_valid: true,
                    error: None,
                };
            }
        }
    }

    ClassificationResult::invalid(cleaned, "no known platform pattern matched")
}
