pub mod aggregate;
pub mod cache;
pub mod config;
pub mod emotion;
pub mod error;
pub mod insight;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod quality;
pub mod recommendation;
pub mod report;
pub mod sentiment;
pub mod text;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;
use crate::sentiment::{SentimentClassifier, SentimentLabel};

/// Video details as shown to the user, already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    pub views: String,
    pub upload_date: String,
    pub duration: String,
    pub likes: u64,
    pub comments: u64,
    pub description: String,
}

/// Placeholder used when the platform cannot provide metadata
impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Title".to_string(),
            channel: "Unknown Channel".to_string(),
            views: "0 views".to_string(),
            upload_date: "Unknown date".to_string(),
            duration: "00:00".to_string(),
            likes: 0,
            comments: 0,
            description: String::new(),
        }
    }
}

/// A comment as fetched from the platform, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub published_at: String,
}

/// A classified comment. Sentiment fields are set once at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub likes: u64,
    pub published_at: String,
}

impl Comment {
    /// Classify a raw comment. The display text keeps its original casing.
    pub fn classify(raw: RawComment, classifier: &SentimentClassifier) -> Self {
        let (sentiment, sentiment_score) = classifier.classify(&text::normalize(&raw.text));
        Self {
            author: raw.author,
            text: raw.text,
            sentiment,
            sentiment_score,
            likes: raw.likes,
            published_at: raw.published_at,
        }
    }
}

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^([a-zA-Z0-9_-]{11})$",
        r"youtube\.com/watch\?(?:.*&)?v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Parse a video ID from a watch, youtu.be, embed or shorts URL, or a bare 11-character ID
pub fn parse_video_id(input: &str) -> Result<String, AnalyzeError> {
    let input = input.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
        .ok_or_else(|| AnalyzeError::InvalidInput(input.to_string()))
}

/// Round half away from zero to the given number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Count from a display string like "1.2M views" or "1,234 views"; K, M and B suffixes are expanded.
///
/// `None` for negative or unreadable input.
pub fn parse_view_count(views: &str) -> Option<u64> {
    let token = views.split_whitespace().next()?.replace(',', "");
    let (number, multiplier) = match token.chars().last()? {
        'K' | 'k' => (&token[..token.len() - 1], 1_000.0),
        'M' | 'm' => (&token[..token.len() - 1], 1_000_000.0),
        'B' | 'b' => (&token[..token.len() - 1], 1_000_000_000.0),
        _ => (token.as_str(), 1.0),
    };
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}
