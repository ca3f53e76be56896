use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::platform::CommentOrder;
use crate::quality::QualityWeights;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub lang: Option<String>,
    pub analysis: AnalysisSettings,
}

/// Knobs of a single analysis run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub max_comments: usize,
    pub comment_order: CommentOrder,
    pub comment_keywords: usize,
    pub transcript_keywords: usize,
    /// Only the first N comments are emotion-classified
    pub emotion_sample: usize,
    pub emotion_prefix_chars: usize,
    pub keyword_prefix_chars: usize,
    /// Transcript characters sent for summary and topics
    pub max_prompt_chars: usize,
    pub summary_sentences: usize,
    pub top_comments: usize,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub sentiment_positive: f64,
    pub sentiment_negative: f64,
    pub weights: QualityWeights,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_comments: 100,
            comment_order: CommentOrder::Relevance,
            comment_keywords: 10,
            transcript_keywords: 8,
            emotion_sample: 20,
            emotion_prefix_chars: 500,
            keyword_prefix_chars: 2000,
            max_prompt_chars: 4000,
            summary_sentences: 3,
            top_comments: 5,
            concurrency: 4,
            timeout_secs: 300,
            sentiment_positive: 0.1,
            sentiment_negative: -0.1,
            weights: QualityWeights::default(),
        }
    }
}

impl Config {
    /// Load config from ~/.config/ytsense/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsense")
        .join("config.toml")
}
