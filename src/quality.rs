use serde::{Deserialize, Serialize};

use crate::round_to;

/// Weight of each quality signal. The defaults sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub content_length: f64,
    pub summary_quality: f64,
    pub keyword_richness: f64,
    pub engagement: f64,
    pub comment_activity: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            content_length: 0.25,
            summary_quality: 0.20,
            keyword_richness: 0.20,
            engagement: 0.20,
            comment_activity: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualitySignals {
    /// Transcript length in characters
    pub transcript_len: usize,
    pub summary_words: usize,
    pub keyword_count: usize,
    /// Percent, e.g. 0.1 means 0.1%
    pub engagement_rate: f64,
    pub comment_count: usize,
}

/// Content quality in [0, 1], rounded to two decimals
pub fn quality_score(signals: &QualitySignals, weights: &QualityWeights) -> f64 {
    let mut score = 0.0;

    if signals.transcript_len > 2000 {
        score += weights.content_length;
    } else if signals.transcript_len > 1000 {
        score += weights.content_length * 0.6;
    }

    if signals.summary_words > 30 {
        score += weights.summary_quality;
    } else if signals.summary_words > 15 {
        score += weights.summary_quality * 0.5;
    }

    if signals.keyword_count >= 5 {
        score += weights.keyword_richness;
    } else if signals.keyword_count >= 3 {
        score += weights.keyword_richness * 0.75;
    }

    if signals.engagement_rate > 0.1 {
        score += weights.engagement;
    } else if signals.engagement_rate > 0.05 {
        score += weights.engagement * 0.5;
    }

    if signals.comment_count > 100 {
        score += weights.comment_activity;
    } else if signals.comment_count > 50 {
        score += weights.comment_activity * 0.67;
    }

    round_to(score.clamp(0.0, 1.0), 2)
}
