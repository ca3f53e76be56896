use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;
use crate::sentiment::SentimentLabel;
use crate::{Comment, VideoMetadata};

/// A topic named by the remote gateway. Never produced locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub topic: String,
    /// 0-100
    pub relevance: f64,
    pub mentions: u32,
}

/// Share of comments carrying one sentiment label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Label shares within one index bucket of the comment list.
///
/// Buckets split the list by position, not by timestamp; `time` is a display label only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentOverTime {
    pub time: String,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAnalysisDetail {
    pub total_comments: usize,
    pub avg_sentiment: f64,
    pub engagement_rate: f64,
    pub top_keywords: Vec<String>,
    pub sentiment_distribution_detailed: BTreeMap<SentimentLabel, usize>,
    /// Counted over a sample of the first comments only
    pub emotion_distribution: BTreeMap<Emotion, usize>,
    pub quality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysisDetail {
    pub transcript_keywords: Vec<String>,
    pub transcript_emotion: Emotion,
    pub content_quality_score: f64,
}

/// Advice for viewers and for the video's creator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub viewer_tip: String,
    pub creator_suggestions: Vec<String>,
}

/// The complete analysis of one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video_id: String,
    pub video_info: VideoMetadata,
    pub summary: String,
    pub topics: Vec<TopicEntry>,
    pub sentiment_distribution: Vec<SentimentDistribution>,
    pub comment_analysis: CommentAnalysisDetail,
    pub sentiment_over_time: Vec<SentimentOverTime>,
    pub top_comments: Vec<Comment>,
    pub video_analysis_detail: VideoAnalysisDetail,
    #[serde(default)]
    pub recommendation: Recommendation,
    /// Seconds from request start to assembly
    pub processing_time: f64,
    #[serde(default)]
    pub cached: bool,
}
