use std::fmt;
use std::future::Future;

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::{RawComment, VideoMetadata};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentOrder {
    #[default]
    Relevance,
    Time,
}

impl CommentOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentOrder::Relevance => "relevance",
            CommentOrder::Time => "time",
        }
    }
}

impl fmt::Display for CommentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of video metadata, comments and transcripts
pub trait VideoPlatform {
    fn get_metadata(&self, video_id: &str) -> impl Future<Output = Result<VideoMetadata>>;

    /// Up to `max_results` top-level comments in the given order
    fn get_comments(
        &self,
        video_id: &str,
        max_results: usize,
        order: CommentOrder,
    ) -> impl Future<Output = Result<Vec<RawComment>>>;

    /// Full transcript text. An empty string means the video has no captions.
    fn get_transcript(&self, video_id: &str) -> impl Future<Output = Result<String>>;
}
