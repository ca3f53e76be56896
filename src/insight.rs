//! Remote text insights: summaries, topics, keywords and emotion labels.
//!
//! [`TextInsight`] only needs `generate`; the prompt-specific methods are provided on top of
//! it and parse loosely shaped responses. The `*_or_*` functions pair each call with its local
//! fallback, so a failed or garbled response never leaves this module.

use std::future::Future;
use std::sync::LazyLock;

use eyre::{Result, bail};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::report::TopicEntry;
use crate::text;

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s*").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("no JSON array found in response")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub trait TextInsight {
    /// Send a prompt, return the raw model text
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>>;

    fn summarize(&self, text: &str) -> impl Future<Output = Result<String>> {
        let prompt = format!(
            "You are a YouTube video summarizer. Summarize the entire video from the transcript below, \
             giving the important points within 250 words.\n\nTranscript:\n{text}"
        );
        async move { Ok(parse_summary(&self.generate(&prompt).await?)?) }
    }

    fn extract_topics(&self, text: &str) -> impl Future<Output = Result<Vec<TopicEntry>>> {
        let prompt = format!(
            "Analyze this YouTube video content and identify the main topics discussed.\n\n{text}\n\n\
             Return a JSON array of 5-8 objects shaped like \
             [{{\"topic\": \"Topic Name\", \"relevance\": 85, \"mentions\": 12}}] where relevance is 0-100 \
             and mentions is the estimated number of mentions. Return only the JSON array."
        );
        async move { Ok(parse_topics(&self.generate(&prompt).await?)?) }
    }

    fn extract_keywords(&self, text: &str, count: usize) -> impl Future<Output = Result<Vec<String>>> {
        let prompt = format!(
            "Extract the {count} most important keywords from this text. \
             Return only the keywords separated by commas, no additional text.\n\nText: \"{text}\""
        );
        async move { Ok(parse_keywords(&self.generate(&prompt).await?, count)?) }
    }

    fn classify_emotion(&self, text: &str) -> impl Future<Output = Result<String>> {
        let prompt = format!(
            "Analyze the emotion in this text and return only one word from: \
             joy, sadness, anger, fear, surprise, disgust, neutral.\n\nText: \"{text}\"\n\n\
             Return only the emotion word, nothing else."
        );
        async move { self.generate(&prompt).await }
    }
}

/// Gateway used when remote insights are disabled; every call takes the local fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineInsight;

impl TextInsight for OfflineInsight {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("remote insights disabled")
    }
}

pub fn parse_summary(response: &str) -> Result<String, ParseError> {
    let summary = response.trim();
    if summary.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(summary.to_string())
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    relevance: f64,
    #[serde(default)]
    mentions: f64,
}

/// The outermost `[...]` span of a response, if any
fn json_array_span(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (end > start).then(|| &response[start..=end])
}

/// Topics from the first JSON array in the response; relevance is clamped to 0-100
pub fn parse_topics(response: &str) -> Result<Vec<TopicEntry>, ParseError> {
    let span = json_array_span(response).ok_or(ParseError::NoJson)?;
    let raw: Vec<RawTopic> = serde_json::from_str(span)?;
    Ok(raw
        .into_iter()
        .filter(|t| !t.topic.trim().is_empty())
        .map(|t| TopicEntry {
            topic: t.topic.trim().to_string(),
            relevance: t.relevance.clamp(0.0, 100.0),
            mentions: t.mentions.max(0.0).round() as u32,
        })
        .collect())
}

/// Keywords from a JSON string array, or else a comma/newline separated list
pub fn parse_keywords(response: &str, count: usize) -> Result<Vec<String>, ParseError> {
    let candidates: Vec<String> = json_array_span(response)
        .and_then(|span| serde_json::from_str::<Vec<String>>(span).ok())
        .unwrap_or_else(|| {
            response
                .split([',', '\n'])
                .map(|s| s.to_string())
                .collect()
        });

    let mut keywords: Vec<String> = Vec::new();
    for candidate in candidates {
        let keyword = LIST_MARKER_RE
            .replace(&candidate, "")
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '.'))
            .to_string();
        if !keyword.is_empty() && !keywords.iter().any(|k| k.eq_ignore_ascii_case(&keyword)) {
            keywords.push(keyword);
        }
    }
    keywords.truncate(count);

    if keywords.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(keywords)
}

/// Remote summary, or a local extractive one when the gateway fails
pub async fn summary_or_local<G: TextInsight>(
    gateway: &G,
    transcript: &str,
    max_chars: usize,
    fallback_sentences: usize,
) -> String {
    if transcript.trim().is_empty() {
        return String::new();
    }
    match gateway.summarize(text::truncate_chars(transcript, max_chars)).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Summary unavailable, using extractive fallback: {e}");
            text::extractive_summary(transcript, fallback_sentences)
        }
    }
}

/// Remote topics, or none. Topics are never invented locally.
pub async fn topics_or_empty<G: TextInsight>(gateway: &G, content: &str) -> Vec<TopicEntry> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    match gateway.extract_topics(content).await {
        Ok(topics) => {
            debug!("Extracted {} topics", topics.len());
            topics
        }
        Err(e) => {
            warn!("Topic extraction failed: {e}");
            Vec::new()
        }
    }
}

/// Remote keywords, falling back to local frequency ranking over the full text
pub async fn keywords_or_local<G: TextInsight>(gateway: &G, text: &str, count: usize, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() || count == 0 {
        return Vec::new();
    }
    match gateway.extract_keywords(text::truncate_chars(text, max_chars), count).await {
        Ok(keywords) => keywords,
        Err(e) => {
            warn!("Keyword extraction failed, using local extractor: {e}");
            text::extract_keywords(text, count)
        }
    }
}
