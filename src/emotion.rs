use std::fmt;

use futures::stream::{self, StreamExt};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::Comment;
use crate::insight::TextInsight;
use crate::text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    #[default]
    Neutral,
}

const SYNONYMS: &[(&str, Emotion)] = &[
    ("joy", Emotion::Joy),
    ("happiness", Emotion::Joy),
    ("happy", Emotion::Joy),
    ("sadness", Emotion::Sadness),
    ("sad", Emotion::Sadness),
    ("anger", Emotion::Anger),
    ("angry", Emotion::Anger),
    ("fear", Emotion::Fear),
    ("afraid", Emotion::Fear),
    ("surprise", Emotion::Surprise),
    ("surprised", Emotion::Surprise),
    ("disgust", Emotion::Disgust),
    ("disgusted", Emotion::Disgust),
    ("neutral", Emotion::Neutral),
];

impl Emotion {
    /// Map a free-text model answer onto the closed label set; anything unknown is Neutral
    pub fn from_response(response: &str) -> Self {
        let word = response
            .trim()
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == word)
            .map(|(_, emotion)| *emotion)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Anger => "Anger",
            Emotion::Fear => "Fear",
            Emotion::Surprise => "Surprise",
            Emotion::Disgust => "Disgust",
            Emotion::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emotion of a text from its first `max_chars` characters. Remote errors give Neutral, without retry.
pub async fn classify_emotion<G: TextInsight>(gateway: &G, text: &str, max_chars: usize) -> Emotion {
    let text = text::truncate_chars(text.trim(), max_chars);
    if text.is_empty() {
        return Emotion::Neutral;
    }
    match gateway.classify_emotion(text).await {
        Ok(response) => Emotion::from_response(&response),
        Err(e) => {
            warn!("Emotion detection failed: {e}");
            Emotion::Neutral
        }
    }
}

/// Emotions of the first `sample_size` comments, in comment order.
///
/// At most `concurrency` gateway calls are in flight at once.
pub async fn sample_emotions<G: TextInsight>(
    gateway: &G,
    comments: &[Comment],
    sample_size: usize,
    max_chars: usize,
    concurrency: usize,
) -> Vec<Emotion> {
    stream::iter(comments.iter().take(sample_size))
        .map(|comment| classify_emotion(gateway, &comment.text, max_chars))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
