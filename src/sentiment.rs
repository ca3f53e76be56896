//! Polarity scoring and three-way sentiment labels.
//!
//! A [`SentimentClassifier`] averages one or more [`PolarityEstimator`]s and applies a
//! symmetric threshold band. Two lexicon estimators ship by default.

use std::fmt;

use eyre::Result;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [SentimentLabel::Positive, SentimentLabel::Neutral, SentimentLabel::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anything that can score text polarity in [-1, 1]
pub trait PolarityEstimator: Send + Sync {
    fn name(&self) -> &str;

    fn polarity(&self, text: &str) -> Result<f64>;
}

/// Valence lexicon, roughly on the VADER [-4, 4] scale
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("clear", 1.6),
    ("cool", 1.3),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("funny", 1.9),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("informative", 1.5),
    ("inspiring", 2.2),
    ("interesting", 1.7),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("recommend", 1.5),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("well", 1.1),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("angry", -2.3),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -2.1),
    ("clickbait", -1.5),
    ("confusing", -0.9),
    ("cringe", -1.5),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("fail", -2.5),
    ("failed", -2.3),
    ("fake", -2.1),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("lies", -1.8),
    ("misleading", -1.7),
    ("poor", -2.1),
    ("problem", -1.7),
    ("sad", -2.1),
    ("scam", -2.0),
    ("stupid", -2.4),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("ugly", -3.1),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wasted", -2.2),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const BOOSTERS: &[&str] = &["absolutely", "extremely", "incredibly", "really", "so", "super", "totally", "very"];
const DAMPENERS: &[&str] = &["barely", "kinda", "slightly", "somewhat"];
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without", "dont", "isnt",
    "wasnt", "doesnt", "didnt", "cant", "wont",
];

const BOOST: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const NORMALIZE_ALPHA: f64 = 15.0;

fn valence(word: &str) -> Option<f64> {
    LEXICON.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Valence of each lexicon hit, adjusted for boosters and negation in the preceding three words
fn scored_hits(words: &[String]) -> Vec<f64> {
    let mut hits = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let Some(mut v) = valence(word) else { continue };
        let base_sign = v.signum();

        for (distance, scale) in [(1usize, 1.0), (2, 0.95), (3, 0.9)] {
            let Some(prev) = i.checked_sub(distance).map(|j| words[j].as_str()) else { break };
            if BOOSTERS.contains(&prev) {
                v += base_sign * BOOST * scale;
            } else if DAMPENERS.contains(&prev) {
                v -= base_sign * BOOST * scale;
            }
        }

        let negated = (1..=3)
            .filter_map(|d| i.checked_sub(d))
            .any(|j| is_negation(&words[j]));
        if negated {
            v *= NEGATION_SCALAR;
        }
        hits.push(v);
    }
    hits
}

/// Sums adjusted valences and squashes the total into [-1, 1]
#[derive(Debug, Default)]
pub struct LexiconEstimator;

impl PolarityEstimator for LexiconEstimator {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64> {
        let mut sum: f64 = scored_hits(&words(text)).iter().sum();
        if sum != 0.0 {
            let bangs = text.matches('!').count().min(4) as f64;
            sum += sum.signum() * bangs * EXCLAMATION_BOOST;
        }
        let score = sum / (sum * sum + NORMALIZE_ALPHA).sqrt();
        Ok(score.clamp(-1.0, 1.0))
    }
}

/// Mean adjusted valence of lexicon hits, scaled to [-1, 1]
#[derive(Debug, Default)]
pub struct AverageEstimator;

impl PolarityEstimator for AverageEstimator {
    fn name(&self) -> &str {
        "average"
    }

    fn polarity(&self, text: &str) -> Result<f64> {
        let hits = scored_hits(&words(text));
        if hits.is_empty() {
            return Ok(0.0);
        }
        let mean = hits.iter().sum::<f64>() / hits.len() as f64;
        Ok((mean / 4.0).clamp(-1.0, 1.0))
    }
}

/// Averages its estimators and labels the result with a symmetric threshold band
pub struct SentimentClassifier {
    estimators: Vec<Box<dyn PolarityEstimator>>,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl SentimentClassifier {
    pub fn new(positive_threshold: f64, negative_threshold: f64) -> Self {
        Self::with_estimators(
            vec![Box::new(LexiconEstimator), Box::new(AverageEstimator)],
            positive_threshold,
            negative_threshold,
        )
    }

    pub fn with_estimators(
        estimators: Vec<Box<dyn PolarityEstimator>>,
        positive_threshold: f64,
        negative_threshold: f64,
    ) -> Self {
        Self {
            estimators,
            positive_threshold,
            negative_threshold,
        }
    }

    /// Label and score come from the same pass; any estimator failure yields (Neutral, 0.0).
    pub fn classify(&self, text: &str) -> (SentimentLabel, f64) {
        if self.estimators.is_empty() {
            return (SentimentLabel::Neutral, 0.0);
        }

        let mut total = 0.0;
        for estimator in &self.estimators {
            match estimator.polarity(text) {
                Ok(p) => total += p,
                Err(e) => {
                    warn!("Polarity estimator '{}' failed: {e}", estimator.name());
                    return (SentimentLabel::Neutral, 0.0);
                }
            }
        }

        let score = (total / self.estimators.len() as f64).clamp(-1.0, 1.0);
        (self.label_for(score), score)
    }

    pub fn label_for(&self, score: f64) -> SentimentLabel {
        if score > self.positive_threshold {
            SentimentLabel::Positive
        } else if score < self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(0.1, -0.1)
    }
}
