use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use stop_words::LANGUAGE;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[@#]\w+").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+(\s+|$)").unwrap());

/// English stop words (NLTK list)
static STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    stop_words::get(LANGUAGE::English)
        .iter()
        .map(|word| word.to_string())
        .collect()
});

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
];

/// Singulars ending in "ie", whose plurals would otherwise become "-y"
const IE_SINGULARS: &[&str] = &[
    "auntie", "birdie", "brownie", "calorie", "cookie", "foodie", "freebie", "genie", "goalie", "hippie",
    "hoodie", "indie", "lingerie", "magpie", "movie", "necktie", "newbie", "pixie", "prairie", "rookie",
    "roadie", "selfie", "smoothie", "sweetie", "techie", "veggie", "zombie",
];

/// Words ending in "s" that are not plurals
const INVARIANT: &[&str] = &[
    "always", "perhaps", "sometimes", "series", "species", "towards", "afterwards", "nowadays",
    "besides", "whereas", "lens", "chaos", "canvas", "atlas", "bias",
];

/// Normalize text for analysis: drop URLs and @/# tags, collapse whitespace, lowercase.
///
/// Only for analysis input; displayed text keeps its original casing.
pub fn normalize(text: &str) -> String {
    let text = URL_RE.replace_all(text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = SPACE_RE.replace_all(&text, " ");
    text.trim().to_lowercase()
}

/// Split into lowercase word tokens, keeping only purely alphabetic ones
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

/// Reduce a (noun) token to its singular form.
///
/// A suffix rule only applies when the result keeps the token's English stem; otherwise the token
/// comes back unchanged ("news" stays "news").
pub fn lemmatize(token: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == token) {
        return lemma.to_string();
    }
    if INVARIANT.contains(&token) {
        return token.to_string();
    }

    match singular(token) {
        Some(lemma) if STEMMER.stem(&lemma) == STEMMER.stem(token) => lemma,
        _ => token.to_string(),
    }
}

fn singular(token: &str) -> Option<String> {
    let len = token.len();
    if len > 4 && token.ends_with("ies") {
        let base = &token[..len - 3];
        let ie = format!("{base}ie");
        if IE_SINGULARS.contains(&ie.as_str()) {
            return Some(ie);
        }
        return Some(format!("{base}y"));
    }
    if token.ends_with("sses") {
        return Some(token[..len - 2].to_string());
    }
    if len > 4 && (token.ends_with("xes") || token.ends_with("ches") || token.ends_with("shes")) {
        return Some(token[..len - 2].to_string());
    }
    if len > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") && !token.ends_with("is") {
        return Some(token[..len - 1].to_string());
    }
    None
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Content tokens: stop words dropped on the surface form, then lemmatized; tokens of two
/// letters or fewer are removed
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .map(|t| lemmatize(&t))
        .filter(|t| t.chars().count() > 2 && !is_stop_word(t))
        .collect()
}

fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

/// Rank content tokens by frequency, ties broken by first occurrence.
///
/// Tokens sharing an English stem count together under the first lemma seen.
pub fn word_frequencies(text: &str) -> Vec<(String, usize)> {
    let mut groups: HashMap<String, (String, usize, usize)> = HashMap::new();
    for (idx, token) in content_tokens(text).into_iter().enumerate() {
        groups.entry(stem(&token)).or_insert_with(|| (token, 0, idx)).1 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = groups.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(word, count, _)| (word, count)).collect()
}

/// Local frequency-based keyword extraction
pub fn extract_keywords(text: &str, num_keywords: usize) -> Vec<String> {
    word_frequencies(text)
        .into_iter()
        .take(num_keywords)
        .map(|(word, _)| word)
        .collect()
}

/// Extractive summary: the highest scoring sentences, kept in their original order.
///
/// A sentence scores the summed corpus frequency of its content tokens' stems.
pub fn extractive_summary(text: &str, max_sentences: usize) -> String {
    let mut freqs: HashMap<String, usize> = HashMap::new();
    for token in content_tokens(text) {
        *freqs.entry(stem(&token)).or_default() += 1;
    }

    let sentences: Vec<&str> = SENTENCE_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut scored: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let score = content_tokens(sentence)
                .iter()
                .map(|t| freqs.get(&stem(t)).copied().unwrap_or(0))
                .sum();
            (idx, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut keep: Vec<usize> = scored.into_iter().take(max_sentences).map(|(idx, _)| idx).collect();
    keep.sort_unstable();

    keep.iter()
        .map(|&idx| format!("{}.", sentences[idx].trim_end_matches(['.', '!', '?'])))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
