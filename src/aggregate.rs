//! Statistics over a classified comment list.
//!
//! Every function reads the same ingestion-time snapshot; none of them classify.

use std::collections::BTreeMap;

use crate::emotion::Emotion;
use crate::report::{SentimentDistribution, SentimentOverTime};
use crate::sentiment::SentimentLabel;
use crate::{Comment, parse_view_count, round_to};

/// Display labels of the timeline buckets. Buckets split comments by index, not by playback time.
pub const TIMELINE_BUCKETS: [&str; 8] = [
    "0-2 min", "2-4 min", "4-6 min", "6-8 min", "8-10 min", "10-12 min", "12-14 min", "14+ min",
];

fn color(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "#22c55e",
        SentimentLabel::Neutral => "#64748b",
        SentimentLabel::Negative => "#ef4444",
    }
}

fn percent(count: usize, total: usize) -> f64 {
    round_to(count as f64 / total as f64 * 100.0, 1)
}

/// Comment count per label; all three labels are always present
pub fn label_histogram(comments: &[Comment]) -> BTreeMap<SentimentLabel, usize> {
    let mut counts: BTreeMap<SentimentLabel, usize> = SentimentLabel::ALL.iter().map(|l| (*l, 0)).collect();
    for comment in comments {
        *counts.entry(comment.sentiment).or_default() += 1;
    }
    counts
}

/// Share of each label in percent.
///
/// With no comments this is the fixed placeholder 60/30/10, not a measurement.
pub fn sentiment_distribution(comments: &[Comment]) -> Vec<SentimentDistribution> {
    let values: [f64; 3] = if comments.is_empty() {
        [60.0, 30.0, 10.0]
    } else {
        let counts = label_histogram(comments);
        SentimentLabel::ALL.map(|label| percent(counts[&label], comments.len()))
    };

    SentimentLabel::ALL
        .iter()
        .zip(values)
        .map(|(label, value)| SentimentDistribution {
            name: label.as_str().to_string(),
            value,
            color: color(*label).to_string(),
        })
        .collect()
}

/// Label shares for 8 equal index buckets; empty buckets get 50/25/25
pub fn sentiment_over_time(comments: &[Comment]) -> Vec<SentimentOverTime> {
    let segment_size = (comments.len() / TIMELINE_BUCKETS.len()).max(1);

    TIMELINE_BUCKETS
        .iter()
        .enumerate()
        .map(|(i, time)| {
            let start = (i * segment_size).min(comments.len());
            let end = ((i + 1) * segment_size).min(comments.len());
            let segment = &comments[start..end];

            if segment.is_empty() {
                return SentimentOverTime {
                    time: time.to_string(),
                    positive: 50.0,
                    negative: 25.0,
                    neutral: 25.0,
                };
            }

            let counts = label_histogram(segment);
            SentimentOverTime {
                time: time.to_string(),
                positive: percent(counts[&SentimentLabel::Positive], segment.len()),
                negative: percent(counts[&SentimentLabel::Negative], segment.len()),
                neutral: percent(counts[&SentimentLabel::Neutral], segment.len()),
            }
        })
        .collect()
}

/// The `k` most liked comments; ties keep fetch order
pub fn top_comments(comments: &[Comment], k: usize) -> Vec<Comment> {
    let mut sorted: Vec<&Comment> = comments.iter().collect();
    sorted.sort_by(|a, b| b.likes.cmp(&a.likes));
    sorted.into_iter().take(k).cloned().collect()
}

/// Mean score over comments with a nonzero score, 0.0 when there are none
pub fn mean_sentiment(comments: &[Comment]) -> f64 {
    let scores: Vec<f64> = comments
        .iter()
        .map(|c| c.sentiment_score)
        .filter(|s| *s != 0.0)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Emotion counts over a sample. No sample at all counts as a single Neutral.
pub fn emotion_histogram(emotions: &[Emotion]) -> BTreeMap<Emotion, usize> {
    if emotions.is_empty() {
        return BTreeMap::from([(Emotion::Neutral, 1)]);
    }
    let mut counts = BTreeMap::new();
    for emotion in emotions {
        *counts.entry(*emotion).or_default() += 1;
    }
    counts
}

/// Comments per view, in percent. 0.0 when the view string cannot be read.
pub fn engagement_rate(comment_count: usize, views: &str) -> f64 {
    match parse_view_count(views) {
        Some(view_count) => comment_count as f64 / view_count.max(1) as f64 * 100.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(sentiment: SentimentLabel, score: f64, likes: u64, author: &str) -> Comment {
        Comment {
            author: author.to_string(),
            text: format!("comment by {author}"),
            sentiment,
            sentiment_score: score,
            likes,
            published_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn values(dist: &[SentimentDistribution]) -> Vec<(&str, f64)> {
        dist.iter().map(|d| (d.name.as_str(), d.value)).collect()
    }

    fn six_positive_four_neutral() -> Vec<Comment> {
        let mut comments: Vec<Comment> = (0..6)
            .map(|i| comment(SentimentLabel::Positive, 0.5, i, &format!("p{i}")))
            .collect();
        comments.extend((0..4).map(|i| comment(SentimentLabel::Neutral, 0.0, i, &format!("n{i}"))));
        comments
    }

    #[test]
    fn test_distribution_empty_is_placeholder() {
        let dist = sentiment_distribution(&[]);
        assert_eq!(values(&dist), vec![("Positive", 60.0), ("Neutral", 30.0), ("Negative", 10.0)]);
        assert_eq!(dist[0].color, "#22c55e");
        assert_eq!(dist[2].color, "#ef4444");
    }

    #[test]
    fn test_distribution_six_four() {
        let comments = six_positive_four_neutral();
        assert_eq!(
            values(&sentiment_distribution(&comments)),
            vec![("Positive", 60.0), ("Neutral", 40.0), ("Negative", 0.0)]
        );
        assert_eq!(mean_sentiment(&comments), 0.5);
    }

    #[test]
    fn test_distribution_rounds_each_label() {
        let comments = vec![
            comment(SentimentLabel::Positive, 0.4, 0, "a"),
            comment(SentimentLabel::Neutral, 0.0, 0, "b"),
            comment(SentimentLabel::Negative, -0.4, 0, "c"),
        ];
        for entry in sentiment_distribution(&comments) {
            assert_eq!(entry.value, 33.3);
        }
    }

    #[test]
    fn test_label_histogram_has_all_labels() {
        let hist = label_histogram(&[]);
        assert_eq!(hist.len(), 3);
        assert!(hist.values().all(|c| *c == 0));

        let hist = label_histogram(&six_positive_four_neutral());
        assert_eq!(hist[&SentimentLabel::Positive], 6);
        assert_eq!(hist[&SentimentLabel::Neutral], 4);
        assert_eq!(hist[&SentimentLabel::Negative], 0);
    }

    #[test]
    fn test_timeline_empty_uses_placeholder() {
        let timeline = sentiment_over_time(&[]);
        assert_eq!(timeline.len(), 8);
        for bucket in &timeline {
            assert_eq!((bucket.positive, bucket.negative, bucket.neutral), (50.0, 25.0, 25.0));
        }
        assert_eq!(timeline[7].time, "14+ min");
    }

    #[test]
    fn test_timeline_fewer_comments_than_buckets() {
        let comments = vec![
            comment(SentimentLabel::Positive, 0.5, 0, "a"),
            comment(SentimentLabel::Negative, -0.5, 0, "b"),
            comment(SentimentLabel::Neutral, 0.0, 0, "c"),
        ];
        let timeline = sentiment_over_time(&comments);
        assert_eq!(timeline[0].positive, 100.0);
        assert_eq!(timeline[1].negative, 100.0);
        assert_eq!(timeline[2].neutral, 100.0);
        assert_eq!(timeline[3].positive, 50.0);
    }

    #[test]
    fn test_timeline_index_buckets() {
        // 17 comments: segment size 2, the last comment falls outside every bucket
        let mut comments: Vec<Comment> = (0..16)
            .map(|i| {
                let label = if i < 2 { SentimentLabel::Negative } else { SentimentLabel::Positive };
                comment(label, 0.0, 0, &format!("c{i}"))
            })
            .collect();
        comments.push(comment(SentimentLabel::Negative, -1.0, 0, "late"));

        let timeline = sentiment_over_time(&comments);
        assert_eq!(timeline[0].negative, 100.0);
        assert!(timeline[1..].iter().all(|b| b.positive == 100.0));
    }

    #[test]
    fn test_top_comments_stable_on_ties() {
        let comments = vec![
            comment(SentimentLabel::Neutral, 0.0, 5, "first"),
            comment(SentimentLabel::Neutral, 0.0, 9, "most"),
            comment(SentimentLabel::Neutral, 0.0, 5, "second"),
            comment(SentimentLabel::Neutral, 0.0, 1, "x"),
            comment(SentimentLabel::Neutral, 0.0, 5, "third"),
            comment(SentimentLabel::Neutral, 0.0, 0, "y"),
            comment(SentimentLabel::Neutral, 0.0, 2, "z"),
        ];
        let authors: Vec<String> = top_comments(&comments, 5).into_iter().map(|c| c.author).collect();
        assert_eq!(authors, vec!["most", "first", "second", "third", "z"]);
    }

    #[test]
    fn test_mean_sentiment_ignores_zero_scores() {
        assert_eq!(mean_sentiment(&[]), 0.0);
        let comments = vec![
            comment(SentimentLabel::Neutral, 0.0, 0, "a"),
            comment(SentimentLabel::Neutral, 0.0, 0, "b"),
        ];
        assert_eq!(mean_sentiment(&comments), 0.0);
    }

    #[test]
    fn test_emotion_histogram() {
        assert_eq!(emotion_histogram(&[]), BTreeMap::from([(Emotion::Neutral, 1)]));
        let hist = emotion_histogram(&[Emotion::Joy, Emotion::Joy, Emotion::Anger]);
        assert_eq!(hist[&Emotion::Joy], 2);
        assert_eq!(hist[&Emotion::Anger], 1);
        assert!(!hist.contains_key(&Emotion::Neutral));
    }

    #[test]
    fn test_engagement_rate() {
        let rate = engagement_rate(120, "1.2M views");
        assert!((rate - 0.01).abs() < 1e-12);
        assert_eq!(engagement_rate(5, "500 views"), 1.0);
        assert_eq!(engagement_rate(3, "0 views"), 300.0);
        assert_eq!(engagement_rate(3, "lots of views"), 0.0);
    }
}
