//! Viewer and creator advice derived from an assembled analysis.

use std::collections::BTreeMap;

use crate::report::Recommendation;
use crate::sentiment::SentimentLabel;
use crate::{VideoMetadata, parse_view_count};

pub const HIGHLY_RECOMMENDED: &str = "Highly Recommended to Watch";
pub const CONSIDER_WATCHING: &str = "Consider Watching Based on Your Interest";
pub const MAY_SKIP: &str = "May Skip: Mixed/Negative Feedback";

pub const IMPROVE_CLARITY: &str = "Improve content clarity or engagement to reduce negative sentiment.";
pub const ADD_HOOKS: &str = "Add emotional hooks or storytelling to make content more engaging.";
pub const BOOST_VISIBILITY: &str = "Boost visibility through SEO or social media.";
pub const ENCOURAGE_COMMENTS: &str = "Encourage viewers to engage in comments.";

/// Share of positive comments in [0, 1]; 0.0 without comments
pub fn positive_ratio(labels: &BTreeMap<SentimentLabel, usize>) -> f64 {
    let total: usize = labels.values().sum();
    if total == 0 {
        return 0.0;
    }
    labels.get(&SentimentLabel::Positive).copied().unwrap_or(0) as f64 / total as f64
}

/// Advice from the comment label counts, the content quality score and the platform's counters.
///
/// An unreadable view string counts as zero views.
pub fn recommend(
    labels: &BTreeMap<SentimentLabel, usize>,
    quality_score: f64,
    metadata: &VideoMetadata,
) -> Recommendation {
    let ratio = positive_ratio(labels);
    let views = parse_view_count(&metadata.views).unwrap_or(0);

    let viewer_tip = if ratio >= 0.6 && quality_score >= 0.6 {
        HIGHLY_RECOMMENDED
    } else if ratio >= 0.4 {
        CONSIDER_WATCHING
    } else {
        MAY_SKIP
    };

    let mut creator_suggestions = Vec::new();
    if ratio < 0.5 {
        creator_suggestions.push(IMPROVE_CLARITY.to_string());
    }
    if quality_score < 0.4 {
        creator_suggestions.push(ADD_HOOKS.to_string());
    }
    if views < 1000 {
        creator_suggestions.push(BOOST_VISIBILITY.to_string());
    }
    if metadata.comments < 10 {
        creator_suggestions.push(ENCOURAGE_COMMENTS.to_string());
    }

    Recommendation {
        viewer_tip: viewer_tip.to_string(),
        creator_suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(positive: usize, neutral: usize, negative: usize) -> BTreeMap<SentimentLabel, usize> {
        BTreeMap::from([
            (SentimentLabel::Positive, positive),
            (SentimentLabel::Neutral, neutral),
            (SentimentLabel::Negative, negative),
        ])
    }

    fn popular() -> VideoMetadata {
        VideoMetadata {
            views: "1.2M views".to_string(),
            comments: 4_500,
            ..VideoMetadata::default()
        }
    }

    #[test]
    fn test_positive_ratio() {
        assert_eq!(positive_ratio(&labels(0, 0, 0)), 0.0);
        assert_eq!(positive_ratio(&BTreeMap::new()), 0.0);
        assert_eq!(positive_ratio(&labels(6, 3, 1)), 0.6);
    }

    #[test]
    fn test_highly_recommended_needs_sentiment_and_quality() {
        let rec = recommend(&labels(6, 3, 1), 0.6, &popular());
        assert_eq!(rec.viewer_tip, HIGHLY_RECOMMENDED);
        assert!(rec.creator_suggestions.is_empty());

        let rec = recommend(&labels(6, 3, 1), 0.59, &popular());
        assert_eq!(rec.viewer_tip, CONSIDER_WATCHING);
    }

    #[test]
    fn test_consider_watching_band() {
        let rec = recommend(&labels(4, 4, 2), 0.9, &popular());
        assert_eq!(rec.viewer_tip, CONSIDER_WATCHING);
        assert_eq!(rec.creator_suggestions, vec![IMPROVE_CLARITY]);
    }

    #[test]
    fn test_may_skip_below_forty_percent() {
        let rec = recommend(&labels(3, 3, 4), 0.9, &popular());
        assert_eq!(rec.viewer_tip, MAY_SKIP);
        assert_eq!(rec.creator_suggestions, vec![IMPROVE_CLARITY]);
    }

    #[test]
    fn test_half_positive_needs_no_clarity_advice() {
        let rec = recommend(&labels(5, 5, 0), 0.9, &popular());
        assert!(!rec.creator_suggestions.contains(&IMPROVE_CLARITY.to_string()));
    }

    #[test]
    fn test_low_quality_suggests_hooks() {
        let rec = recommend(&labels(8, 2, 0), 0.39, &popular());
        assert_eq!(rec.creator_suggestions, vec![ADD_HOOKS]);
        let rec = recommend(&labels(8, 2, 0), 0.4, &popular());
        assert!(rec.creator_suggestions.is_empty());
    }

    #[test]
    fn test_low_views_and_few_comments() {
        let quiet = VideoMetadata {
            views: "999 views".to_string(),
            comments: 9,
            ..VideoMetadata::default()
        };
        let rec = recommend(&labels(8, 2, 0), 0.9, &quiet);
        assert_eq!(rec.creator_suggestions, vec![BOOST_VISIBILITY, ENCOURAGE_COMMENTS]);

        let enough = VideoMetadata {
            views: "1K views".to_string(),
            comments: 10,
            ..VideoMetadata::default()
        };
        assert!(recommend(&labels(8, 2, 0), 0.9, &enough).creator_suggestions.is_empty());
    }

    #[test]
    fn test_empty_video_gets_every_suggestion() {
        let rec = recommend(&labels(0, 0, 0), 0.0, &VideoMetadata::default());
        assert_eq!(rec.viewer_tip, MAY_SKIP);
        assert_eq!(
            rec.creator_suggestions,
            vec![IMPROVE_CLARITY, ADD_HOOKS, BOOST_VISIBILITY, ENCOURAGE_COMMENTS]
        );
    }
}
