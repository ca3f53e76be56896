//! The analysis pipeline for one video.
//!
//! `FETCHING -> CLASSIFYING -> SCORING -> ASSEMBLED`, or `FAILED` on bad input or timeout.
//! Every upstream failure inside a stage is replaced by its local fallback, so once the video
//! ID is valid the only way to fail is running out of time.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::aggregate;
use crate::cache::ReportStore;
use crate::config::AnalysisSettings;
use crate::emotion;
use crate::error::AnalyzeError;
use crate::insight::{self, TextInsight};
use crate::platform::VideoPlatform;
use crate::quality::{QualitySignals, quality_score};
use crate::recommendation;
use crate::report::{AnalysisReport, CommentAnalysisDetail, VideoAnalysisDetail};
use crate::sentiment::SentimentClassifier;
use crate::text;
use crate::{Comment, VideoMetadata, parse_video_id, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Classifying,
    Scoring,
    Assembled,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "FETCHING",
            Stage::Classifying => "CLASSIFYING",
            Stage::Scoring => "SCORING",
            Stage::Assembled => "ASSEMBLED",
            Stage::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

pub struct Analyzer<P, G> {
    platform: P,
    gateway: G,
    store: Box<dyn ReportStore>,
    classifier: SentimentClassifier,
    settings: AnalysisSettings,
    timeout: Duration,
}

impl<P: VideoPlatform, G: TextInsight> Analyzer<P, G> {
    pub fn new(platform: P, gateway: G, store: Box<dyn ReportStore>, settings: AnalysisSettings) -> Self {
        Self {
            classifier: SentimentClassifier::new(settings.sentiment_positive, settings.sentiment_negative),
            timeout: Duration::from_secs(settings.timeout_secs),
            platform,
            gateway,
            store,
            settings,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_classifier(mut self, classifier: SentimentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn store(&self) -> &dyn ReportStore {
        self.store.as_ref()
    }

    /// Analyze a video URL or ID, answering from the store when it already has a report
    pub async fn analyze(&self, input: &str) -> Result<AnalysisReport, AnalyzeError> {
        let video_id = self.video_id(input)?;
        if let Some(mut report) = self.store.get(&video_id) {
            info!("[{video_id}] served from cache");
            report.cached = true;
            return Ok(report);
        }
        self.run_bounded(&video_id).await
    }

    /// Analyze a video URL or ID without reading the store. The result still replaces any stored report.
    pub async fn analyze_fresh(&self, input: &str) -> Result<AnalysisReport, AnalyzeError> {
        let video_id = self.video_id(input)?;
        self.run_bounded(&video_id).await
    }

    fn video_id(&self, input: &str) -> Result<String, AnalyzeError> {
        parse_video_id(input).inspect_err(|e| {
            warn!("{}: {}", Stage::Failed, e.to_string().lines().next().unwrap_or_default());
        })
    }

    async fn run_bounded(&self, video_id: &str) -> Result<AnalysisReport, AnalyzeError> {
        let report = match tokio::time::timeout(self.timeout, self.run(video_id)).await {
            Ok(report) => report,
            Err(_) => {
                warn!("[{video_id}] {} after {:?}", Stage::Failed, self.timeout);
                return Err(AnalyzeError::Timeout(self.timeout));
            }
        };

        if let Err(e) = self.store.put(video_id, &report) {
            warn!("[{video_id}] could not store report: {e}");
        }
        Ok(report)
    }

    async fn run(&self, video_id: &str) -> AnalysisReport {
        let started = Instant::now();
        let settings = &self.settings;

        info!("[{video_id}] {}", Stage::Fetching);
        let (metadata, raw_comments, transcript) = tokio::join!(
            self.platform.get_metadata(video_id),
            self.platform
                .get_comments(video_id, settings.max_comments, settings.comment_order),
            self.platform.get_transcript(video_id),
        );
        let metadata = metadata.unwrap_or_else(|e| {
            warn!("[{video_id}] metadata unavailable, using placeholder: {e}");
            VideoMetadata::default()
        });
        let raw_comments = raw_comments.unwrap_or_else(|e| {
            warn!("[{video_id}] comments unavailable: {e}");
            Vec::new()
        });
        let transcript = transcript.unwrap_or_else(|e| {
            warn!("[{video_id}] transcript unavailable: {e}");
            String::new()
        });
        debug!(
            "[{video_id}] fetched {} comments, {} transcript chars",
            raw_comments.len(),
            transcript.chars().count()
        );

        info!("[{video_id}] {}", Stage::Classifying);
        let comments: Vec<Comment> = raw_comments
            .into_iter()
            .map(|raw| Comment::classify(raw, &self.classifier))
            .collect();

        info!("[{video_id}] {}", Stage::Scoring);
        let engagement = aggregate::engagement_rate(comments.len(), &metadata.views);
        let topic_content = topic_content(&metadata.description, &transcript, settings.max_prompt_chars);
        let comment_text = comments
            .iter()
            .map(|c| text::normalize(&c.text))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let comment_insights = async {
            tokio::join!(
                emotion::sample_emotions(
                    &self.gateway,
                    &comments,
                    settings.emotion_sample,
                    settings.emotion_prefix_chars,
                    settings.concurrency,
                ),
                insight::keywords_or_local(
                    &self.gateway,
                    &comment_text,
                    settings.comment_keywords,
                    settings.keyword_prefix_chars,
                ),
            )
        };

        let (summary, topics, (emotions, top_keywords), transcript_keywords, transcript_emotion) = tokio::join!(
            insight::summary_or_local(
                &self.gateway,
                &transcript,
                settings.max_prompt_chars,
                settings.summary_sentences,
            ),
            insight::topics_or_empty(&self.gateway, &topic_content),
            comment_insights,
            insight::keywords_or_local(
                &self.gateway,
                &transcript,
                settings.transcript_keywords,
                settings.keyword_prefix_chars,
            ),
            emotion::classify_emotion(&self.gateway, &transcript, settings.emotion_prefix_chars),
        );

        let content_quality_score = quality_score(
            &QualitySignals {
                transcript_len: transcript.chars().count(),
                summary_words: summary.split_whitespace().count(),
                keyword_count: transcript_keywords.len(),
                engagement_rate: engagement,
                comment_count: comments.len(),
            },
            &settings.weights,
        );

        let labels = aggregate::label_histogram(&comments);
        let recommendation = recommendation::recommend(&labels, content_quality_score, &metadata);

        let report = AnalysisReport {
            video_id: video_id.to_string(),
            summary,
            topics,
            sentiment_distribution: aggregate::sentiment_distribution(&comments),
            comment_analysis: CommentAnalysisDetail {
                total_comments: comments.len(),
                avg_sentiment: round_to(aggregate::mean_sentiment(&comments), 2),
                engagement_rate: round_to(engagement, 2),
                top_keywords,
                sentiment_distribution_detailed: labels,
                emotion_distribution: aggregate::emotion_histogram(&emotions),
                quality_score: content_quality_score,
            },
            sentiment_over_time: aggregate::sentiment_over_time(&comments),
            top_comments: aggregate::top_comments(&comments, settings.top_comments),
            video_analysis_detail: VideoAnalysisDetail {
                transcript_keywords,
                transcript_emotion,
                content_quality_score,
            },
            recommendation,
            video_info: metadata,
            processing_time: round_to(started.elapsed().as_secs_f64(), 2),
            cached: false,
        };

        info!("[{video_id}] {} in {:.2}s", Stage::Assembled, report.processing_time);
        report
    }
}

/// Text sent for topic extraction; empty when there is neither description nor transcript
fn topic_content(description: &str, transcript: &str, max_chars: usize) -> String {
    if description.trim().is_empty() && transcript.trim().is_empty() {
        return String::new();
    }
    format!(
        "Description: {description}\n\nTranscript: {}",
        text::truncate_chars(transcript, max_chars)
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use eyre::{Result, bail, eyre};

    use super::*;
    use crate::RawComment;
    use crate::cache::MemoryStore;
    use crate::emotion::Emotion;
    use crate::platform::CommentOrder;
    use crate::sentiment::{PolarityEstimator, SentimentLabel};

    const VIDEO_ID: &str = "dQw4w9WgXcQ";
    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    const TRANSCRIPT: &str = "Rust ownership makes memory safety practical. \
        The borrow checker enforces ownership rules at compile time. \
        Lifetimes describe how long references stay valid. \
        Async code in Rust builds on futures and executors. \
        Tokio is the most common executor for network services.";

    #[derive(Default)]
    struct FakePlatform {
        metadata: Option<VideoMetadata>,
        comments: Vec<RawComment>,
        transcript: String,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakePlatform {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl VideoPlatform for FakePlatform {
        async fn get_metadata(&self, _video_id: &str) -> Result<VideoMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.metadata.clone().ok_or_else(|| eyre!("video not found"))
        }

        async fn get_comments(&self, _video_id: &str, max_results: usize, _order: CommentOrder) -> Result<Vec<RawComment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.comments.iter().take(max_results).cloned().collect())
        }

        async fn get_transcript(&self, _video_id: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.transcript.clone())
        }
    }

    /// Gateway that is always down and counts how often it was asked
    #[derive(Default)]
    struct Down {
        calls: AtomicUsize,
    }

    impl TextInsight for Down {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("503 Service Unavailable")
        }
    }

    /// Gateway answering each prompt kind with a fixed response
    #[derive(Default)]
    struct Scripted {
        prompts: Mutex<Vec<String>>,
    }

    impl TextInsight for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let response = if prompt.contains("summarizer") {
                "A tour of ownership, borrowing and async Rust."
            } else if prompt.contains("main topics") {
                r#"Here you go: [{"topic": "Ownership", "relevance": 92, "mentions": 4}, {"topic": "Async", "relevance": 140, "mentions": 2.6}]"#
            } else if prompt.contains("keywords") {
                "1. rust\n2. ownership\n3. tokio"
            } else {
                "Happy"
            };
            Ok(response.to_string())
        }
    }

    /// 0.5 for comments saying "great", 0.0 otherwise
    struct GreatDetector;

    impl PolarityEstimator for GreatDetector {
        fn name(&self) -> &str {
            "great"
        }

        fn polarity(&self, text: &str) -> Result<f64> {
            Ok(if text.contains("great") { 0.5 } else { 0.0 })
        }
    }

    fn raw(author: &str, text: &str, likes: u64) -> RawComment {
        RawComment {
            author: author.to_string(),
            text: text.to_string(),
            likes,
            published_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn metadata(views: &str) -> VideoMetadata {
        VideoMetadata {
            title: "Rust in 100 Seconds".to_string(),
            channel: "Fireship".to_string(),
            views: views.to_string(),
            description: "A fast tour of the Rust language.".to_string(),
            ..VideoMetadata::default()
        }
    }

    fn analyzer<G: TextInsight>(platform: FakePlatform, gateway: G) -> Analyzer<FakePlatform, G> {
        Analyzer::new(platform, gateway, Box::new(MemoryStore::new()), AnalysisSettings::default())
    }

    #[tokio::test]
    async fn test_empty_video_uses_documented_defaults() {
        let platform = FakePlatform {
            metadata: Some(VideoMetadata {
                description: String::new(),
                ..metadata("0 views")
            }),
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default());

        let report = analyzer.analyze(URL).await.unwrap();

        assert_eq!(report.video_id, VIDEO_ID);
        assert_eq!(report.summary, "");
        assert!(report.topics.is_empty());
        assert_eq!(report.video_analysis_detail.transcript_emotion, Emotion::Neutral);
        assert!(report.video_analysis_detail.transcript_keywords.is_empty());
        assert_eq!(report.video_analysis_detail.content_quality_score, 0.0);
        assert_eq!(report.comment_analysis.quality_score, 0.0);
        assert_eq!(report.comment_analysis.total_comments, 0);
        assert_eq!(report.comment_analysis.avg_sentiment, 0.0);
        assert_eq!(report.comment_analysis.engagement_rate, 0.0);
        assert!(report.comment_analysis.top_keywords.is_empty());
        assert_eq!(
            report.comment_analysis.emotion_distribution,
            std::collections::BTreeMap::from([(Emotion::Neutral, 1)])
        );
        let values: Vec<f64> = report.sentiment_distribution.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![60.0, 30.0, 10.0]);
        assert_eq!(report.sentiment_over_time.len(), 8);
        assert!(report.top_comments.is_empty());
        assert!(!report.cached);
        assert_eq!(report.recommendation.viewer_tip, recommendation::MAY_SKIP);
        assert_eq!(report.recommendation.creator_suggestions.len(), 4);

        assert_eq!(analyzer.gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_comment_aggregates() {
        let mut comments: Vec<RawComment> = (0..6).map(|i| raw(&format!("fan{i}"), "This is GREAT!", i)).collect();
        comments.extend((0..4).map(|i| raw(&format!("viewer{i}"), "Watched it.", 10 + i)));
        let platform = FakePlatform {
            metadata: Some(metadata("500 views")),
            comments,
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default())
            .with_classifier(SentimentClassifier::with_estimators(vec![Box::new(GreatDetector)], 0.1, -0.1));

        let report = analyzer.analyze(VIDEO_ID).await.unwrap();
        let analysis = &report.comment_analysis;

        let values: Vec<(&str, f64)> = report
            .sentiment_distribution
            .iter()
            .map(|d| (d.name.as_str(), d.value))
            .collect();
        assert_eq!(values, vec![("Positive", 60.0), ("Neutral", 40.0), ("Negative", 0.0)]);
        assert_eq!(analysis.avg_sentiment, 0.5);
        assert_eq!(analysis.total_comments, 10);
        assert_eq!(analysis.engagement_rate, 2.0);
        assert_eq!(analysis.sentiment_distribution_detailed[&SentimentLabel::Positive], 6);
        assert_eq!(analysis.sentiment_distribution_detailed[&SentimentLabel::Negative], 0);
        assert_eq!(analysis.emotion_distribution[&Emotion::Neutral], 10);

        let top: Vec<&str> = report.top_comments.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(top, vec!["viewer3", "viewer2", "viewer1", "viewer0", "fan5"]);
        assert_eq!(report.top_comments[4].text, "This is GREAT!");
        assert_eq!(report.recommendation.viewer_tip, recommendation::CONSIDER_WATCHING);
        assert!(
            report
                .recommendation
                .creator_suggestions
                .contains(&recommendation::BOOST_VISIBILITY.to_string())
        );
        assert!(analysis.top_keywords.contains(&"great".to_string()));
    }

    #[tokio::test]
    async fn test_gateway_outage_falls_back_locally() {
        let platform = FakePlatform {
            metadata: Some(metadata("1.2K views")),
            transcript: TRANSCRIPT.to_string(),
            comments: vec![raw("a", "Ownership finally clicked for me", 3)],
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default());

        let report = analyzer.analyze(URL).await.unwrap();

        assert!(report.topics.is_empty());
        assert!(!report.video_analysis_detail.transcript_keywords.is_empty());
        assert!(
            report
                .video_analysis_detail
                .transcript_keywords
                .contains(&"ownership".to_string())
        );
        assert!(!report.comment_analysis.top_keywords.is_empty());
        assert!(!report.summary.is_empty());
        assert!(TRANSCRIPT.contains(report.summary.split(". ").next().unwrap()));
        assert_eq!(report.video_analysis_detail.transcript_emotion, Emotion::Neutral);
        assert!(analyzer.gateway.calls.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_remote_insights_are_used() {
        let platform = FakePlatform {
            metadata: Some(metadata("1.2K views")),
            transcript: TRANSCRIPT.to_string(),
            comments: vec![raw("a", "love it", 1), raw("b", "so good", 2)],
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Scripted::default());

        let report = analyzer.analyze(URL).await.unwrap();

        assert_eq!(report.summary, "A tour of ownership, borrowing and async Rust.");
        assert_eq!(report.topics.len(), 2);
        assert_eq!(report.topics[1].relevance, 100.0);
        assert_eq!(report.topics[1].mentions, 3);
        assert_eq!(report.video_analysis_detail.transcript_keywords, vec!["rust", "ownership", "tokio"]);
        assert_eq!(report.comment_analysis.top_keywords, vec!["rust", "ownership", "tokio"]);
        assert_eq!(report.video_analysis_detail.transcript_emotion, Emotion::Joy);
        assert_eq!(report.comment_analysis.emotion_distribution[&Emotion::Joy], 2);

        let prompts = analyzer.gateway.prompts.lock().unwrap();
        let topic_prompt = prompts.iter().find(|p| p.contains("main topics")).unwrap();
        assert!(topic_prompt.contains("Description: A fast tour of the Rust language."));
    }

    #[tokio::test]
    async fn test_missing_metadata_uses_placeholder() {
        let platform = FakePlatform {
            comments: vec![raw("a", "nice", 1)],
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default());

        let report = analyzer.analyze(VIDEO_ID).await.unwrap();
        assert_eq!(report.video_info, VideoMetadata::default());
        assert_eq!(report.comment_analysis.engagement_rate, 100.0);
    }

    #[tokio::test]
    async fn test_repeat_analysis_is_served_from_store() {
        let platform = FakePlatform {
            metadata: Some(metadata("1.2K views")),
            transcript: TRANSCRIPT.to_string(),
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default());

        let first = analyzer.analyze(URL).await.unwrap();
        assert!(!first.cached);
        assert_eq!(analyzer.platform.calls(), 3);

        let second = analyzer.analyze(&format!("https://youtu.be/{VIDEO_ID}")).await.unwrap();
        assert!(second.cached);
        assert_eq!(analyzer.platform.calls(), 3);
        assert_eq!(second.summary, first.summary);

        let fresh = analyzer.analyze_fresh(URL).await.unwrap();
        assert!(!fresh.cached);
        assert_eq!(analyzer.platform.calls(), 6);
        assert!(analyzer.store().get(VIDEO_ID).is_some());
    }

    #[tokio::test]
    async fn test_rerun_is_identical_except_timing() {
        let platform = FakePlatform {
            metadata: Some(metadata("3.4M views")),
            transcript: TRANSCRIPT.to_string(),
            comments: (0..25)
                .map(|i| raw(&format!("u{i}"), if i % 3 == 0 { "terrible audio" } else { "great video" }, i % 4))
                .collect(),
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Scripted::default());

        let mut first = analyzer.analyze_fresh(URL).await.unwrap();
        let second = analyzer.analyze_fresh(URL).await.unwrap();
        first.processing_time = second.processing_time;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_fetching() {
        let analyzer = analyzer(FakePlatform::default(), Down::default());

        let err = analyzer.analyze("https://vimeo.com/12345").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidInput(_)));
        assert!(err.is_client_error());
        assert_eq!(analyzer.platform.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_returns_no_partial_report() {
        let platform = FakePlatform {
            metadata: Some(metadata("10 views")),
            delay: Some(Duration::from_millis(500)),
            ..FakePlatform::default()
        };
        let analyzer = analyzer(platform, Down::default()).with_timeout(Duration::from_millis(50));

        let err = analyzer.analyze(URL).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Timeout(_)));
        assert!(!err.is_client_error());
        assert!(analyzer.store().get(VIDEO_ID).is_none());
    }

    #[test]
    fn test_topic_content() {
        assert_eq!(topic_content("", "  ", 10), "");
        assert_eq!(topic_content("About Rust", "", 10), "Description: About Rust\n\nTranscript: ");
        assert_eq!(
            topic_content("", "abcdefghijklmnop", 4),
            "Description: \n\nTranscript: abcd"
        );
    }
}
