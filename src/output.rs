use eyre::Result;

use crate::report::AnalysisReport;

/// Render the report as pretty-printed JSON
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render a human-readable overview of the report
pub fn render_text(report: &AnalysisReport) -> String {
    let info = &report.video_info;
    let comments = &report.comment_analysis;
    let detail = &report.video_analysis_detail;
    let mut lines: Vec<String> = vec![
        format!("{} ({})", info.title, report.video_id),
        format!("{} | {} | {} | {}", info.channel, info.views, info.upload_date, info.duration),
    ];

    if !report.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.push(report.summary.clone());
    }

    if !report.topics.is_empty() {
        lines.push(String::new());
        lines.push("Topics:".to_string());
        lines.extend(
            report
                .topics
                .iter()
                .map(|t| format!("  {:<30} {:>5.1}%  ({} mentions)", t.topic, t.relevance, t.mentions)),
        );
    }

    lines.push(String::new());
    lines.push(format!("Comment sentiment ({} comments):", comments.total_comments));
    lines.extend(
        report
            .sentiment_distribution
            .iter()
            .map(|d| format!("  {:<9} {:>5.1}%", d.name, d.value)),
    );
    lines.push(format!(
        "  Average score {:.2}, engagement {:.2}%",
        comments.avg_sentiment, comments.engagement_rate
    ));
    let emotions: Vec<String> = comments
        .emotion_distribution
        .iter()
        .map(|(emotion, count)| format!("{emotion} {count}"))
        .collect();
    lines.push(format!("  Emotions: {}", emotions.join(", ")));
    if !comments.top_keywords.is_empty() {
        lines.push(format!("  Keywords: {}", comments.top_keywords.join(", ")));
    }

    if !report.top_comments.is_empty() {
        lines.push(String::new());
        lines.push("Top comments:".to_string());
        lines.extend(
            report
                .top_comments
                .iter()
                .map(|c| format!("  [{}] {} ({} likes): {}", c.sentiment, c.author, c.likes, c.text)),
        );
    }

    lines.push(String::new());
    lines.push("Transcript:".to_string());
    if !detail.transcript_keywords.is_empty() {
        lines.push(format!("  Keywords: {}", detail.transcript_keywords.join(", ")));
    }
    lines.push(format!("  Emotion: {}", detail.transcript_emotion));
    lines.push(format!("  Quality: {:.2}", detail.content_quality_score));

    let rec = &report.recommendation;
    if !rec.viewer_tip.is_empty() {
        lines.push(String::new());
        lines.push(format!("Recommendation: {}", rec.viewer_tip));
        lines.extend(rec.creator_suggestions.iter().map(|s| format!("  - {s}")));
    }

    let source = if report.cached { " (cached)" } else { "" };
    lines.push(String::new());
    lines.push(format!("Processed in {:.2}s{source}", report.processing_time));
    lines.join("\n")
}
