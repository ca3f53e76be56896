use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eyre::{Result, bail};
use log::debug;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::platform::{CommentOrder, VideoPlatform};
use crate::{RawComment, VideoMetadata};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Data API page size limit for commentThreads.list
const MAX_PAGE_SIZE: usize = 100;

const MAX_ATTEMPTS: u32 = 3;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap());

// --- Data API v3 ---

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
    #[serde(default)]
    description: String,
    published_at: String,
}

/// Counts arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    author_display_name: String,
    text_display: String,
    #[serde(default)]
    like_count: u64,
    published_at: String,
}

impl From<CommentThread> for RawComment {
    fn from(thread: CommentThread) -> Self {
        let c = thread.snippet.top_level_comment.snippet;
        RawComment {
            author: c.author_display_name,
            text: c.text_display,
            likes: c.like_count,
            published_at: c.published_at,
        }
    }
}

// --- InnerTube captions ---

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklist {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// YouTube as a [`VideoPlatform`]: Data API v3 for metadata and comments, captions for transcripts
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: Option<String>,
    lang: String,
}

impl YouTubeClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>, lang: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            lang: lang.into(),
        }
    }

    /// Reads the Data API key from `YOUTUBE_API_KEY`
    pub fn from_env(client: reqwest::Client, lang: impl Into<String>) -> Self {
        Self::new(client, std::env::var("YOUTUBE_API_KEY").ok(), lang)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| eyre::eyre!("YOUTUBE_API_KEY environment variable not set (required for metadata and comments)"))
    }

    async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn fetch_caption_segments(&self, video_id: &str) -> Result<Vec<String>> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let innertube_key = extract_innertube_key(&page_html)?;

        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={innertube_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": self.lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let player: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = player
            .captions
            .and_then(|c| c.tracklist)
            .and_then(|t| t.caption_tracks)
            .unwrap_or_default();

        let Some(track) = tracks
            .iter()
            .find(|t| t.language_code == self.lang)
            .or_else(|| tracks.first())
        else {
            debug!("No captions available for video {video_id}");
            return Ok(Vec::new());
        };
        debug!("Using caption track: lang={}", track.language_code);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

impl VideoPlatform for YouTubeClient {
    async fn get_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let key = self.api_key()?;
        let url = format!("{DATA_API_URL}/videos");
        let query = [("part", "snippet,statistics,contentDetails"), ("id", video_id), ("key", key)];

        let resp: VideoListResponse = retry(MAX_ATTEMPTS, || self.get_json(&url, &query)).await?;
        let Some(item) = resp.items.into_iter().next() else {
            bail!("video {video_id} not found");
        };
        Ok(metadata_from_item(item, Utc::now()))
    }

    async fn get_comments(&self, video_id: &str, max_results: usize, order: CommentOrder) -> Result<Vec<RawComment>> {
        let key = self.api_key()?;
        let url = format!("{DATA_API_URL}/commentThreads");
        let mut comments: Vec<RawComment> = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_results {
            let page_size = (max_results - comments.len()).min(MAX_PAGE_SIZE);
            let mut query = vec![
                ("part", "snippet".to_string()),
                ("videoId", video_id.to_string()),
                ("maxResults", page_size.to_string()),
                ("order", order.as_str().to_string()),
                ("textFormat", "plainText".to_string()),
                ("key", key.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: CommentThreadListResponse = retry(MAX_ATTEMPTS, || self.get_json(&url, &query)).await?;
            debug!("Fetched {} comment threads for {video_id}", page.items.len());
            if page.items.is_empty() {
                break;
            }
            comments.extend(page.items.into_iter().map(RawComment::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        comments.truncate(max_results);
        Ok(comments)
    }

    async fn get_transcript(&self, video_id: &str) -> Result<String> {
        let segments = retry(MAX_ATTEMPTS, || self.fetch_caption_segments(video_id)).await?;
        Ok(segments.join(" "))
    }
}

/// Retry with exponential backoff, only for errors worth retrying
async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt + 1 < max_attempts && is_transient(&e) => {
                let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Timeouts, connection failures and 5xx/429 responses
fn is_transient(err: &eyre::Report) -> bool {
    match err.downcast_ref::<reqwest::Error>() {
        Some(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS)
        }
        None => false,
    }
}

fn metadata_from_item(item: VideoItem, now: DateTime<Utc>) -> VideoMetadata {
    let count = |s: &Option<String>| s.as_deref().and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);

    VideoMetadata {
        title: item.snippet.title,
        channel: item.snippet.channel_title,
        views: format_view_count(count(&item.statistics.view_count)),
        upload_date: format_upload_date(&item.snippet.published_at, now),
        duration: item
            .content_details
            .map(|d| format_duration(&d.duration))
            .unwrap_or_else(|| "00:00".to_string()),
        likes: count(&item.statistics.like_count),
        comments: count(&item.statistics.comment_count),
        description: item.snippet.description,
    }
}

/// "1.2M views", "3.4K views" or "512 views"
pub fn format_view_count(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M views", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K views", views as f64 / 1_000.0)
    } else {
        format!("{views} views")
    }
}

/// ISO-8601 duration ("PT1H2M3S") as "01:02:03", or "02:03" under an hour
pub fn format_duration(iso: &str) -> String {
    let Some(caps) = DURATION_RE.captures(iso) else {
        return "00:00".to_string();
    };
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok()).unwrap_or(0);
    let (hours, minutes, seconds) = (part(1), part(2), part(3));
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// "N days ago", or "Today" for anything under a day old
pub fn format_upload_date(published_at: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(published) => {
            let days = (now - published.with_timezone(&Utc)).num_days();
            if days > 0 {
                format!("{days} days ago")
            } else {
                "Today".to_string()
            }
        }
        Err(_) => "Unknown date".to_string(),
    }
}

fn extract_innertube_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

/// Text of each non-empty `<text>` element in a caption track
fn parse_caption_xml(xml: &str) -> Result<Vec<String>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => in_text = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => in_text = false,
            Ok(Event::Text(ref e)) if in_text => {
                let raw = e.unescape().unwrap_or_default().to_string();
                let text = html_escape::decode_html_entities(&raw).trim().to_string();
                if !text.is_empty() {
                    segments.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}
