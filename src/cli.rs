use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsense",
    about = "YouTube video analyzer: summary, topics, comment sentiment and quality",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// LLM model for summaries, topics, keywords and emotions
    #[arg(long)]
    pub model: Option<String>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Maximum number of comments to fetch
    #[arg(long)]
    pub max_comments: Option<usize>,

    /// End-to-end timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip the LLM entirely and use local fallbacks
    #[arg(long)]
    pub offline: bool,

    /// Keep results in memory only, never touching the report cache on disk
    #[arg(long)]
    pub no_cache: bool,

    /// Re-analyze even when a cached report exists
    #[arg(short, long)]
    pub refresh: bool,

    /// Show configuration and progress details
    #[arg(short, long)]
    pub verbose: bool,
}
