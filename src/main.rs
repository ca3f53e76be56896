use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use log::{debug, info};

use ytsense::cache::{DiskStore, MemoryStore, ReportStore};
use ytsense::config::{AnalysisSettings, Config};
use ytsense::insight::{OfflineInsight, TextInsight};
use ytsense::llm::LlmClient;
use ytsense::pipeline::Analyzer;
use ytsense::youtube::YouTubeClient;

mod cli;

use cli::{Cli, OutputFormat};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_LANG: &str = "en";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsense.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsense")
        .join("logs")
}

fn key_line(name: &str, purpose: &str) -> String {
    if std::env::var(name).is_ok_and(|v| !v.is_empty()) {
        format!("  \x1b[32m✅\x1b[0m {name:<18} {purpose}")
    } else {
        format!("  \x1b[31m❌\x1b[0m {name:<18} {purpose} (not set)")
    }
}

fn build_after_help() -> String {
    let keys = [
        key_line("YOUTUBE_API_KEY", "metadata and comments"),
        key_line("GEMINI_API_KEY", "gemini-* models"),
        key_line("ANTHROPIC_API_KEY", "claude-* models"),
        key_line("OPENAI_API_KEY", "other models"),
    ]
    .join("\n");

    format!(
        "\nAPI KEYS:\n{keys}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytsense::config::config_path().display(),
        log_dir().join("ytsense.log").display()
    )
}

/// Analyze every input and write the rendered reports
async fn run<G: TextInsight>(cli: &Cli, analyzer: &Analyzer<YouTubeClient, G>, inputs: &[String]) -> Result<()> {
    for input in inputs {
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let result = if cli.refresh {
            analyzer.analyze_fresh(input).await
        } else {
            analyzer.analyze(input).await
        };

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(if e.is_client_error() { 2 } else { 1 });
            }
        };

        if cli.verbose {
            eprintln!(
                "Video: {} ({})\nComments: {}\nCached: {}\nProcessing time: {:.2}s",
                report.video_info.title,
                report.video_id,
                report.comment_analysis.total_comments,
                report.cached,
                report.processing_time,
            );
        }

        let rendered = match cli.format {
            OutputFormat::Text => ytsense::output::render_text(&report),
            OutputFormat::Json => ytsense::output::render_json(&report)?,
        };

        if let Some(ref path) = cli.output {
            std::fs::write(path, &rendered)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        } else {
            println!("{rendered}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    // CLI flags take priority over config
    let model = cli.model.clone().or(config.model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let lang = cli.lang.clone().or(config.lang).unwrap_or_else(|| DEFAULT_LANG.to_string());
    let settings = AnalysisSettings {
        max_comments: cli.max_comments.unwrap_or(config.analysis.max_comments),
        timeout_secs: cli.timeout.unwrap_or(config.analysis.timeout_secs),
        ..config.analysis
    };

    if cli.verbose {
        let config_path = ytsense::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        if cli.offline {
            eprintln!("Model: none (offline)");
        } else {
            eprintln!("Model: {model}");
        }
    }
    debug!("Analysis settings: {settings:?}");

    // Collect URLs: from arg or stdin
    let inputs = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if inputs.iter().all(|i| i.trim().is_empty()) {
        bail!("no URL or video ID provided\n\nUsage: ytsense <URL>\n       echo <URL> | ytsense");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;
    let platform = YouTubeClient::from_env(client.clone(), lang);
    let store: Box<dyn ReportStore> = if cli.no_cache {
        Box::new(MemoryStore::new())
    } else {
        Box::new(DiskStore::default_location())
    };

    if cli.offline {
        let analyzer = Analyzer::new(platform, OfflineInsight, store, settings);
        run(&cli, &analyzer, &inputs).await
    } else {
        let analyzer = Analyzer::new(platform, LlmClient::new(client, model), store, settings);
        run(&cli, &analyzer, &inputs).await
    }
}
