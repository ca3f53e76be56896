use std::time::Duration;

use thiserror::Error;

/// Failures surfaced to the caller of an analysis.
///
/// Upstream outages are never reported here; each stage falls back locally instead.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(
        "could not extract video ID from: {0}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"
    )]
    InvalidInput(String),

    #[error("analysis did not finish within {0:?}")]
    Timeout(Duration),
}

impl AnalyzeError {
    /// True when the caller sent bad input, false for server-side failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalyzeError::InvalidInput(_))
    }
}
