use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use eyre::{Result, eyre};
use log::debug;

use crate::report::AnalysisReport;

/// Finished reports keyed by video ID. At most one entry per ID; the last write wins.
pub trait ReportStore: Send + Sync {
    fn get(&self, video_id: &str) -> Option<AnalysisReport>;

    fn put(&self, video_id: &str, report: &AnalysisReport) -> Result<()>;
}

/// Process-scoped store, unbounded
#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: RwLock<HashMap<String, AnalysisReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportStore for MemoryStore {
    fn get(&self, video_id: &str) -> Option<AnalysisReport> {
        self.reports.read().ok()?.get(video_id).cloned()
    }

    fn put(&self, video_id: &str, report: &AnalysisReport) -> Result<()> {
        self.reports
            .write()
            .map_err(|_| eyre!("report store lock poisoned"))?
            .insert(video_id.to_string(), report.clone());
        Ok(())
    }
}

/// One JSON file per video under a cache directory
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<cache dir>/ytsense/reports`
    pub fn default_location() -> Self {
        Self::new(
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("ytsense")
                .join("reports"),
        )
    }

    fn path(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{video_id}.json"))
    }
}

impl ReportStore for DiskStore {
    fn get(&self, video_id: &str) -> Option<AnalysisReport> {
        let path = self.path(video_id);
        let data = std::fs::read_to_string(&path).ok()?;
        let report: AnalysisReport = serde_json::from_str(&data).ok()?;
        debug!("Cache hit: {}", path.display());
        Some(report)
    }

    fn put(&self, video_id: &str, report: &AnalysisReport) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(video_id);
        let data = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, data)?;
        debug!("Cached report: {}", path.display());
        Ok(())
    }
}
