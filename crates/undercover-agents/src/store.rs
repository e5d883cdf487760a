//! Result persistence.
//!
//! One JSON file per finished game, named
//! `{majority}_{minority}_{timestamp}.json`, plus a summary document
//! per batch run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use undercover_core::batch::RunSummary;
use undercover_core::GameRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    /// Open (creating if needed) the output directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_record(&self, record: &GameRecord) -> Result<PathBuf, StoreError> {
        let filename = format!(
            "{}_{}_{}.json",
            sanitize(&record.concept_pair.majority),
            sanitize(&record.concept_pair.minority),
            Utc::now().format("%Y%m%d_%H%M%S_%f"),
        );
        let path = self.dir.join(filename);
        fs::write(&path, serde_json::to_vec_pretty(record)?)?;
        info!(path = %path.display(), "game record written");
        Ok(path)
    }

    pub fn save_summary(&self, summary: &RunSummary) -> Result<PathBuf, StoreError> {
        let filename = format!("batch_summary_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(filename);
        fs::write(&path, serde_json::to_vec_pretty(summary)?)?;
        info!(path = %path.display(), "batch summary written");
        Ok(path)
    }
}

/// Concept words come from user-supplied pair lists; keep filenames
/// portable.
fn sanitize(word: &str) -> String {
    word.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}
