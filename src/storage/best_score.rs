//! Local best-score persistence
//!
//! The best score lives in a small JSON file under the platform data
//! directory. The engine never touches it; the play mode reads it at startup
//! and writes it after a game ends with a better score.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "best_score.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct BestScoreRecord {
    best_score: u32,
    /// Seconds played in the game that set the record
    time_played: u64,
}

/// Key-value store holding the single best score
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "cosmic-tracer")
            .context("Could not determine data directory")?;
        Ok(Self::new(dirs.data_dir().join(FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored best score; a missing file means no score yet
    pub fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read best score from {:?}", self.path))?;
        let record: BestScoreRecord =
            serde_json::from_str(&json).context("Failed to parse best score file")?;
        Ok(record.best_score)
    }

    /// Save `score` if it beats the stored one. Returns true if written.
    pub fn record(&self, score: u32, time_played: u64) -> Result<bool> {
        if score <= self.load().unwrap_or(0) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let record = BestScoreRecord {
            best_score: score,
            time_played,
        };
        let json =
            serde_json::to_string_pretty(&record).context("Failed to serialize best score")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write best score to {:?}", self.path))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let store = BestScoreStore::new(dir.path().join(FILE_NAME));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_record_only_improvements() {
        let dir = TempDir::new().unwrap();
        let store = BestScoreStore::new(dir.path().join("nested").join(FILE_NAME));

        assert!(store.record(120, 45).unwrap());
        assert_eq!(store.load().unwrap(), 120);

        assert!(!store.record(90, 30).unwrap());
        assert!(!store.record(120, 30).unwrap());
        assert_eq!(store.load().unwrap(), 120);

        assert!(store.record(200, 60).unwrap());
        assert_eq!(store.load().unwrap(), 200);
    }

    #[test]
    fn test_zero_score_is_not_recorded() {
        let dir = TempDir::new().unwrap();
        let store = BestScoreStore::new(dir.path().join(FILE_NAME));
        assert!(!store.record(0, 5).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_errors_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let store = BestScoreStore::new(&path);
        assert!(store.load().is_err());
        // A corrupt record is overwritten by the next real score
        assert!(store.record(10, 1).unwrap());
        assert_eq!(store.load().unwrap(), 10);
    }
}
