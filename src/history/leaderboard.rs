//! Persistent top-N score table

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::Result;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    pub income: f64,
    pub reputation: i32,
    pub date: DateTime<Utc>,
}

/// Scores kept sorted descending, persisted as a JSON list
#[derive(Debug, Clone)]
pub struct Leaderboard {
    path: PathBuf,
    capacity: usize,
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Open the table at `path`; a missing file is an empty table
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let mut board = Self {
            path,
            capacity: capacity.max(1),
            entries,
        };
        board.normalize();
        Ok(board)
    }

    /// Add a score, keep the best `capacity` entries and persist
    pub fn record(
        &mut self,
        name: &str,
        score: u64,
        income: f64,
        reputation: i32,
    ) -> Result<&[ScoreEntry]> {
        self.entries.push(ScoreEntry {
            name: name.to_string(),
            score,
            income,
            reputation,
            date: Utc::now(),
        });
        self.normalize();
        self.persist()?;

        tracing::info!("Recorded score {} for {}", score, name);
        Ok(&self.entries)
    }

    fn normalize(&mut self) {
        // stable: equal scores keep insertion order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_top_ten_descending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut board = Leaderboard::open(&path, DEFAULT_LEADERBOARD_SIZE).unwrap();

        for score in [50, 900, 10, 300, 700, 20, 800, 60, 400, 1000, 5] {
            board.record("rider", score, score as f64, 70).unwrap();
        }

        let scores: Vec<u64> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1000, 900, 800, 700, 400, 300, 60, 50, 20, 10]);

        let reopened = Leaderboard::open(&path, DEFAULT_LEADERBOARD_SIZE).unwrap();
        assert_eq!(reopened.entries(), board.entries());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let board = Leaderboard::open(dir.path().join("none.json"), 10).unwrap();
        assert!(board.entries().is_empty());
    }
}
