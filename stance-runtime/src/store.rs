//! JSON persistence for raw posts and analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use stance_bluesky::CollectedPost;
use stance_core::UserAnalysis;

/// Errors from the file stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

/// Raw collected posts, one file per handle
#[derive(Debug, Clone)]
pub struct RawPostStore {
    dir: PathBuf,
}

impl RawPostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<handle with '.' replaced by '_'>_posts.json` under the store directory
    pub fn path_for(&self, handle: &str) -> PathBuf {
        self.dir.join(format!("{}_posts.json", handle.replace('.', "_")))
    }

    pub fn save(&self, handle: &str, posts: &[CollectedPost]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(handle);
        write_json(&path, &posts)?;
        info!("Saved {} posts to {}", posts.len(), path.display());
        Ok(path)
    }

    pub fn load(&self, handle: &str) -> Result<Vec<CollectedPost>, StoreError> {
        load_posts(&self.path_for(handle))
    }
}

/// Read a raw posts file
pub fn load_posts(path: &Path) -> Result<Vec<CollectedPost>, StoreError> {
    let posts: Vec<CollectedPost> = read_json(path)?;
    debug!("Loaded {} posts from {}", posts.len(), path.display());
    Ok(posts)
}

/// A user's latest analysis as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub analyzed_at: DateTime<Utc>,
    pub post_count: usize,
    pub analysis: UserAnalysis,
}

/// Analysis results in a single JSON file keyed by username
#[derive(Debug, Clone)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored results; a missing file reads as empty
    pub fn load(&self) -> Result<BTreeMap<String, StoredAnalysis>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        read_json(&self.path)
    }

    pub fn get(&self, username: &str) -> Result<Option<StoredAnalysis>, StoreError> {
        Ok(self.load()?.remove(username))
    }

    /// Replace the entry for `username` and rewrite the file
    pub fn upsert(
        &self,
        username: &str,
        analysis: &UserAnalysis,
    ) -> Result<StoredAnalysis, StoreError> {
        let mut results = self.load()?;
        let entry = StoredAnalysis {
            analyzed_at: Utc::now(),
            post_count: analysis.post_count(),
            analysis: analysis.clone(),
        };
        results.insert(username.to_string(), entry.clone());
        write_json(&self.path, &results)?;

        debug!("Stored analysis for {} in {}", username, self.path.display());
        Ok(entry)
    }
}
