//! Where posts come from

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use stance_bluesky::{BlueskyClient, BlueskyError, CollectedPost, UserProfile};

use crate::store::{load_posts, StoreError};

/// Errors from a post source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Bluesky error: {0}")]
    Bluesky(#[from] BlueskyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Provides profiles and posts for a handle
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Source name for diagnostics
    fn name(&self) -> &str;

    /// Profile for `handle`, `None` if the account does not exist
    async fn profile(&self, handle: &str) -> Result<Option<UserProfile>, SourceError>;

    /// Up to `max_posts` posts by `handle`, newest first
    async fn fetch_posts(
        &self,
        handle: &str,
        max_posts: usize,
    ) -> Result<Vec<CollectedPost>, SourceError>;
}

#[async_trait]
impl PostSource for BlueskyClient {
    fn name(&self) -> &str {
        "bluesky"
    }

    async fn profile(&self, handle: &str) -> Result<Option<UserProfile>, SourceError> {
        match self.get_profile(handle).await {
            Ok(profile) => Ok(Some(profile)),
            Err(BlueskyError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_posts(
        &self,
        handle: &str,
        max_posts: usize,
    ) -> Result<Vec<CollectedPost>, SourceError> {
        Ok(self.get_user_posts(handle, max_posts).await?)
    }
}

/// Posts from a saved raw posts file, for offline re-analysis.
///
/// Every handle resolves to a bare profile; the file holds no profile data.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PostSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn profile(&self, handle: &str) -> Result<Option<UserProfile>, SourceError> {
        Ok(Some(UserProfile {
            handle: handle.to_string(),
            display_name: String::new(),
            description: String::new(),
            followers_count: 0,
            follows_count: 0,
            posts_count: 0,
        }))
    }

    async fn fetch_posts(
        &self,
        _handle: &str,
        max_posts: usize,
    ) -> Result<Vec<CollectedPost>, SourceError> {
        let path = self.path.clone();
        let mut posts = tokio::task::spawn_blocking(move || load_posts(&path))
            .await
            .map_err(|e| {
                StoreError::Io {
                    path: self.path.clone(),
                    source: std::io::Error::other(e),
                }
            })??;
        posts.truncate(max_posts);
        debug!("Using {} posts from {}", posts.len(), self.path.display());
        Ok(posts)
    }
}
