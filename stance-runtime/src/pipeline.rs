//! Analysis pipeline
//!
//! Runs one handle through lookup, collection, analysis and persistence.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use stance_bluesky::{CollectedPost, UserProfile};
use stance_core::{PostFeatures, StanceAnalyzer, UserAnalysis};

use crate::source::{PostSource, SourceError};
use crate::store::{RawPostStore, ResultsStore, StoreError};

/// Errors from a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("User @{0} not found")]
    UserNotFound(String),

    #[error("No posts found for @{0}")]
    NoPosts(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of analyzing one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub handle: String,
    pub profile: UserProfile,
    pub post_count: usize,
    pub analysis: UserAnalysis,
}

/// Shared reference to a post source
pub type SharedSource = Arc<dyn PostSource>;

/// Fetches, analyzes and optionally persists a user's posts
pub struct Pipeline {
    source: SharedSource,
    analyzer: StanceAnalyzer,
    max_posts: usize,
    raw_store: Option<RawPostStore>,
    results: Option<ResultsStore>,
}

impl Pipeline {
    pub fn new(source: SharedSource, analyzer: StanceAnalyzer, max_posts: usize) -> Self {
        Self {
            source,
            analyzer,
            max_posts,
            raw_store: None,
            results: None,
        }
    }

    /// Save collected posts under this store
    pub fn with_raw_store(mut self, store: RawPostStore) -> Self {
        self.raw_store = Some(store);
        self
    }

    /// Record each analysis in this store
    pub fn with_results_store(mut self, store: ResultsStore) -> Self {
        self.results = Some(store);
        self
    }

    pub fn analyzer(&self) -> &StanceAnalyzer {
        &self.analyzer
    }

    /// Analyze the posts of `handle`
    pub async fn run(&self, handle: &str) -> Result<UserReport, PipelineError> {
        info!("Analyzing @{} via {}", handle, self.source.name());

        let profile = self
            .source
            .profile(handle)
            .await?
            .ok_or_else(|| PipelineError::UserNotFound(handle.to_string()))?;

        let posts = self.source.fetch_posts(handle, self.max_posts).await?;
        if posts.is_empty() {
            warn!("No posts found for @{}", handle);
            return Err(PipelineError::NoPosts(handle.to_string()));
        }

        if let Some(store) = &self.raw_store {
            store.save(handle, &posts)?;
        }

        let analysis = self.analyze_posts(&posts);

        if let Some(store) = &self.results {
            store.upsert(handle, &analysis)?;
        }

        info!(
            "@{}: {} (confidence {:.3}) over {} posts",
            handle,
            self.analyzer.label(analysis.stance),
            analysis.confidence,
            analysis.post_count()
        );

        Ok(UserReport {
            handle: handle.to_string(),
            profile,
            post_count: posts.len(),
            analysis,
        })
    }

    /// Analyze already collected posts
    pub fn analyze_posts(&self, posts: &[CollectedPost]) -> UserAnalysis {
        let features: Vec<PostFeatures> = posts.iter().map(CollectedPost::features).collect();
        self.analyzer.analyze_user(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stance_core::{NeutralPolarity, Stance, StanceConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemorySource {
        posts: Vec<&'static str>,
        exists: bool,
        fetches: AtomicUsize,
    }

    impl MemorySource {
        fn new(posts: Vec<&'static str>) -> Self {
            Self {
                posts,
                exists: true,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PostSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        async fn profile(&self, handle: &str) -> Result<Option<UserProfile>, SourceError> {
            Ok(self.exists.then(|| UserProfile {
                handle: handle.to_string(),
                display_name: "Test".to_string(),
                description: String::new(),
                followers_count: 1,
                follows_count: 2,
                posts_count: self.posts.len() as u64,
            }))
        }

        async fn fetch_posts(
            &self,
            _handle: &str,
            max_posts: usize,
        ) -> Result<Vec<CollectedPost>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .posts
                .iter()
                .take(max_posts)
                .enumerate()
                .map(|(i, text)| CollectedPost {
                    id: i.to_string(),
                    text: text.to_string(),
                    created_at: None,
                    metrics: Default::default(),
                    entities: Default::default(),
                })
                .collect())
        }
    }

    fn analyzer() -> StanceAnalyzer {
        StanceAnalyzer::new(StanceConfig::default(), Arc::new(NeutralPolarity)).unwrap()
    }

    #[tokio::test]
    async fn test_run_analyzes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(vec![
            "Free Palestine, ceasefire now",
            "End the occupation of Gaza",
            "Nice weather today",
        ]));
        let results = ResultsStore::new(dir.path().join("results.json"));
        let pipeline = Pipeline::new(source, analyzer(), 100)
            .with_raw_store(RawPostStore::new(dir.path().join("raw")))
            .with_results_store(results.clone());

        let report = pipeline.run("b.bsky.social").await.unwrap();
        assert_eq!(report.post_count, 3);
        assert_eq!(report.profile.display_name, "Test");
        assert_eq!(report.analysis.stance, Stance::SideB);

        assert!(dir.path().join("raw/b_bsky_social_posts.json").exists());
        let stored = results.get("b.bsky.social").unwrap().unwrap();
        assert_eq!(stored.post_count, 3);
        assert_eq!(stored.analysis, report.analysis);
    }

    #[tokio::test]
    async fn test_run_respects_max_posts() {
        let source = Arc::new(MemorySource::new(vec!["a", "b", "c", "d"]));
        let pipeline = Pipeline::new(source, analyzer(), 2);
        let report = pipeline.run("x").await.unwrap();
        assert_eq!(report.post_count, 2);
        assert_eq!(report.analysis.post_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let mut source = MemorySource::new(vec!["israel"]);
        source.exists = false;
        let source = Arc::new(source);
        let pipeline = Pipeline::new(source.clone(), analyzer(), 10);

        let err = pipeline.run("ghost").await.unwrap_err();
        assert!(matches!(err, PipelineError::UserNotFound(h) if h == "ghost"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_posts() {
        let dir = tempfile::tempdir().unwrap();
        let results = ResultsStore::new(dir.path().join("results.json"));
        let pipeline = Pipeline::new(Arc::new(MemorySource::new(vec![])), analyzer(), 10)
            .with_results_store(results.clone());

        let err = pipeline.run("quiet").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoPosts(_)));
        assert!(results.load().unwrap().is_empty());
    }
}
