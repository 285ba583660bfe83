//! Bluesky AppView client
//!
//! Unauthenticated reads against the public XRPC API.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::api::{AuthorFeed, ProfileView, GET_AUTHOR_FEED, GET_PROFILE};
use crate::{create_client, BlueskyConfig, BlueskyError, CollectedPost, UserProfile};

/// Client for profile and author feed lookups
#[derive(Debug, Clone)]
pub struct BlueskyClient {
    http: Client,
    config: BlueskyConfig,
}

impl BlueskyClient {
    pub fn new(config: BlueskyConfig) -> Result<Self, BlueskyError> {
        let http = create_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BlueskyConfig {
        &self.config
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.config.base_url.trim_end_matches('/'), method)
    }

    /// Look up a profile by handle or DID
    pub async fn get_profile(&self, handle: &str) -> Result<UserProfile, BlueskyError> {
        debug!("Fetching profile for @{}", handle);

        let response = self
            .http
            .get(self.endpoint(GET_PROFILE))
            .query(&[("actor", handle)])
            .send()
            .await?;

        let view: ProfileView = decode(response, GET_PROFILE, handle).await?;
        Ok(view.into())
    }

    /// Fetch one page of an author feed
    pub async fn get_author_feed(
        &self,
        handle: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<AuthorFeed, BlueskyError> {
        let limit = limit.to_string();
        let mut request = self
            .http
            .get(self.endpoint(GET_AUTHOR_FEED))
            .query(&[("actor", handle), ("limit", limit.as_str())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        decode(response, GET_AUTHOR_FEED, handle).await
    }

    /// Collect up to `max_posts` distinct posts, newest first.
    ///
    /// A failed page is retried after a jittered delay. The retry count
    /// resets after every successful page; hitting `max_retries` in a row
    /// ends collection, returning what was gathered so far or
    /// [`BlueskyError::MaxRetries`] if nothing was.
    pub async fn get_user_posts(
        &self,
        handle: &str,
        max_posts: usize,
    ) -> Result<Vec<CollectedPost>, BlueskyError> {
        info!("Fetching up to {} posts from @{}", max_posts, handle);

        let mut posts: Vec<CollectedPost> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut retries = 0;

        while posts.len() < max_posts {
            let limit = self.config.page_size.min(max_posts - posts.len());

            let page = match self.get_author_feed(handle, limit, cursor.as_deref()).await {
                Ok(page) => {
                    retries = 0;
                    page
                }
                Err(e @ BlueskyError::NotFound(_)) => return Err(e),
                Err(e) => {
                    retries += 1;
                    warn!(
                        "Error fetching posts (attempt {}/{}): {}",
                        retries, self.config.max_retries, e
                    );
                    if retries >= self.config.max_retries {
                        if posts.is_empty() {
                            return Err(BlueskyError::MaxRetries(self.config.max_retries));
                        }
                        warn!("Giving up on @{} after {} posts", handle, posts.len());
                        break;
                    }
                    tokio::time::sleep(self.config.retry_delay()).await;
                    continue;
                }
            };

            if page.feed.is_empty() {
                break;
            }

            for item in page.feed {
                if posts.len() >= max_posts {
                    break;
                }
                if !seen.insert(item.post.uri.clone()) {
                    debug!("Skipping duplicate post {}", item.post.uri);
                    continue;
                }
                posts.push(item.post.into());
            }

            match page.cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => break,
            }
        }

        info!("Retrieved {} unique posts from @{}", posts.len(), handle);
        Ok(posts)
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    endpoint: &'static str,
    handle: &str,
) -> Result<T, BlueskyError> {
    let status = response.status();
    if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
        return Err(BlueskyError::NotFound(handle.to_string()));
    }
    if !status.is_success() {
        return Err(BlueskyError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }

    response.json().await.map_err(|e| BlueskyError::Decode {
        endpoint,
        message: e.to_string(),
    })
}
