//! Wire types for the AppView XRPC endpoints used here

use serde::Deserialize;

pub const GET_PROFILE: &str = "app.bsky.actor.getProfile";
pub const GET_AUTHOR_FEED: &str = "app.bsky.feed.getAuthorFeed";

/// `app.bsky.actor.defs#profileViewDetailed`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub follows_count: u64,
    #[serde(default)]
    pub posts_count: u64,
}

/// One page of `app.bsky.feed.getAuthorFeed`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorFeed {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub feed: Vec<FeedViewPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub uri: String,
    #[serde(default)]
    pub record: PostRecord,
    #[serde(default)]
    pub reply_count: Option<i64>,
    #[serde(default)]
    pub repost_count: Option<i64>,
    #[serde(default)]
    pub like_count: Option<i64>,
}

/// `app.bsky.feed.post` record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub facets: Option<Vec<Facet>>,
}

/// Rich-text annotation over a byte range of the post text
#[derive(Debug, Clone, Deserialize)]
pub struct Facet {
    #[serde(default)]
    pub features: Vec<FacetFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },

    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },

    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },

    #[serde(other)]
    Unknown,
}
