//! Collected posts and profiles
//!
//! The serialized form of [`CollectedPost`] is the raw posts file format
//! read back for offline analysis.

use serde::{Deserialize, Deserializer, Serialize};

use stance_core::{Entities, Metrics, PostFeatures};

use crate::api::{FacetFeature, PostRecord, PostView, ProfileView};

/// Public profile of a Bluesky account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub follows_count: u64,
    #[serde(default)]
    pub posts_count: u64,
}

impl From<ProfileView> for UserProfile {
    fn from(view: ProfileView) -> Self {
        Self {
            handle: view.handle,
            display_name: view.display_name.unwrap_or_default(),
            description: view.description.unwrap_or_default(),
            followers_count: view.followers_count,
            follows_count: view.follows_count,
            posts_count: view.posts_count,
        }
    }
}

/// A post as collected from an author feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedPost {
    /// Post URI
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "stance_core::lenient_text")]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Entities,
}

impl CollectedPost {
    /// Scorer input for this post
    pub fn features(&self) -> PostFeatures {
        PostFeatures::new(self.text.clone())
            .with_entities(self.entities.clone())
            .with_metrics(self.metrics)
    }
}

impl From<PostView> for CollectedPost {
    fn from(view: PostView) -> Self {
        let count = |v: Option<i64>| v.unwrap_or(0).max(0) as u64;
        let metrics = Metrics {
            repost_count: count(view.repost_count),
            like_count: count(view.like_count),
            reply_count: count(view.reply_count),
        };
        let entities = extract_entities(&view.record);

        Self {
            id: view.uri,
            text: view.record.text,
            created_at: view.record.created_at,
            metrics,
            entities,
        }
    }
}

/// Mentions (DIDs), links and hashtags from a record's facets
pub fn extract_entities(record: &PostRecord) -> Entities {
    let mut entities = Entities::default();

    let features = record
        .facets
        .iter()
        .flatten()
        .flat_map(|facet| facet.features.iter());

    for feature in features {
        match feature {
            FacetFeature::Mention { did } => entities.mentions.push(did.clone()),
            FacetFeature::Link { uri } => entities.links.push(uri.clone()),
            FacetFeature::Tag { tag } => entities.hashtags.push(tag.clone()),
            FacetFeature::Unknown => {}
        }
    }

    entities
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Facet;

    fn record_with(features: Vec<FacetFeature>) -> PostRecord {
        PostRecord {
            text: "hi @b.bsky.social see example.com #gaza".to_string(),
            created_at: Some("2024-05-01T12:00:00Z".to_string()),
            facets: Some(vec![Facet { features }]),
        }
    }

    #[test]
    fn test_extract_entities() {
        let record = record_with(vec![
            FacetFeature::Mention {
                did: "did:plc:b".to_string(),
            },
            FacetFeature::Link {
                uri: "https://example.com".to_string(),
            },
            FacetFeature::Tag {
                tag: "gaza".to_string(),
            },
            FacetFeature::Unknown,
        ]);

        let entities = extract_entities(&record);
        assert_eq!(entities.mentions, vec!["did:plc:b"]);
        assert_eq!(entities.links, vec!["https://example.com"]);
        assert_eq!(entities.hashtags, vec!["gaza"]);
    }

    #[test]
    fn test_no_facets() {
        let record = PostRecord {
            text: "plain".to_string(),
            ..Default::default()
        };
        assert_eq!(extract_entities(&record), Entities::default());
    }

    #[test]
    fn test_post_view_conversion_clamps_counts() {
        let view = PostView {
            uri: "at://did:plc:a/app.bsky.feed.post/1".to_string(),
            record: record_with(vec![]),
            reply_count: Some(2),
            repost_count: Some(-1),
            like_count: None,
        };
        let post = CollectedPost::from(view);
        assert_eq!(post.metrics.reply_count, 2);
        assert_eq!(post.metrics.repost_count, 0);
        assert_eq!(post.metrics.like_count, 0);

        let features = post.features();
        assert_eq!(features.text, post.text);
        assert_eq!(features.text_length, post.text.chars().count());
    }

    #[test]
    fn test_raw_file_format() {
        let json = r#"[
            {"id": "1", "text": "Free Palestine", "created_at": "2024-01-01",
             "metrics": {"repost_count": 1, "like_count": 2, "reply_count": 3},
             "entities": {"mentions": [], "links": [], "hashtags": ["ceasefire"]}},
            {"id": "2", "text": null, "metrics": null, "entities": {}}
        ]"#;
        let posts: Vec<CollectedPost> = serde_json::from_str(json).unwrap();
        assert_eq!(posts[0].metrics.reply_count, 3);
        assert_eq!(posts[0].entities.hashtags, vec!["ceasefire"]);
        assert_eq!(posts[1].text, "");
        assert_eq!(posts[1].created_at, None);

        let out = serde_json::to_value(&posts[0]).unwrap();
        assert_eq!(out["metrics"]["like_count"], 2);
        assert_eq!(out["entities"]["hashtags"][0], "ceasefire");
    }

    #[test]
    fn test_non_string_text_keeps_batch() {
        let json = r#"[
            {"id": "1", "text": "Free Palestine"},
            {"id": "2", "text": 12345},
            {"id": "3", "text": ["x"]}
        ]"#;
        let posts: Vec<CollectedPost> = serde_json::from_str(json).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].text, "Free Palestine");
        assert_eq!(posts[1].text, "");
        assert_eq!(posts[2].features().text_length, 0);
    }
}
