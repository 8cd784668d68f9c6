//! Request and response bodies exchanged with the backend

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{de_opt_id, Dimensions, MediaKind, MediaMimeType, Platform, UserProfile};

/// `POST /api/auth/login` response data
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// A file handed to the batched media upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: MediaMimeType,
    pub bytes: Vec<u8>,
}

/// Media record returned by upload and cloud-import endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMedia {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "secure_url")]
    pub secure_url: Option<String>,
    #[serde(default, rename = "public_url")]
    pub public_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<MediaKind>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnails: Option<BTreeMap<String, Option<String>>>,
    /// Set by the backend when this one file failed
    #[serde(default)]
    pub error: Option<String>,
}

impl RemoteMedia {
    /// First non-empty location among the fields the backend may use
    pub fn location(&self) -> Option<&str> {
        [
            &self.url,
            &self.secure_url,
            &self.public_url,
            &self.path,
            &self.file_url,
        ]
        .into_iter()
        .filter_map(|u| u.as_deref())
        .find(|u| !u.trim().is_empty())
    }

    pub fn name(&self) -> &str {
        self.original_name
            .as_deref()
            .or(self.display_name.as_deref())
            .or(self.filename.as_deref())
            .unwrap_or("file")
    }

    pub fn is_video(&self) -> bool {
        self.file_type == Some(MediaKind::Video)
            || self
                .mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("video/"))
    }
}

/// Create-post response data
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "de_opt_id")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub platform_posts: Vec<PlatformPost>,
    #[serde(default)]
    pub publish_results: Option<PublishResults>,
}

impl CreatedPost {
    pub fn post_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.object_id.as_deref())
    }

    /// The backend publishes immediately when no schedule was given
    pub fn is_published(&self) -> bool {
        self.status.as_deref() == Some("published")
            || self
                .platform_posts
                .iter()
                .any(|p| p.status.as_deref() == Some("published"))
    }

    /// Publish results, synthesised from `platformPosts` when the backend sent none
    pub fn results(&self) -> PublishResults {
        if let Some(results) = &self.publish_results {
            return results.clone();
        }
        let results: Vec<PlatformResult> = self
            .platform_posts
            .iter()
            .map(|p| PlatformResult {
                platform: p.platform.clone().unwrap_or_default(),
                success: p.status.as_deref() == Some("published"),
                post_id: None,
                error: None,
            })
            .collect();
        PublishResults {
            successful_publishes: results.iter().filter(|r| r.success).count(),
            total_accounts: results.len(),
            results,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformPost {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome of publishing to one account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResult {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishResults {
    #[serde(default)]
    pub successful_publishes: usize,
    #[serde(default)]
    pub total_accounts: usize,
    #[serde(default)]
    pub results: Vec<PlatformResult>,
}

/// `POST /api/posts/{id}/publish` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PublishData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishData {
    #[serde(default)]
    pub publish_results: Option<PublishResults>,
}

/// `POST /api/ai/generate-content` body
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub prompt: String,
    pub tone: String,
    pub platforms: Vec<Platform>,
    pub include_hashtags: bool,
    pub max_length: u32,
}

impl GenerateContentRequest {
    pub fn new(prompt: impl Into<String>, platforms: Vec<Platform>) -> Self {
        Self {
            prompt: prompt.into(),
            tone: "casual".to_string(),
            platforms,
            include_hashtags: true,
            max_length: 280,
        }
    }
}

/// Generated copy for one platform
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVariant {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub character_count: Option<usize>,
    #[serde(default)]
    pub within_limit: Option<bool>,
    // YouTube variants
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Generated copy keyed by platform name
pub type GeneratedContent = BTreeMap<String, GeneratedVariant>;

/// Body of both suggestion endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub content: String,
    pub platform: Platform,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mention_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_only: Option<bool>,
}

impl SuggestionRequest {
    pub fn hashtags(content: impl Into<String>, platform: Platform) -> Self {
        Self {
            content: content.into(),
            platform,
            count: 10,
            mention_types: None,
            verified_only: None,
        }
    }

    pub fn mentions(content: impl Into<String>, platform: Platform) -> Self {
        Self {
            content: content.into(),
            platform,
            count: 5,
            mention_types: Some(vec!["influencers".to_string(), "brands".to_string()]),
            verified_only: Some(false),
        }
    }
}

/// A file in a connected Google Drive or OneDrive
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudFilePage {
    #[serde(default)]
    pub files: Vec<CloudFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Pull a list of suggestion strings out of any of the shapes the AI
/// endpoints answer with: `data.hashtags`, `hashtags`, `data` as an array,
/// or a bare array. Objects contribute their `tag`/`hashtag`/`mention`/`username`/`name`.
pub fn extract_suggestions(body: &Value, key: &str) -> Vec<String> {
    let candidates = [
        body.get("data").and_then(|d| d.get(key)),
        body.get(key),
        body.get("data").filter(|d| d.is_array()),
        Some(body).filter(|b| b.is_array()),
    ];

    let Some(list) = candidates.into_iter().flatten().find_map(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(map) => ["tag", "hashtag", "mention", "username", "name"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// `data.connected`, falling back to a top-level `connected`
pub fn extract_connected(body: &Value) -> bool {
    body.get("data")
        .and_then(|d| d.get("connected"))
        .or_else(|| body.get("connected"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// The `data` member when present, otherwise the body itself
pub fn data_or_body(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_media_location_order() {
        let media: RemoteMedia = serde_json::from_value(json!({
            "secure_url": "https://cdn.example/a.jpg",
            "path": "/uploads/a.jpg",
            "originalName": "a.jpg"
        }))
        .unwrap();
        assert_eq!(media.location(), Some("https://cdn.example/a.jpg"));
        assert_eq!(media.name(), "a.jpg");

        let empty = RemoteMedia {
            url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(empty.location(), None);
    }

    #[test]
    fn test_created_post_published_detection() {
        let post: CreatedPost = serde_json::from_value(json!({
            "_id": "64f0",
            "status": "scheduled",
            "platformPosts": [
                {"platform": "twitter", "status": "published"},
                {"platform": "facebook", "status": "failed"}
            ]
        }))
        .unwrap();
        assert_eq!(post.post_id(), Some("64f0"));
        assert!(post.is_published());

        let results = post.results();
        assert_eq!(results.successful_publishes, 1);
        assert_eq!(results.total_accounts, 2);
        assert!(!results.results[1].success);
    }

    #[test]
    fn test_created_post_numeric_id() {
        let post: CreatedPost = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(post.post_id(), Some("42"));
        assert!(!post.is_published());
    }

    #[test]
    fn test_suggestion_request_bodies() {
        let body = serde_json::to_value(SuggestionRequest::mentions("hi", Platform::Instagram))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "content": "hi",
                "platform": "instagram",
                "count": 5,
                "mentionTypes": ["influencers", "brands"],
                "verifiedOnly": false
            })
        );

        let body = serde_json::to_value(SuggestionRequest::hashtags("hi", Platform::Twitter))
            .unwrap();
        assert_eq!(body, json!({"content": "hi", "platform": "twitter", "count": 10}));
    }

    #[test]
    fn test_generate_content_defaults() {
        let body = serde_json::to_value(GenerateContentRequest::new(
            "launch",
            vec![Platform::Linkedin],
        ))
        .unwrap();
        assert_eq!(body["tone"], "casual");
        assert_eq!(body["includeHashtags"], true);
        assert_eq!(body["maxLength"], 280);
    }

    #[test]
    fn test_extract_suggestions_shapes() {
        assert_eq!(
            extract_suggestions(&json!({"data": {"hashtags": ["#a", "b"]}}), "hashtags"),
            vec!["#a", "b"]
        );
        assert_eq!(
            extract_suggestions(&json!({"hashtags": [{"tag": "#c"}]}), "hashtags"),
            vec!["#c"]
        );
        assert_eq!(
            extract_suggestions(&json!({"data": [{"username": "nasa"}, 3]}), "mentions"),
            vec!["nasa"]
        );
        assert_eq!(extract_suggestions(&json!(["x", " "]), "mentions"), vec!["x"]);
        assert!(extract_suggestions(&json!({"success": true}), "hashtags").is_empty());
    }

    #[test]
    fn test_extract_connected() {
        assert!(extract_connected(&json!({"data": {"connected": true}})));
        assert!(extract_connected(&json!({"connected": true})));
        assert!(!extract_connected(&json!({"data": {"connected": "yes"}})));
        assert!(!extract_connected(&json!({})));
    }
}
