//! Core types for BuzzConnect

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::BuzzError;

/// A social network the backend can publish to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Linkedin,
    Youtube,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Linkedin,
        Platform::Youtube,
        Platform::Twitter,
    ];

    /// Identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
            Platform::Youtube => "youtube",
            Platform::Twitter => "twitter",
        }
    }

    /// Name shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Linkedin => "LinkedIn",
            Platform::Youtube => "YouTube",
            Platform::Twitter => "X",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = BuzzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "linkedin" => Ok(Platform::Linkedin),
            "youtube" => Ok(Platform::Youtube),
            "twitter" | "x" => Ok(Platform::Twitter),
            other => Err(BuzzError::InvalidInput(format!(
                "Unknown platform '{}'. Valid platforms: instagram, facebook, linkedin, youtube, twitter",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("image"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMimeType {
    Jpeg,
    Png,
    Gif,
    Webp,
    Mp4,
    Mov,
    Avi,
}

impl MediaMimeType {
    pub fn from_mime_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(MediaMimeType::Jpeg),
            "image/png" => Some(MediaMimeType::Png),
            "image/gif" => Some(MediaMimeType::Gif),
            "image/webp" => Some(MediaMimeType::Webp),
            "video/mp4" => Some(MediaMimeType::Mp4),
            "video/quicktime" | "video/mov" => Some(MediaMimeType::Mov),
            "video/x-msvideo" | "video/avi" => Some(MediaMimeType::Avi),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaMimeType::Jpeg),
            "png" => Some(MediaMimeType::Png),
            "gif" => Some(MediaMimeType::Gif),
            "webp" => Some(MediaMimeType::Webp),
            "mp4" => Some(MediaMimeType::Mp4),
            "mov" => Some(MediaMimeType::Mov),
            "avi" => Some(MediaMimeType::Avi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaMimeType::Jpeg => "image/jpeg",
            MediaMimeType::Png => "image/png",
            MediaMimeType::Gif => "image/gif",
            MediaMimeType::Webp => "image/webp",
            MediaMimeType::Mp4 => "video/mp4",
            MediaMimeType::Mov => "video/quicktime",
            MediaMimeType::Avi => "video/x-msvideo",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaMimeType::Mp4 | MediaMimeType::Mov | MediaMimeType::Avi => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Short format name as reported by the backend (`jpg`, `mp4`, ...)
    pub fn format(&self) -> &'static str {
        match self {
            MediaMimeType::Jpeg => "jpg",
            MediaMimeType::Png => "png",
            MediaMimeType::Gif => "gif",
            MediaMimeType::Webp => "webp",
            MediaMimeType::Mp4 => "mp4",
            MediaMimeType::Mov => "mov",
            MediaMimeType::Avi => "avi",
        }
    }
}

impl fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// width / height, or None for a degenerate size
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

/// One attachment of a draft post
///
/// Local items carry a `blob:` handle in `url` until the backend has stored
/// them; after upload `url` is the server location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<MediaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Raw thumbnail map as received; may contain nulls and empty strings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thumbnails: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub is_local: bool,
}

impl MediaItem {
    /// Best available human-readable name
    pub fn name(&self) -> &str {
        self.original_name
            .as_deref()
            .or(self.display_name.as_deref())
            .or(self.filename.as_deref())
            .unwrap_or("file")
    }

    /// Matches the backend's own video sniffing: explicit type, or a URL that looks like one
    pub fn is_video(&self) -> bool {
        self.file_type == Some(MediaKind::Video)
            || self.url.contains("video")
            || self.url.contains(".mp4")
    }

    pub fn has_local_handle(&self) -> bool {
        self.url.starts_with("blob:")
    }

    /// Thumbnails with null and empty values dropped; None when nothing is left
    pub fn cleaned_thumbnails(&self) -> Option<BTreeMap<String, String>> {
        let cleaned: BTreeMap<String, String> = self
            .thumbnails
            .iter()
            .filter_map(|(k, v)| match v {
                Some(v) if !v.is_empty() => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

/// A social account connected through the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    #[serde(default)]
    pub platform: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "de_opt_id")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub page_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub company_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub connected: Option<bool>,
}

impl ConnectedAccount {
    /// Identifier used when selecting the account for a post
    pub fn selection_id(&self) -> Option<&str> {
        [
            &self.account_id,
            &self.id,
            &self.object_id,
            &self.page_id,
            &self.company_id,
        ]
        .into_iter()
        .filter_map(|id| id.as_deref())
        .find(|id| !id.is_empty())
    }

    /// Every identifier this account may be referred to by
    pub fn known_ids(&self) -> impl Iterator<Item = &str> {
        [
            &self.object_id,
            &self.id,
            &self.account_id,
            &self.page_id,
            &self.company_id,
        ]
        .into_iter()
        .filter_map(|id| id.as_deref())
        .filter(|id| !id.is_empty())
    }

    /// Accounts count as connected unless the backend says otherwise
    pub fn is_connected(&self) -> bool {
        self.connected != Some(false)
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform.parse().ok()
    }
}

/// Subset of the `/api/users/profile` response the composer needs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub connected_platforms: Vec<String>,
    #[serde(default)]
    pub connected_accounts: Vec<ConnectedAccount>,
}

impl UserProfile {
    /// Platforms with at least one live account, plus those the backend lists explicitly
    pub fn connected_platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self
            .connected_platforms
            .iter()
            .filter_map(|p| p.parse().ok())
            .chain(
                self.connected_accounts
                    .iter()
                    .filter(|a| a.is_connected())
                    .filter_map(|a| a.platform()),
            )
            .collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    pub fn accounts_for(&self, platform: Platform) -> Vec<&ConnectedAccount> {
        self.connected_accounts
            .iter()
            .filter(|a| a.platform() == Some(platform) && a.is_connected())
            .collect()
    }

    /// Look an account up by any of its identifiers
    pub fn find_account(&self, id: &str) -> Option<&ConnectedAccount> {
        self.connected_accounts
            .iter()
            .find(|a| a.known_ids().any(|known| known == id))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Promotional,
    Educational,
    Entertainment,
    News,
    Personal,
    #[default]
    Other,
}

impl Category {
    /// Unknown values fall back to `Other`
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "promotional" => Category::Promotional,
            "educational" => Category::Educational,
            "entertainment" => Category::Entertainment,
            "news" => Category::News,
            "personal" => Category::Personal,
            _ => Category::Other,
        }
    }
}

/// Ids arrive as strings or numbers depending on the upstream platform
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("Instagram".parse::<Platform>().unwrap(), Platform::Instagram);
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!(" linkedin ".parse::<Platform>().unwrap(), Platform::Linkedin);

        let err = "myspace".parse::<Platform>().unwrap_err();
        assert!(err.to_string().contains("Unknown platform 'myspace'"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_platform_display_names() {
        assert_eq!(Platform::Twitter.display_name(), "X");
        assert_eq!(Platform::Linkedin.display_name(), "LinkedIn");
        assert_eq!(Platform::Youtube.display_name(), "YouTube");
        assert_eq!(Platform::Youtube.to_string(), "youtube");
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(MediaMimeType::from_extension("JPG"), Some(MediaMimeType::Jpeg));
        assert_eq!(MediaMimeType::from_extension("mov"), Some(MediaMimeType::Mov));
        assert_eq!(MediaMimeType::from_extension("txt"), None);
        assert_eq!(
            MediaMimeType::from_mime_str("video/quicktime"),
            Some(MediaMimeType::Mov)
        );
        assert_eq!(MediaMimeType::Avi.kind(), MediaKind::Video);
        assert_eq!(MediaMimeType::Webp.kind(), MediaKind::Image);
    }

    #[test]
    fn test_media_item_video_sniffing() {
        let explicit = MediaItem {
            url: "https://cdn/x".into(),
            file_type: Some(MediaKind::Video),
            ..Default::default()
        };
        let by_url = MediaItem {
            url: "https://cdn/uploads/clip.mp4".into(),
            ..Default::default()
        };
        let image = MediaItem {
            url: "https://cdn/uploads/photo.png".into(),
            ..Default::default()
        };
        assert!(explicit.is_video());
        assert!(by_url.is_video());
        assert!(!image.is_video());
    }

    #[test]
    fn test_cleaned_thumbnails() {
        let mut item = MediaItem::default();
        assert_eq!(item.cleaned_thumbnails(), None);

        item.thumbnails.insert("small".into(), Some("s.jpg".into()));
        item.thumbnails.insert("medium".into(), None);
        item.thumbnails.insert("large".into(), Some(String::new()));

        let cleaned = item.cleaned_thumbnails().unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned["small"], "s.jpg");
    }

    #[test]
    fn test_account_id_fallbacks() {
        let account: ConnectedAccount = serde_json::from_value(serde_json::json!({
            "platform": "facebook",
            "_id": "mongo-1",
            "pageId": 12345
        }))
        .unwrap();

        assert_eq!(account.selection_id(), Some("mongo-1"));
        assert_eq!(account.page_id.as_deref(), Some("12345"));
        assert!(account.is_connected());

        let account: ConnectedAccount = serde_json::from_value(serde_json::json!({
            "platform": "linkedin",
            "accountId": "",
            "companyId": "co-9",
            "connected": false
        }))
        .unwrap();
        assert_eq!(account.selection_id(), Some("co-9"));
        assert!(!account.is_connected());
    }

    #[test]
    fn test_profile_connected_platforms_union() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "connectedPlatforms": ["twitter"],
            "connectedAccounts": [
                {"platform": "instagram", "id": "ig-1", "username": "brand"},
                {"platform": "facebook", "id": "fb-1", "connected": false},
                {"platform": "twitter", "id": "tw-1"}
            ]
        }))
        .unwrap();

        assert_eq!(
            profile.connected_platforms(),
            vec![Platform::Instagram, Platform::Twitter]
        );
        assert_eq!(profile.accounts_for(Platform::Instagram).len(), 1);
        assert!(profile.accounts_for(Platform::Facebook).is_empty());
        assert_eq!(
            profile.find_account("ig-1").and_then(|a| a.username.as_deref()),
            Some("brand")
        );
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(Category::parse_or_default("News"), Category::News);
        assert_eq!(Category::parse_or_default("memes"), Category::Other);
        assert_eq!(
            serde_json::to_value(Category::Educational).unwrap(),
            serde_json::json!("educational")
        );
    }
}
