//! Create-post request body
//!
//! The backend is strict about shapes: account ids are strings, thumbnail maps
//! carry no nulls, and numeric fields are numbers or null. Everything is
//! normalised here so the rest of the crate can work with typed values.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::hashtags::{mentions_as_tags, parse_hashtags, parse_mentions};
use crate::platforms::YOUTUBE_TITLE_LIMIT;
use crate::types::{Category, Dimensions, MediaItem, MediaKind, Platform, UserProfile};

use super::DraftPost;

/// Extra target the backend understands for Instagram stories
pub const INSTAGRAM_STORY: &str = "instagram_story";

const UNKNOWN_ACCOUNT: &str = "Unknown Account";
const ALT_TEXT_LIMIT: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountRef {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostMetadata {
    pub category: Category,
    pub source: &'static str,
}

/// One media entry of the request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMedia {
    pub url: String,
    pub alt_text: String,
    pub original_name: String,
    pub display_name: String,
    pub filename: Option<String>,
    pub public_id: Option<String>,
    pub file_type: MediaKind,
    pub size: Option<u64>,
    pub dimensions: Option<Dimensions>,
    pub duration: Option<f64>,
    pub order: usize,
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<BTreeMap<String, String>>,
}

impl PayloadMedia {
    fn from_item(item: &MediaItem, index: usize) -> Self {
        let fallback = format!("Media {}", index + 1);
        let original_name = item
            .original_name
            .clone()
            .or_else(|| item.filename.clone())
            .unwrap_or_else(|| fallback.clone());
        let display_name = item
            .display_name
            .clone()
            .or_else(|| item.original_name.clone())
            .or_else(|| item.filename.clone())
            .unwrap_or(fallback);
        let alt_text = item
            .alt_text
            .as_deref()
            .or(item.original_name.as_deref())
            .unwrap_or("Post media")
            .chars()
            .take(ALT_TEXT_LIMIT)
            .collect();
        let file_type = match item.file_type {
            Some(kind) => kind,
            None if item.is_video() => MediaKind::Video,
            None => MediaKind::Image,
        };

        Self {
            url: item.url.clone(),
            alt_text,
            original_name,
            display_name,
            filename: item.filename.clone(),
            public_id: item.public_id.clone(),
            file_type,
            size: item.size,
            dimensions: item.dimensions,
            duration: item.duration,
            order: index,
            format: item.format.clone(),
            thumbnails: item.cleaned_thumbnails(),
        }
    }
}

/// Body of `POST /api/posts`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub content: String,
    /// Platform identifiers, plus `instagram_story` when stories are on
    pub platforms: Vec<String>,
    pub selected_accounts: BTreeMap<String, Vec<String>>,
    pub selected_accounts_with_names: BTreeMap<String, Vec<AccountRef>>,
    pub images: Vec<PayloadMedia>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub metadata: PostMetadata,
    // The backend reads either spelling; both are sent
    #[serde(rename = "instagram_collaborators", skip_serializing_if = "Option::is_none")]
    pub instagram_collaborators: Option<Vec<String>>,
    #[serde(rename = "instagramCollaborators", skip_serializing_if = "Option::is_none")]
    pub instagram_collaborators_alias: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_video: Option<PayloadMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
}

fn account_refs(ids: &[String], profile: &UserProfile) -> Vec<AccountRef> {
    ids.iter()
        .map(|id| AccountRef {
            id: id.clone(),
            username: profile
                .find_account(id)
                .and_then(|a| a.username.clone())
                .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string()),
        })
        .collect()
}

fn youtube_description(draft: &DraftPost) -> String {
    if draft.hashtags.trim().is_empty() {
        format!(
            "Thanks for watching this video about {}!\n\nDon't forget to like and subscribe for more content.",
            draft.content
        )
    } else {
        draft.hashtags.clone()
    }
}

/// Build the create-post body for a draft whose media has been uploaded.
///
/// `timezone_offset` is appended to the scheduled date-time.
pub fn build_payload(draft: &DraftPost, profile: &UserProfile, timezone_offset: &str) -> PostPayload {
    let mut platforms: Vec<String> = draft
        .platforms()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();

    let mut selected_accounts = BTreeMap::new();
    let mut selected_accounts_with_names = BTreeMap::new();
    for (platform, ids) in draft.selected_accounts() {
        let ids: Vec<String> = ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if ids.is_empty() {
            continue;
        }
        selected_accounts_with_names.insert(platform.as_str().to_string(), account_refs(&ids, profile));
        selected_accounts.insert(platform.as_str().to_string(), ids);
    }

    if draft.instagram_story && draft.platforms().contains(&Platform::Instagram) {
        platforms.push(INSTAGRAM_STORY.to_string());
        let ids = match selected_accounts.get(Platform::Instagram.as_str()) {
            Some(ids) => ids.clone(),
            None => profile
                .accounts_for(Platform::Instagram)
                .into_iter()
                .filter_map(|a| a.known_ids().next().map(str::to_string))
                .collect(),
        };
        if !ids.is_empty() {
            selected_accounts_with_names.insert(INSTAGRAM_STORY.to_string(), account_refs(&ids, profile));
            selected_accounts.insert(INSTAGRAM_STORY.to_string(), ids);
        }
    }

    let mut images: Vec<PayloadMedia> = draft
        .media
        .items()
        .iter()
        .filter(|item| !item.url.trim().is_empty())
        .enumerate()
        .map(|(i, item)| PayloadMedia::from_item(item, i))
        .collect();

    let collaborators = draft
        .collaborator
        .as_deref()
        .map(|c| c.trim().trim_start_matches('@').to_string())
        .filter(|c| !c.is_empty())
        .map(|c| vec![c]);

    let mut payload = PostPayload {
        content: draft.content.clone(),
        platforms,
        selected_accounts,
        selected_accounts_with_names,
        images: Vec::new(),
        hashtags: parse_hashtags(&draft.hashtags),
        mentions: parse_mentions(&draft.mentions),
        metadata: PostMetadata {
            category: draft.category,
            source: "web",
        },
        instagram_collaborators: collaborators.clone(),
        instagram_collaborators_alias: collaborators,
        title: None,
        description: None,
        youtube_video: None,
        tags: None,
        scheduled_date: draft.schedule.scheduled_timestamp(timezone_offset),
    };

    if draft.platforms().contains(&Platform::Youtube) {
        payload.title = Some(draft.content.chars().take(YOUTUBE_TITLE_LIMIT).collect());
        payload.description = Some(youtube_description(draft));

        if let Some(video) = images.iter().find(|m| m.file_type == MediaKind::Video).cloned() {
            if draft.platforms().len() == 1 {
                images = vec![video.clone()];
            }
            payload.youtube_video = Some(video);
        }

        if !draft.mentions.trim().is_empty() {
            payload.tags = Some(mentions_as_tags(&draft.mentions));
        }
    }

    payload.images = images;
    payload
}
