//! Loading an existing post into the composer
//!
//! Editing and duplicating both start from the post as the backend stored
//! it. The shape is loose: ids may be numbers, hashtags may be a list, and
//! most fields may be missing or null.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::payload::INSTAGRAM_STORY;
use super::DraftPost;
use crate::scheduling::{parse_date, parse_time, PublishMode, ScheduleForm};
use crate::types::{Category, MediaItem, Platform};

/// A stored post, as returned by the posts endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialPost {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
    #[serde(default)]
    pub hashtags: Option<TextOrList>,
    #[serde(default)]
    pub mentions: Option<TextOrList>,
    /// Anything other than an object is ignored
    #[serde(default)]
    pub selected_accounts: Option<Value>,
    #[serde(default)]
    pub images: Option<Vec<MediaItem>>,
    /// Either `YYYY-MM-DD` or a full ISO timestamp
    #[serde(default)]
    pub scheduled_date: Option<String>,
    /// 24-hour `HH:MM`
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<InitialMetadata>,
    #[serde(default, alias = "instagram_collaborators")]
    pub instagram_collaborators: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitialMetadata {
    #[serde(default)]
    pub category: Option<String>,
}

/// Free-text fields are stored either as one string or as a list of tokens
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn into_text(self) -> String {
        match self {
            TextOrList::Text(text) => text,
            TextOrList::List(items) => items.join(" "),
        }
    }
}

impl InitialPost {
    /// A stored post counts as scheduled when it has a date or says so
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_date.is_some() || self.status.as_deref() == Some("scheduled")
    }
}

fn account_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(id).filter(|id| !id.is_empty())
}

/// `HH:MM` of an ISO timestamp such as `2030-01-02T10:30:00.000Z`
fn time_of_timestamp(value: &str) -> Option<&str> {
    if value.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    value.get(11..16)
}

fn schedule_from(initial: &InitialPost) -> ScheduleForm {
    let mut schedule = ScheduleForm::new();
    schedule.mode = if initial.is_scheduled() {
        PublishMode::Scheduled
    } else {
        PublishMode::Now
    };

    if let Some(raw) = initial.scheduled_date.as_deref() {
        match parse_date(raw) {
            Ok(date) => schedule.date = Some(date),
            Err(e) => warn!(date = %raw, error = %e, "Ignoring stored schedule date"),
        }
    }

    let time = initial
        .scheduled_time
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| initial.scheduled_date.as_deref().and_then(time_of_timestamp));
    if let Some(raw) = time {
        match parse_time(raw) {
            Ok(time) => schedule.time = Some(time),
            Err(e) => warn!(time = %raw, error = %e, "Ignoring stored schedule time"),
        }
    }
    schedule
}

impl DraftPost {
    /// Draft holding a stored post, for the edit and duplicate flows
    ///
    /// Platforms are taken as stored, whether or not they are still
    /// connected; submission validation reports anything that no longer
    /// applies. Media is kept as already-uploaded remote items.
    pub fn from_initial(initial: InitialPost) -> Self {
        let mut draft = DraftPost {
            content: initial.content.clone().unwrap_or_default(),
            hashtags: initial
                .hashtags
                .clone()
                .map(TextOrList::into_text)
                .unwrap_or_default(),
            mentions: initial
                .mentions
                .clone()
                .map(TextOrList::into_text)
                .unwrap_or_default(),
            category: initial
                .metadata
                .as_ref()
                .and_then(|m| m.category.as_deref())
                .map(Category::parse_or_default)
                .unwrap_or_default(),
            collaborator: initial
                .instagram_collaborators
                .as_ref()
                .and_then(|c| c.first())
                .filter(|c| !c.trim().is_empty())
                .cloned(),
            schedule: schedule_from(&initial),
            ..DraftPost::default()
        };

        for name in initial.platforms.iter().flatten() {
            if name.trim() == INSTAGRAM_STORY {
                draft.instagram_story = true;
                continue;
            }
            match name.parse::<Platform>() {
                Ok(platform) if !draft.platforms.contains(&platform) => draft.platforms.push(platform),
                Ok(_) => {}
                Err(e) => warn!(platform = %name, error = %e, "Ignoring stored platform"),
            }
        }

        if let Some(Value::Object(accounts)) = &initial.selected_accounts {
            for (name, ids) in accounts {
                let Ok(platform) = name.parse::<Platform>() else {
                    continue;
                };
                let mut selected: Vec<String> = Vec::new();
                for id in ids.as_array().into_iter().flatten().filter_map(account_id) {
                    if !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                if !selected.is_empty() {
                    draft.selected_accounts.insert(platform, selected);
                }
            }
        }

        for mut item in initial.images.unwrap_or_default() {
            if item.url.trim().is_empty() || item.has_local_handle() {
                warn!(name = %item.name(), "Skipping stored media without a server URL");
                continue;
            }
            item.is_local = false;
            if let Err(e) = draft.media.add_remote(item) {
                warn!(error = %e, "Stored post carries more media than a draft holds");
                break;
            }
        }

        draft
    }
}
