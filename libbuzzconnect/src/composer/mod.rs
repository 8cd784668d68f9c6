//! Post composition
//!
//! A [`DraftPost`] holds everything the user has entered so far. The
//! [`Composer`] pairs it with the signed-in user's profile, because platform
//! and account selection is only allowed for what the profile has connected.

pub mod initial;
pub mod payload;
pub mod validation;

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::config::DefaultsConfig;
use crate::error::Result;
use crate::hashtags::{append_suggestions, extract_hashtags_from_content};
use crate::media::MediaStager;
use crate::platforms::{character_count, CharacterCount};
use crate::scheduling::ScheduleForm;
use crate::types::{Category, Platform, UserProfile};

pub use initial::{InitialPost, TextOrList};
pub use payload::{build_payload, AccountRef, PayloadMedia, PostMetadata, PostPayload};
pub use validation::{media_warnings, validate_draft};

/// The in-progress post
#[derive(Debug, Clone, Default)]
pub struct DraftPost {
    pub content: String,
    /// Free text; `#` tokens are sent as hashtags
    pub hashtags: String,
    /// Free text; `@` tokens are sent as mentions
    pub mentions: String,
    pub category: Category,
    /// Instagram collaborator username, with or without `@`
    pub collaborator: Option<String>,
    /// Also publish the Instagram post as a story
    pub instagram_story: bool,
    pub schedule: ScheduleForm,
    pub media: MediaStager,
    platforms: Vec<Platform>,
    selected_accounts: BTreeMap<Platform, Vec<String>>,
}

impl DraftPost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected platforms in selection order
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn selected_accounts(&self) -> &BTreeMap<Platform, Vec<String>> {
        &self.selected_accounts
    }

    pub fn accounts_for(&self, platform: Platform) -> &[String] {
        self.selected_accounts
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn character_count(&self) -> CharacterCount {
        character_count(&self.content, &self.platforms)
    }

    pub fn has_video(&self) -> bool {
        self.media.items().iter().any(|item| item.is_video())
    }
}

/// Draft plus the profile it is composed against
#[derive(Debug, Clone)]
pub struct Composer {
    profile: UserProfile,
    draft: DraftPost,
}

impl Composer {
    pub fn new(profile: UserProfile) -> Self {
        Self::with_draft(profile, DraftPost::default())
    }

    /// Start from existing draft data (edit and duplicate flows)
    pub fn with_draft(profile: UserProfile, draft: DraftPost) -> Self {
        Self { profile, draft }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn draft(&self) -> &DraftPost {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftPost {
        &mut self.draft
    }

    /// Pre-select the configured platforms and category
    pub fn apply_defaults(&mut self, defaults: &DefaultsConfig) {
        self.draft.category = Category::parse_or_default(&defaults.category);
        for name in &defaults.platforms {
            match name.parse::<Platform>() {
                Ok(platform) if !self.draft.platforms.contains(&platform) => {
                    self.toggle_platform(platform);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(platform = %name, error = %e, "Ignoring default platform"),
            }
        }
    }

    pub fn is_connected(&self, platform: Platform) -> bool {
        self.profile.connected_platforms().contains(&platform)
    }

    /// Select or deselect a platform. Returns false for an unconnected platform.
    ///
    /// Deselecting also drops the platform's account selection.
    pub fn toggle_platform(&mut self, platform: Platform) -> bool {
        if !self.is_connected(platform) {
            return false;
        }
        let draft = &mut self.draft;
        if let Some(pos) = draft.platforms.iter().position(|p| *p == platform) {
            draft.platforms.remove(pos);
            draft.selected_accounts.remove(&platform);
        } else {
            draft.platforms.push(platform);
        }
        true
    }

    /// Drop every selected platform and account
    pub fn clear_platforms(&mut self) {
        self.draft.platforms.clear();
        self.draft.selected_accounts.clear();
    }

    /// Select every connected platform, or clear the selection if all are already selected.
    ///
    /// Newly selected platforms without an account get their first account.
    pub fn toggle_all_platforms(&mut self) {
        let connected = self.profile.connected_platforms();
        if connected.is_empty() {
            return;
        }

        let draft = &mut self.draft;
        if connected.iter().all(|p| draft.platforms.contains(p)) {
            draft.platforms.clear();
            draft.selected_accounts.clear();
            return;
        }

        for platform in &connected {
            let has_selection = draft
                .selected_accounts
                .get(platform)
                .is_some_and(|ids| !ids.is_empty());
            if has_selection {
                continue;
            }
            let first = self
                .profile
                .accounts_for(*platform)
                .into_iter()
                .find_map(|a| a.selection_id());
            if let Some(id) = first {
                draft.selected_accounts.insert(*platform, vec![id.to_string()]);
            }
        }
        draft.platforms = connected;
    }

    /// Narrow the selection to one platform, keeping its accounts
    pub fn select_only(&mut self, platform: Platform) -> bool {
        if !self.is_connected(platform) {
            return false;
        }
        let draft = &mut self.draft;
        draft.platforms.retain(|p| *p == platform);
        draft.selected_accounts.retain(|p, _| *p == platform);
        if draft.platforms.is_empty() {
            draft.platforms.push(platform);
        }
        true
    }

    /// Add or remove one account. Empty ids are ignored and ids are kept unique.
    pub fn set_account_selected(&mut self, platform: Platform, account_id: &str, selected: bool) {
        if account_id.trim().is_empty() {
            tracing::debug!(platform = %platform, "Ignoring empty account id");
            return;
        }
        let ids = self.draft.selected_accounts.entry(platform).or_default();
        if selected {
            if !ids.iter().any(|id| id == account_id) {
                ids.push(account_id.to_string());
            }
        } else {
            ids.retain(|id| id != account_id);
        }
    }

    pub fn is_account_selected(&self, platform: Platform, account_id: &str) -> bool {
        self.draft.accounts_for(platform).iter().any(|id| id == account_id)
    }

    /// Move `#tags` written inside the content into the hashtag field
    pub fn extract_hashtags(&mut self) -> usize {
        let extracted = extract_hashtags_from_content(&self.draft.content);
        let moved = extracted.hashtags.len();
        if moved > 0 {
            self.draft.hashtags = append_suggestions(&self.draft.hashtags, &extracted.hashtags, '#');
            self.draft.content = extracted.content;
        }
        moved
    }

    pub fn validate(&self, now: NaiveDateTime) -> Result<()> {
        validate_draft(&self.draft, now)
    }

    /// Request body for the current draft
    pub fn build_payload(&self, timezone_offset: &str) -> PostPayload {
        build_payload(&self.draft, &self.profile, timezone_offset)
    }

    /// Back to an empty draft; staged media handles are released
    pub fn reset(&mut self) {
        self.draft.media.clear();
        let media = std::mem::take(&mut self.draft.media);
        self.draft = DraftPost {
            media,
            ..DraftPost::default()
        };
    }
}
