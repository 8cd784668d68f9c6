//! Pre-submit checks for a draft post
//!
//! Checks run in a fixed order and stop at the first failure, so the user
//! always sees the most basic problem first. Nothing here touches the network.

use chrono::NaiveDateTime;

use crate::error::{BuzzError, Result};
use crate::platforms::{is_aspect_ratio_allowed, YOUTUBE_TITLE_LIMIT};
use crate::types::Platform;

use super::DraftPost;

pub const CONTENT_REQUIRED: &str = "Content is required";
pub const PLATFORM_REQUIRED: &str = "Please select at least one platform";
pub const MEDIA_REQUIRED: &str = "Images are required for all posts";
pub const YOUTUBE_VIDEO_REQUIRED: &str = "YouTube posts require at least one video";
pub const YOUTUBE_TITLE_TOO_LONG: &str = "YouTube title cannot exceed 100 characters";

fn fail<T>(message: impl Into<String>) -> Result<T> {
    Err(BuzzError::Validation(message.into()))
}

/// Validate a draft for submission at `now` (local time)
pub fn validate_draft(draft: &DraftPost, now: NaiveDateTime) -> Result<()> {
    if draft.content.trim().is_empty() {
        return fail(CONTENT_REQUIRED);
    }

    let platforms = draft.platforms();
    if platforms.is_empty() {
        return fail(PLATFORM_REQUIRED);
    }

    let count = draft.character_count();
    if count.is_over_limit() {
        return fail(format!(
            "Content exceeds character limit ({}/{})",
            count.current, count.max
        ));
    }

    draft.schedule.validate(now)?;

    if platforms.iter().any(Platform::requires_media) && draft.media.is_empty() {
        return fail(MEDIA_REQUIRED);
    }

    if platforms.contains(&Platform::Youtube) {
        if !draft.has_video() {
            return fail(YOUTUBE_VIDEO_REQUIRED);
        }
        if draft.content.chars().count() > YOUTUBE_TITLE_LIMIT {
            return fail(YOUTUBE_TITLE_TOO_LONG);
        }
    }

    for platform in platforms.iter().filter(|p| p.requires_account()) {
        if draft.accounts_for(*platform).is_empty() {
            return fail(format!(
                "Please select at least one valid account for {}",
                platform.display_name()
            ));
        }
    }

    if platforms.contains(&Platform::Instagram) {
        check_instagram_ratios(draft)?;
    }

    Ok(())
}

/// Every Instagram feed image needs known dimensions within the accepted ratio
fn check_instagram_ratios(draft: &DraftPost) -> Result<()> {
    for item in draft.media.items() {
        if item.is_video() {
            continue;
        }
        let name = item
            .display_name
            .as_deref()
            .or(item.original_name.as_deref());
        let dimensions = match item.dimensions {
            Some(d) if d.width > 0 && d.height > 0 => d,
            _ => {
                return fail(format!(
                    "Couldn't determine dimensions for \"{}\".",
                    name.unwrap_or("an image")
                ));
            }
        };
        if !is_aspect_ratio_allowed(Platform::Instagram, dimensions) {
            let ratio = dimensions.width as f64 / dimensions.height as f64;
            return fail(format!(
                "\"{}\" has unsupported aspect ratio ({:.2}). Instagram feed accepts 0.8–1.91.",
                name.unwrap_or("An image"),
                ratio
            ));
        }
    }
    Ok(())
}

/// Non-blocking notes about media counts the platforms will not accept
pub fn media_warnings(draft: &DraftPost) -> Vec<String> {
    let items = draft.media.items();
    let videos = items.iter().filter(|i| i.is_video()).count();
    let images = items.len() - videos;

    let mut warnings = Vec::new();
    for platform in draft.platforms() {
        if images > platform.image_limit() {
            warnings.push(format!(
                "{} accepts at most {} image(s) per post; {} attached",
                platform.display_name(),
                platform.image_limit(),
                images
            ));
        }
        if videos > platform.video_limit() {
            warnings.push(format!(
                "{} accepts at most {} video(s) per post; {} attached",
                platform.display_name(),
                platform.video_limit(),
                videos
            ));
        }
    }
    warnings
}
