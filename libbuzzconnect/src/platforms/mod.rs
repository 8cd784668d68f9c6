//! Per-platform publishing rules
//!
//! Character limits, media caps and aspect-ratio ranges the composer checks
//! locally before anything is sent to the backend. Image dimension presets
//! live in [`dimensions`].

pub mod dimensions;

use std::collections::BTreeMap;

use crate::types::{Dimensions, Platform};

pub use dimensions::{optimal_image_type, target_dimensions, validate_image_dimensions, ImageType};

/// Limit used when no platform is selected
pub const DEFAULT_CHARACTER_LIMIT: usize = 2200;

/// Most media items a single post may carry
pub const MAX_FILES: usize = 10;

/// Longest YouTube title; the title is taken from the start of the content
pub const YOUTUBE_TITLE_LIMIT: usize = 100;

impl Platform {
    pub fn character_limit(&self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::Instagram => 2200,
            Platform::Facebook => 63206,
            Platform::Linkedin => 3000,
            Platform::Youtube => 5000,
        }
    }

    /// Inclusive (min, max) width/height ratio, or None when any ratio is accepted
    pub fn aspect_ratio_range(&self) -> Option<(f64, f64)> {
        match self {
            Platform::Instagram => Some((0.8, 1.91)),
            Platform::Facebook => Some((0.5, 2.0)),
            Platform::Linkedin => Some((0.75, 2.0)),
            Platform::Twitter => Some((0.5, 2.0)),
            Platform::Youtube => None,
        }
    }

    /// Most images one post may carry on this platform
    pub fn image_limit(&self) -> usize {
        match self {
            Platform::Linkedin => 1,
            _ => MAX_FILES,
        }
    }

    /// Most videos one post may carry on this platform
    pub fn video_limit(&self) -> usize {
        match self {
            Platform::Youtube => 1,
            _ => MAX_FILES,
        }
    }

    /// Platforms where a post without media is rejected
    pub fn requires_media(&self) -> bool {
        matches!(self, Platform::Instagram)
    }

    /// Platforms where a post must target at least one selected account
    pub fn requires_account(&self) -> bool {
        matches!(
            self,
            Platform::Instagram | Platform::Facebook | Platform::Linkedin | Platform::Youtube
        )
    }
}

/// Live character counter for the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCount {
    pub current: usize,
    pub max: usize,
    pub remaining: i64,
    pub per_platform: BTreeMap<Platform, PlatformCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCount {
    pub max: usize,
    pub remaining: i64,
}

impl CharacterCount {
    pub fn is_over_limit(&self) -> bool {
        self.remaining < 0
    }

    /// Platforms whose own limit is exceeded
    pub fn exceeded(&self) -> Vec<Platform> {
        self.per_platform
            .iter()
            .filter(|(_, count)| count.remaining < 0)
            .map(|(platform, _)| *platform)
            .collect()
    }
}

impl std::fmt::Display for CharacterCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// Count characters (not bytes) against the strictest selected platform
pub fn character_count(content: &str, platforms: &[Platform]) -> CharacterCount {
    let current = content.chars().count();
    let max = platforms
        .iter()
        .map(Platform::character_limit)
        .min()
        .unwrap_or(DEFAULT_CHARACTER_LIMIT);

    let per_platform = platforms
        .iter()
        .map(|p| {
            let max = p.character_limit();
            (
                *p,
                PlatformCount {
                    max,
                    remaining: max as i64 - current as i64,
                },
            )
        })
        .collect();

    CharacterCount {
        current,
        max,
        remaining: max as i64 - current as i64,
        per_platform,
    }
}

/// Whether an image's ratio is inside the platform's accepted range
pub fn is_aspect_ratio_allowed(platform: Platform, dimensions: Dimensions) -> bool {
    let Some(ratio) = dimensions.aspect_ratio() else {
        return false;
    };
    match platform.aspect_ratio_range() {
        Some((min, max)) => ratio >= min && ratio <= max,
        None => true,
    }
}
