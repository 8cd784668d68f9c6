//! Preferred image sizes per platform

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Dimensions, Platform};

/// A named image preset (feed square, story, thumbnail, ...)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Square,
    Vertical,
    Landscape,
    Story,
    Reel,
    Profile,
    Portrait,
    Horizontal,
    Carousel,
    Shorts,
    Full,
    Image,
    Thumbnail,
    Standard,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Square => "square",
            ImageType::Vertical => "vertical",
            ImageType::Landscape => "landscape",
            ImageType::Story => "story",
            ImageType::Reel => "reel",
            ImageType::Profile => "profile",
            ImageType::Portrait => "portrait",
            ImageType::Horizontal => "horizontal",
            ImageType::Carousel => "carousel",
            ImageType::Shorts => "shorts",
            ImageType::Full => "full",
            ImageType::Image => "image",
            ImageType::Thumbnail => "thumbnail",
            ImageType::Standard => "standard",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target size for a platform preset, if the platform defines it
pub fn target_dimensions(platform: Platform, image_type: ImageType) -> Option<Dimensions> {
    use ImageType::*;

    let (w, h) = match (platform, image_type) {
        (Platform::Instagram, Square) => (1080, 1080),
        (Platform::Instagram, Vertical) => (1080, 1350),
        (Platform::Instagram, Landscape) => (1080, 566),
        (Platform::Instagram, Story) => (1080, 1920),
        (Platform::Instagram, Reel) => (1080, 1920),
        (Platform::Instagram, Profile) => (320, 320),

        (Platform::Facebook, Square) => (1080, 1080),
        (Platform::Facebook, Landscape) => (1200, 630),
        (Platform::Facebook, Portrait) => (1080, 1350),
        (Platform::Facebook, Profile) => (400, 400),

        (Platform::Linkedin, Horizontal) => (1200, 627),
        (Platform::Linkedin, Square) => (1080, 1080),
        (Platform::Linkedin, Portrait) => (1080, 1350),
        (Platform::Linkedin, Carousel) => (1920, 1080),
        (Platform::Linkedin, Profile) => (400, 400),

        (Platform::Youtube, Shorts) => (1080, 1920),
        (Platform::Youtube, Full) => (1920, 1080),
        (Platform::Youtube, Image) => (1080, 1080),
        (Platform::Youtube, Thumbnail) => (1280, 720),
        (Platform::Youtube, Profile) => (800, 800),

        (Platform::Twitter, Standard) => (1200, 675),
        (Platform::Twitter, Square) => (1080, 1080),
        (Platform::Twitter, Profile) => (400, 400),

        _ => return None,
    };

    Some(Dimensions::new(w, h))
}

/// Pick the feed preset closest to an image's shape
pub fn optimal_image_type(width: u32, height: u32, platform: Platform) -> ImageType {
    if height == 0 {
        return ImageType::Square;
    }

    let ratio = width as f64 / height as f64;
    let is_square = (ratio - 1.0).abs() < 0.05;
    let is_vertical = ratio < 0.9;
    let is_horizontal = ratio > 1.1;

    match platform {
        Platform::Instagram => {
            if is_square {
                ImageType::Square
            } else if is_vertical {
                ImageType::Vertical
            } else if is_horizontal {
                ImageType::Landscape
            } else {
                ImageType::Square
            }
        }
        Platform::Facebook => {
            if is_square {
                ImageType::Square
            } else if is_vertical {
                ImageType::Portrait
            } else if is_horizontal {
                ImageType::Landscape
            } else {
                ImageType::Square
            }
        }
        Platform::Linkedin => {
            if is_square {
                ImageType::Square
            } else if is_vertical {
                ImageType::Portrait
            } else if is_horizontal {
                ImageType::Horizontal
            } else {
                ImageType::Square
            }
        }
        Platform::Youtube => {
            if is_vertical && ratio < 0.6 {
                ImageType::Shorts
            } else if is_horizontal && (ratio - 1.78).abs() < 0.1 {
                ImageType::Full
            } else {
                ImageType::Image
            }
        }
        Platform::Twitter => {
            if is_square {
                ImageType::Square
            } else {
                ImageType::Standard
            }
        }
    }
}

/// Result of comparing an image against a preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCheck {
    pub valid: bool,
    pub expected: Option<Dimensions>,
    pub actual: Dimensions,
    pub message: Option<String>,
}

/// Exact-size check against the preset table
pub fn validate_image_dimensions(
    actual: Dimensions,
    platform: Platform,
    image_type: ImageType,
) -> DimensionCheck {
    let Some(expected) = target_dimensions(platform, image_type) else {
        return DimensionCheck {
            valid: false,
            expected: None,
            actual,
            message: Some(format!(
                "No {} preset for {}",
                image_type,
                platform.display_name()
            )),
        };
    };

    let valid = expected == actual;
    DimensionCheck {
        valid,
        expected: Some(expected),
        actual,
        message: (!valid).then(|| {
            format!(
                "Image is {}x{}, {} {} expects {}x{}",
                actual.width,
                actual.height,
                platform.display_name(),
                image_type,
                expected.width,
                expected.height
            )
        }),
    }
}
