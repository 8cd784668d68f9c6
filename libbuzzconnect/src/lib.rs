//! BuzzConnect - compose, schedule and publish social media posts
//!
//! This library holds the rules of the BuzzConnect post composer: platform
//! limits, media staging, scheduling, validation and the request payloads the
//! backend expects. The `buzz-*` binaries are thin front ends over it.

pub mod api;
pub mod auth;
pub mod composer;
pub mod config;
pub mod error;
pub mod hashtags;
pub mod logging;
pub mod media;
pub mod platforms;
pub mod scheduling;
pub mod service;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use api::Backend;
pub use composer::{Composer, DraftPost};
pub use config::Config;
pub use error::{BuzzError, Result};
pub use media::MediaStager;
pub use scheduling::ScheduleForm;
pub use service::BuzzService;
pub use types::{Category, MediaItem, MediaKind, Platform, UserProfile};
