//! Service layer for BuzzConnect
//!
//! The command-line front ends drive everything through this module so that
//! submit orchestration, AI suggestions and cloud imports live in one place.
//!
//! # Architecture
//!
//! `BuzzService` is the entry point and hands out specialized sub-services
//! that share one `Backend`, one `Config` and one event bus:
//!
//! - `SubmitService`: validate, upload, create and publish a draft
//! - `SuggestionService`: AI generated content, hashtags and mentions
//! - `MediaService`: local file staging and Google Drive / OneDrive / Canva imports
//! - `EventBus`: progress event distribution
//!
//! # Example
//!
//! ```no_run
//! use libbuzzconnect::service::BuzzService;
//! use libbuzzconnect::types::Platform;
//!
//! # async fn example() -> libbuzzconnect::Result<()> {
//! let service = BuzzService::new()?;
//!
//! let mut composer = service.composer().await?;
//! composer.draft_mut().content = "Hello from the terminal".to_string();
//! composer.toggle_platform(Platform::Twitter);
//!
//! let now = chrono::Local::now().naive_local();
//! let outcome = service.submit().submit(&mut composer, now).await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod media;
pub mod submit;
pub mod suggestions;

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use self::events::{EventBus, EventReceiver};
use self::media::MediaService;
use self::submit::SubmitService;
use self::suggestions::SuggestionService;
use crate::api::http::HttpBackend;
use crate::api::Backend;
use crate::composer::{Composer, DraftPost, InitialPost};
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;

pub use events::Event;
pub use submit::{PublishOutcome, PublishSummary, SubmitOutcome};
pub use suggestions::{apply_suggestion, ContentSuggestion};

/// Main service facade that coordinates all sub-services
pub struct BuzzService {
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
    submit: SubmitService,
    suggestions: SuggestionService,
    media: MediaService,
    event_bus: EventBus,
}

impl BuzzService {
    /// Create a service from the default configuration and the saved session
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration or the session token cannot be read
    /// - Nobody is signed in, or the saved token has expired
    /// - The HTTP client cannot be built
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config)
    }

    /// Create a service talking to the configured backend as the signed-in user
    pub fn from_config(config: Config) -> Result<Self> {
        let session = Session::load()?;
        session.ensure_valid(Utc::now())?;
        debug!("Loaded session");
        let backend = HttpBackend::new(&config, session)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a service over any backend, such as `MockBackend` in tests
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Self {
        let config = Arc::new(config);
        let event_bus = EventBus::new(100);

        let submit = SubmitService::new(Arc::clone(&backend), Arc::clone(&config), event_bus.clone());
        let suggestions = SuggestionService::new(Arc::clone(&backend));
        let media = MediaService::new(Arc::clone(&backend), Arc::clone(&config), event_bus.clone());

        Self {
            backend,
            config,
            submit,
            suggestions,
            media,
            event_bus,
        }
    }

    /// A composer for the signed-in user with the configured defaults applied
    pub async fn composer(&self) -> Result<Composer> {
        let profile = self.backend.user_profile().await?;
        let mut composer = Composer::new(profile);
        composer.apply_defaults(&self.config.defaults);
        Ok(composer)
    }

    /// A composer holding a stored post, for editing or duplicating it
    ///
    /// Configured defaults are not applied; the stored post's own platforms
    /// and category are kept.
    pub async fn composer_from(&self, initial: InitialPost) -> Result<Composer> {
        let profile = self.backend.user_profile().await?;
        debug!(scheduled = initial.is_scheduled(), "Loading stored post into composer");
        Ok(Composer::with_draft(profile, DraftPost::from_initial(initial)))
    }

    pub fn submit(&self) -> &SubmitService {
        &self.submit
    }

    pub fn suggestions(&self) -> &SuggestionService {
        &self.suggestions
    }

    pub fn media(&self) -> &MediaService {
        &self.media
    }

    /// Direct backend access for operations without a sub-service (auth, profile)
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to service events
    ///
    /// Multiple subscribers are supported; each sees every event emitted after
    /// it subscribed.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
