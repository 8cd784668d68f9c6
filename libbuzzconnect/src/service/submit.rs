//! Submitting a draft: validate, upload, create, publish
//!
//! Scheduled posts are only created; the backend publishes them later.
//! Publish-now posts are created and then published, unless the create
//! response shows the backend already did it. The draft is reset only after
//! the whole sequence succeeds.

use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{Backend, PlatformResult, PublishResults};
use crate::composer::Composer;
use crate::config::Config;
use crate::error::{ApiError, BuzzError, Result};

use super::events::{Event, EventBus};

pub const NO_POST_ID_MESSAGE: &str = "Failed to create post - no ID returned";
pub const PUBLISH_FAILED_MESSAGE: &str = "Publishing failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Every targeted account received the post
    Complete,
    Partial,
    Failed,
}

/// Human-readable outcome of a publish
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSummary {
    pub outcome: PublishOutcome,
    pub message: String,
    pub results: Vec<PlatformResult>,
}

fn platform_label(result: &PlatformResult) -> String {
    if result.platform.is_empty() {
        "Unknown".to_string()
    } else {
        result.platform.to_uppercase()
    }
}

/// Summarise per-platform results into the message shown after publishing
pub fn summarize_publish(results: &PublishResults) -> PublishSummary {
    let successful = results.successful_publishes;
    let total = results.total_accounts;

    let (outcome, message) = if total > 0 && successful == total {
        (
            PublishOutcome::Complete,
            "Post published successfully to all platforms!".to_string(),
        )
    } else if successful > 0 {
        let succeeded: Vec<String> = results
            .results
            .iter()
            .filter(|r| r.success)
            .map(platform_label)
            .collect();
        let failed: Vec<String> = results
            .results
            .iter()
            .filter(|r| !r.success)
            .map(platform_label)
            .collect();

        let mut message = format!(
            "Published to {}/{} platforms. Success: {}",
            successful,
            total,
            succeeded.join(", ")
        );
        if !failed.is_empty() {
            message.push_str(&format!(". Failed: {}", failed.join(", ")));
        }
        (PublishOutcome::Partial, message)
    } else {
        (
            PublishOutcome::Failed,
            "Post publishing failed for all platforms".to_string(),
        )
    };

    PublishSummary {
        outcome,
        message,
        results: results.results.clone(),
    }
}

/// What a successful submission did
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Scheduled {
        post_id: Option<String>,
        scheduled_date: String,
    },
    Published {
        post_id: String,
        summary: PublishSummary,
    },
}

impl SubmitOutcome {
    pub fn message(&self) -> &str {
        match self {
            SubmitOutcome::Scheduled { .. } => "Post scheduled successfully!",
            SubmitOutcome::Published { summary, .. } => &summary.message,
        }
    }
}

/// Drives a draft through to the backend
#[derive(Clone)]
pub struct SubmitService {
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
    event_bus: EventBus,
}

impl SubmitService {
    pub fn new(backend: Arc<dyn Backend>, config: Arc<Config>, event_bus: EventBus) -> Self {
        Self {
            backend,
            config,
            event_bus,
        }
    }

    /// Validate and submit the composer's draft as of `now` (local time).
    ///
    /// # Errors
    ///
    /// Validation failures come back as `BuzzError::Validation` before any
    /// request is made. Upload, create and publish failures leave the draft in
    /// place so the user can retry.
    pub async fn submit(&self, composer: &mut Composer, now: NaiveDateTime) -> Result<SubmitOutcome> {
        composer.validate(now)?;

        let draft = composer.draft();
        let scheduled = draft.schedule.is_scheduled();
        self.event_bus.emit(Event::SubmitStarted {
            platforms: draft.platforms().iter().map(|p| p.to_string()).collect(),
            scheduled,
        });

        match self.run(composer, scheduled).await {
            Ok(outcome) => {
                composer.reset();
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "Submission failed");
                self.event_bus.emit(Event::SubmitFailed {
                    error: e.user_message(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, composer: &mut Composer, scheduled: bool) -> Result<SubmitOutcome> {
        self.upload_media(composer).await?;

        let payload = composer.build_payload(&self.config.defaults.timezone_offset);
        let created = self.backend.create_post(&payload).await?;
        self.event_bus.emit(Event::PostCreated {
            post_id: created.post_id().map(str::to_string),
            scheduled_date: payload.scheduled_date.clone(),
        });

        if scheduled {
            if let Some(scheduled_date) = payload.scheduled_date {
                info!(scheduled_date = %scheduled_date, "Post scheduled");
                return Ok(SubmitOutcome::Scheduled {
                    post_id: created.post_id().map(str::to_string),
                    scheduled_date,
                });
            }
        }

        let post_id = created
            .post_id()
            .map(str::to_string)
            .ok_or_else(|| BuzzError::Api(ApiError::Decode(NO_POST_ID_MESSAGE.to_string())))?;

        let summary = if created.is_published() {
            info!(post_id = %post_id, "Backend published on create");
            summarize_publish(&created.results())
        } else {
            let response = self.backend.publish_post(&post_id).await?;
            if !response.success {
                let message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| PUBLISH_FAILED_MESSAGE.to_string());
                return Err(ApiError::Rejected(message).into());
            }
            match response.data.and_then(|d| d.publish_results) {
                Some(results) => summarize_publish(&results),
                None => PublishSummary {
                    outcome: PublishOutcome::Complete,
                    message: response
                        .message
                        .unwrap_or_else(|| "Post published successfully!".to_string()),
                    results: Vec::new(),
                },
            }
        };

        info!(post_id = %post_id, outcome = ?summary.outcome, "Post published");
        self.event_bus.emit(Event::PublishCompleted {
            post_id: post_id.clone(),
            results: summary.results.clone(),
            message: summary.message.clone(),
        });
        Ok(SubmitOutcome::Published { post_id, summary })
    }

    async fn upload_media(&self, composer: &mut Composer) -> Result<()> {
        let pending = composer.draft().media.pending_count();
        if pending == 0 {
            return Ok(());
        }

        self.event_bus.emit(Event::MediaUploadStarted { count: pending });
        let base_url = self.config.api_base_url().to_string();
        match composer
            .draft_mut()
            .media
            .upload_pending(self.backend.as_ref(), &base_url)
            .await
        {
            Ok(count) => {
                self.event_bus.emit(Event::MediaUploadCompleted { count });
                Ok(())
            }
            Err(e) => {
                self.event_bus.emit(Event::MediaUploadFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(platform: &str, success: bool) -> PlatformResult {
        PlatformResult {
            platform: platform.to_string(),
            success,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_all() {
        let summary = summarize_publish(&PublishResults {
            successful_publishes: 2,
            total_accounts: 2,
            results: vec![result("twitter", true), result("facebook", true)],
        });
        assert_eq!(summary.outcome, PublishOutcome::Complete);
        assert_eq!(summary.message, "Post published successfully to all platforms!");
    }

    #[test]
    fn test_summary_partial() {
        let summary = summarize_publish(&PublishResults {
            successful_publishes: 2,
            total_accounts: 3,
            results: vec![
                result("twitter", true),
                result("facebook", false),
                result("linkedin", true),
            ],
        });
        assert_eq!(summary.outcome, PublishOutcome::Partial);
        assert_eq!(
            summary.message,
            "Published to 2/3 platforms. Success: TWITTER, LINKEDIN. Failed: FACEBOOK"
        );
    }

    #[test]
    fn test_summary_none() {
        let summary = summarize_publish(&PublishResults {
            successful_publishes: 0,
            total_accounts: 2,
            results: vec![result("twitter", false), result("", false)],
        });
        assert_eq!(summary.outcome, PublishOutcome::Failed);
        assert_eq!(summary.message, "Post publishing failed for all platforms");

        // No accounts at all is not a success
        let empty = summarize_publish(&PublishResults::default());
        assert_eq!(empty.outcome, PublishOutcome::Failed);
    }
}
