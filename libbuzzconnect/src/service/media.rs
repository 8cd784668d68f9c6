//! Local files and cloud-drive imports

use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{Backend, CanvaExport, CloudFilePage, DriveProvider, Integration, RemoteMedia};
use crate::composer::Composer;
use crate::config::Config;
use crate::error::{MediaError, Result};
use crate::media::{imported_item, MediaStager, StageReport};
use crate::types::MediaItem;

use super::events::{Event, EventBus};

/// Files requested per drive listing page
pub const DRIVE_PAGE_SIZE: u32 = 50;

/// Connection state of one integration
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationStatus {
    pub integration: Integration,
    pub connected: bool,
    /// Set when the status request itself failed
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
    event_bus: EventBus,
}

impl MediaService {
    pub fn new(backend: Arc<dyn Backend>, config: Arc<Config>, event_bus: EventBus) -> Self {
        Self {
            backend,
            config,
            event_bus,
        }
    }

    /// Stage local files on the composer's draft, resizing for its platform when configured
    pub fn attach_paths<P: AsRef<Path>>(&self, composer: &mut Composer, paths: &[P]) -> StageReport {
        let platforms = composer.draft().platforms().to_vec();
        let report = composer.draft_mut().media.stage_paths(
            paths,
            &platforms,
            self.config.media.auto_resize,
        );
        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), "Some files were not staged");
        }
        report
    }

    /// Upload local files right away and return their server copies
    pub async fn upload_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(Vec<MediaItem>, StageReport)> {
        let mut stager = MediaStager::new();
        let report = stager.stage_paths(paths, &[], false);
        let pending = stager.pending_count();
        if pending == 0 {
            return Ok((Vec::new(), report));
        }

        self.event_bus.emit(Event::MediaUploadStarted { count: pending });
        match stager
            .upload_pending(self.backend.as_ref(), self.config.api_base_url())
            .await
        {
            Ok(count) => {
                self.event_bus.emit(Event::MediaUploadCompleted { count });
                Ok((stager.items().to_vec(), report))
            }
            Err(e) => {
                self.event_bus.emit(Event::MediaUploadFailed {
                    error: e.to_string(),
                });
                stager.clear();
                Err(e)
            }
        }
    }

    /// Status of every integration, fetched concurrently
    pub async fn integration_statuses(&self) -> Vec<IntegrationStatus> {
        let requests = Integration::ALL
            .iter()
            .map(|integration| self.backend.integration_status(*integration));
        let answers = join_all(requests).await;

        Integration::ALL
            .iter()
            .zip(answers)
            .map(|(integration, answer)| match answer {
                Ok(connected) => IntegrationStatus {
                    integration: *integration,
                    connected,
                    error: None,
                },
                Err(e) => {
                    debug!(integration = %integration, error = %e, "Status check failed");
                    IntegrationStatus {
                        integration: *integration,
                        connected: false,
                        error: Some(e.user_message()),
                    }
                }
            })
            .collect()
    }

    pub async fn list_files(
        &self,
        provider: DriveProvider,
        page_token: Option<&str>,
    ) -> Result<CloudFilePage> {
        self.backend
            .list_drive_files(provider, DRIVE_PAGE_SIZE, page_token)
            .await
    }

    /// Import one file from Google Drive or OneDrive
    pub async fn import_drive_file(&self, provider: DriveProvider, file_id: &str) -> Result<MediaItem> {
        let remote = self.backend.import_drive_file(provider, file_id).await?;
        self.imported(provider.integration(), &remote, "Untitled Media", false)
    }

    /// Import a Canva design from its share URL or id
    pub async fn import_canva_design(&self, design: &str, export: CanvaExport) -> Result<MediaItem> {
        let design_id = crate::api::parse_canva_design_id(design);
        if design_id.is_empty() {
            return Err(crate::error::BuzzError::InvalidInput(
                "Please enter a Canva design URL or ID".to_string(),
            ));
        }
        let remote = self.backend.import_canva_design(&design_id, export).await?;
        self.imported(Integration::Canva, &remote, "Canva design", export.is_video())
    }

    /// Add an imported item to the draft; returns its index
    pub fn attach_imported(&self, composer: &mut Composer, item: MediaItem) -> Result<usize> {
        Ok(composer.draft_mut().media.add_remote(item)?)
    }

    pub async fn disconnect(&self, integration: Integration) -> Result<()> {
        self.backend.disconnect_integration(integration).await?;
        info!(integration = %integration, "Integration disconnected");
        Ok(())
    }

    fn imported(
        &self,
        integration: Integration,
        remote: &RemoteMedia,
        fallback_name: &str,
        video: bool,
    ) -> Result<MediaItem> {
        let item = imported_item(remote, self.config.api_base_url(), fallback_name, video)
            .ok_or_else(|| MediaError::Upload {
                name: remote.name().to_string(),
                reason: format!("{} import returned no usable URL", integration),
            })?;
        self.event_bus.emit(Event::MediaImported {
            integration: integration.slug().to_string(),
            name: item.name().to_string(),
        });
        Ok(item)
    }
}
