//! Local media staging
//!
//! Files picked by the user are validated, optionally resized for the single
//! selected platform, and registered under a `blob:<uuid>` handle so a draft
//! can show and reference them before the backend has a copy. Uploading is
//! one batched request; results are matched back to local items by position.
//!
//! Handles live in a [`LocalRefTable`]. Every handle is revoked exactly once:
//! when its item is replaced by the uploaded copy, removed, or the draft is
//! cleared.

pub mod resize;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{Backend, RemoteMedia, UploadFile};
use crate::error::{MediaError, Result};
use crate::platforms::MAX_FILES;
use crate::types::{Dimensions, MediaItem, MediaKind, MediaMimeType, Platform};

pub const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;

const LOCAL_HANDLE_PREFIX: &str = "blob:";

/// File contents held in memory until upload
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub mime: MediaMimeType,
    pub bytes: Vec<u8>,
    pub dimensions: Option<Dimensions>,
}

impl LocalFile {
    /// Wrap in-memory bytes, measuring images
    pub fn new(name: impl Into<String>, mime: MediaMimeType, bytes: Vec<u8>) -> Self {
        let dimensions = match mime.kind() {
            MediaKind::Image => resize::measure(&bytes).ok(),
            MediaKind::Video => None,
        };
        Self {
            name: name.into(),
            mime,
            bytes,
            dimensions,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn kind(&self) -> MediaKind {
        self.mime.kind()
    }
}

/// Check a file's type and size before it is read or staged
pub fn validate_file(
    name: &str,
    mime: Option<MediaMimeType>,
    size: u64,
) -> std::result::Result<MediaMimeType, MediaError> {
    let mime = mime.ok_or_else(|| MediaError::UnsupportedType {
        name: name.to_string(),
    })?;

    let (limit, kind) = match mime.kind() {
        MediaKind::Video => (MAX_VIDEO_BYTES, "Video"),
        MediaKind::Image => (MAX_IMAGE_BYTES, "Image"),
    };
    if size > limit {
        return Err(MediaError::TooLarge {
            name: name.to_string(),
            kind,
            limit_mb: limit / (1024 * 1024),
        });
    }
    Ok(mime)
}

/// Read a file from disk, checking type and size before reading the contents
pub fn load_local_file(path: &Path) -> std::result::Result<LocalFile, MediaError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaMimeType::from_extension);

    let read_err = |source| MediaError::Read {
        path: path.display().to_string(),
        source,
    };
    let metadata = std::fs::metadata(path).map_err(read_err)?;
    let mime = validate_file(&name, mime, metadata.len())?;
    let bytes = std::fs::read(path).map_err(read_err)?;

    Ok(LocalFile::new(name, mime, bytes))
}

/// Resolve a media location returned by the backend.
///
/// Absolute (`http`), `blob:` and `data:` URLs pass through; a root-relative
/// path is joined to `base`; anything else is rejected.
pub fn build_full_url(url: &str, base: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") || url.starts_with(LOCAL_HANDLE_PREFIX) || url.starts_with("data:") {
        return Some(url.to_string());
    }
    if url.starts_with('/') && !url.starts_with("//") {
        let base = base.trim_end_matches('/');
        return Some(format!("{}{}", base, url));
    }
    None
}

/// Registry of live local handles
#[derive(Debug, Clone, Default)]
pub struct LocalRefTable {
    inner: Arc<Mutex<HashMap<String, Arc<LocalFile>>>>,
}

impl LocalRefTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<LocalFile>>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a file and return its `blob:` handle
    pub fn create(&self, file: LocalFile) -> String {
        let handle = format!("{}{}", LOCAL_HANDLE_PREFIX, Uuid::new_v4());
        self.entries().insert(handle.clone(), Arc::new(file));
        handle
    }

    pub fn get(&self, handle: &str) -> Option<Arc<LocalFile>> {
        self.entries().get(handle).cloned()
    }

    pub fn is_live(&self, handle: &str) -> bool {
        self.entries().contains_key(handle)
    }

    /// Release a handle. Returns true only the first time for a given handle.
    pub fn revoke(&self, handle: &str) -> bool {
        self.entries().remove(handle).is_some()
    }

    /// Handles not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}

/// Outcome of staging a batch of files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    /// Indices into the stager's items of the newly staged files
    pub staged: Vec<usize>,
    /// `"{name}: {reason}"` per skipped file
    pub rejected: Vec<String>,
    /// Names of images that were resized
    pub resized: Vec<String>,
    pub resize_platform: Option<Platform>,
}

impl StageReport {
    pub fn resize_summary(&self) -> Option<String> {
        let platform = self.resize_platform?;
        if self.resized.is_empty() {
            return None;
        }
        Some(format!(
            "{} image(s) automatically resized for {}: {}",
            self.resized.len(),
            platform.display_name(),
            self.resized.join(", ")
        ))
    }

    pub fn rejection_summary(&self) -> Option<String> {
        if self.rejected.is_empty() {
            None
        } else {
            Some(format!("Some files were skipped:\n{}", self.rejected.join("\n")))
        }
    }
}

/// The ordered media list of a draft plus the handles backing its local items
#[derive(Debug, Clone, Default)]
pub struct MediaStager {
    refs: LocalRefTable,
    items: Vec<MediaItem>,
}

impl MediaStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refs(refs: LocalRefTable) -> Self {
        Self {
            refs,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn refs(&self) -> &LocalRefTable {
        &self.refs
    }

    /// Items still waiting for upload
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|i| i.has_local_handle()).count()
    }

    /// Stage in-memory files.
    ///
    /// Invalid files are reported and skipped; the rest are staged. With
    /// exactly one platform selected and `auto_resize` on, images are
    /// resized to that platform's preset first. A failed resize keeps the
    /// original bytes.
    pub fn stage(
        &mut self,
        files: Vec<LocalFile>,
        platforms: &[Platform],
        auto_resize: bool,
    ) -> StageReport {
        let mut report = StageReport::default();
        let resize_for = match platforms {
            [only] if auto_resize => Some(*only),
            _ => None,
        };
        report.resize_platform = resize_for;

        for mut file in files {
            if self.items.len() >= MAX_FILES {
                report.rejected.push(format!(
                    "{}: Maximum {} files per post",
                    file.name, MAX_FILES
                ));
                continue;
            }
            if let Err(e) = validate_file(&file.name, Some(file.mime), file.size()) {
                report.rejected.push(e.to_string());
                continue;
            }

            if let (Some(platform), MediaKind::Image) = (resize_for, file.kind()) {
                match resize::auto_resize(&file.bytes, file.mime, platform) {
                    Ok(Some(resized)) => {
                        file.bytes = resized.bytes;
                        file.dimensions = Some(resized.dimensions);
                        report.resized.push(file.name.clone());
                    }
                    Ok(None) => {}
                    Err(e) => warn!(file = %file.name, error = %e, "Image resize failed, keeping original"),
                }
            }

            let item = MediaItem {
                alt_text: Some(file.name.clone()),
                original_name: Some(file.name.clone()),
                display_name: Some(file.name.clone()),
                filename: Some(file.name.clone()),
                file_type: Some(file.kind()),
                size: Some(file.size()),
                dimensions: file.dimensions,
                format: Some(file.mime.as_str().to_string()),
                is_local: true,
                url: String::new(),
                ..Default::default()
            };
            let url = self.refs.create(file);
            self.items.push(MediaItem { url, ..item });
            report.staged.push(self.items.len() - 1);
        }

        debug!(
            staged = report.staged.len(),
            rejected = report.rejected.len(),
            resized = report.resized.len(),
            "Staged media"
        );
        report
    }

    /// Load files from disk and stage them; unreadable files are reported like invalid ones
    pub fn stage_paths<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        platforms: &[Platform],
        auto_resize: bool,
    ) -> StageReport {
        let mut files = Vec::new();
        let mut load_errors = Vec::new();
        for path in paths {
            match load_local_file(path.as_ref()) {
                Ok(file) => files.push(file),
                Err(e) => load_errors.push(e.to_string()),
            }
        }

        let mut report = self.stage(files, platforms, auto_resize);
        load_errors.append(&mut report.rejected);
        report.rejected = load_errors;
        report
    }

    /// Append media the backend already holds (cloud imports)
    pub fn add_remote(&mut self, item: MediaItem) -> std::result::Result<usize, MediaError> {
        if self.items.len() >= MAX_FILES {
            return Err(MediaError::Upload {
                name: item.name().to_string(),
                reason: format!("Maximum {} files per post", MAX_FILES),
            });
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Remove an item, revoking its handle if it is local
    pub fn remove(&mut self, index: usize) -> Option<MediaItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        if item.has_local_handle() {
            self.refs.revoke(&item.url);
        }
        Some(item)
    }

    /// Drop every item, revoking all local handles
    pub fn clear(&mut self) {
        for item in self.items.drain(..) {
            if item.has_local_handle() {
                self.refs.revoke(&item.url);
            }
        }
    }

    /// Upload every local item in one batch and swap in the server copies.
    ///
    /// Results are matched by position. Every result is checked before any
    /// item is replaced, so on error all local items stay staged.
    pub async fn upload_pending(&mut self, backend: &dyn Backend, base_url: &str) -> Result<usize> {
        let pending: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.has_local_handle())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut files = Vec::with_capacity(pending.len());
        for &index in &pending {
            let handle = &self.items[index].url;
            let file = self
                .refs
                .get(handle)
                .ok_or_else(|| MediaError::UnknownHandle(handle.clone()))?;
            files.push(UploadFile {
                name: file.name.clone(),
                mime: file.mime,
                bytes: file.bytes.clone(),
            });
        }

        info!(count = files.len(), "Uploading staged media");
        let results = backend.upload_media(files).await?;

        let mut replacements = Vec::with_capacity(pending.len());
        for (position, &index) in pending.iter().enumerate() {
            let local = &self.items[index];
            let remote = results.get(position).ok_or_else(|| MediaError::Upload {
                name: local.name().to_string(),
                reason: "no result returned by server".to_string(),
            })?;
            replacements.push((index, reconcile(local, remote, base_url)?));
        }

        for (index, uploaded) in replacements {
            let handle = std::mem::replace(&mut self.items[index], uploaded).url;
            self.refs.revoke(&handle);
        }

        info!(count = pending.len(), "Media uploaded");
        Ok(pending.len())
    }
}

/// Server copy of a local item
fn reconcile(
    local: &MediaItem,
    remote: &RemoteMedia,
    base_url: &str,
) -> std::result::Result<MediaItem, MediaError> {
    let name = remote
        .original_name
        .as_deref()
        .or(remote.display_name.as_deref())
        .unwrap_or_else(|| local.name())
        .to_string();

    if let Some(error) = &remote.error {
        return Err(MediaError::Upload {
            name,
            reason: error.clone(),
        });
    }

    let url = remote
        .location()
        .and_then(|u| build_full_url(u, base_url))
        .filter(|u| !u.starts_with(LOCAL_HANDLE_PREFIX))
        .ok_or_else(|| MediaError::Upload {
            name: name.clone(),
            reason: "server returned no valid URL".to_string(),
        })?;

    let mut item = MediaItem {
        url,
        public_id: remote.public_id.clone().or_else(|| local.public_id.clone()),
        filename: remote.filename.clone().or_else(|| local.filename.clone()),
        original_name: remote
            .original_name
            .clone()
            .or_else(|| local.original_name.clone()),
        display_name: remote
            .display_name
            .clone()
            .or_else(|| remote.original_name.clone())
            .or_else(|| local.display_name.clone()),
        size: remote.size.or(local.size),
        dimensions: remote.dimensions.or(local.dimensions),
        duration: remote.duration.or(local.duration),
        is_local: false,
        ..local.clone()
    };
    if let Some(thumbnails) = &remote.thumbnails {
        item.thumbnails = thumbnails.clone();
    }
    Ok(item)
}

/// Media item for a file the backend imported from a cloud source
pub fn imported_item(remote: &RemoteMedia, base_url: &str, fallback_name: &str, video: bool) -> Option<MediaItem> {
    let url = build_full_url(remote.location()?, base_url)?;
    let name = remote
        .original_name
        .clone()
        .or_else(|| remote.filename.clone())
        .unwrap_or_else(|| fallback_name.to_string());
    let is_video = video || remote.is_video();

    Some(MediaItem {
        url,
        alt_text: Some(name.clone()),
        original_name: Some(name.clone()),
        display_name: Some(name),
        filename: remote.filename.clone(),
        public_id: remote.public_id.clone(),
        file_type: Some(if is_video {
            MediaKind::Video
        } else {
            MediaKind::Image
        }),
        size: remote.size,
        dimensions: remote.dimensions,
        duration: remote.duration,
        format: remote.mime_type.clone().or_else(|| {
            Some(if is_video { "video/mp4" } else { "image/jpeg" }.to_string())
        }),
        thumbnails: remote.thumbnails.clone().unwrap_or_default(),
        is_local: false,
    })
}
