//! Backend REST API
//!
//! Everything that leaves the process goes through the [`Backend`] trait:
//! authentication, profile lookup, media upload, post creation and publishing,
//! AI suggestions, cloud-drive imports and password management.
//!
//! [`http::HttpBackend`] talks to the real service with `reqwest`;
//! [`mock::MockBackend`] records calls and returns canned answers for tests.

use async_trait::async_trait;
use regex::Regex;
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::composer::payload::PostPayload;
use crate::error::{BuzzError, Result};
use crate::types::UserProfile;

pub mod http;
pub mod types;

// Available in all builds so integration tests and the CLIs' tests can use it
pub mod mock;

pub use types::{
    CloudFile, CloudFilePage, CreatedPost, GenerateContentRequest, GeneratedContent,
    GeneratedVariant, LoginResponse, PlatformResult, PublishResponse, PublishResults,
    RemoteMedia, SuggestionRequest, UploadFile,
};

/// Third-party storage the backend can import media from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integration {
    GoogleDrive,
    OneDrive,
    Canva,
}

impl Integration {
    pub const ALL: [Integration; 3] = [
        Integration::GoogleDrive,
        Integration::OneDrive,
        Integration::Canva,
    ];

    /// Path segment under `/api/integrations/`
    pub fn slug(&self) -> &'static str {
        match self {
            Integration::GoogleDrive => "google-drive",
            Integration::OneDrive => "onedrive",
            Integration::Canva => "canva",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Integration::GoogleDrive => "Google Drive",
            Integration::OneDrive => "OneDrive",
            Integration::Canva => "Canva",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Integration {
    type Err = BuzzError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google-drive" | "googledrive" | "gdrive" | "drive" => Ok(Integration::GoogleDrive),
            "onedrive" | "one-drive" => Ok(Integration::OneDrive),
            "canva" => Ok(Integration::Canva),
            other => Err(BuzzError::InvalidInput(format!(
                "Unknown integration '{}'. Valid integrations: google-drive, onedrive, canva",
                other
            ))),
        }
    }
}

/// The two integrations that expose a browsable file list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveProvider {
    GoogleDrive,
    OneDrive,
}

impl DriveProvider {
    pub fn integration(&self) -> Integration {
        match self {
            DriveProvider::GoogleDrive => Integration::GoogleDrive,
            DriveProvider::OneDrive => Integration::OneDrive,
        }
    }
}

impl TryFrom<Integration> for DriveProvider {
    type Error = BuzzError;

    fn try_from(integration: Integration) -> Result<Self> {
        match integration {
            Integration::GoogleDrive => Ok(DriveProvider::GoogleDrive),
            Integration::OneDrive => Ok(DriveProvider::OneDrive),
            Integration::Canva => Err(BuzzError::InvalidInput(
                "Canva has no file list; import a design by URL or id".to_string(),
            )),
        }
    }
}

/// Export format for Canva designs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvaExport {
    #[default]
    Png,
    Jpg,
    Pdf,
    Mp4,
}

impl CanvaExport {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanvaExport::Png => "png",
            CanvaExport::Jpg => "jpg",
            CanvaExport::Pdf => "pdf",
            CanvaExport::Mp4 => "mp4",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, CanvaExport::Mp4)
    }
}

impl FromStr for CanvaExport {
    type Err = BuzzError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(CanvaExport::Png),
            "jpg" | "jpeg" => Ok(CanvaExport::Jpg),
            "pdf" => Ok(CanvaExport::Pdf),
            "mp4" => Ok(CanvaExport::Mp4),
            other => Err(BuzzError::InvalidInput(format!(
                "Unknown export type '{}'. Valid types: png, jpg, pdf, mp4",
                other
            ))),
        }
    }
}

fn canva_design_regex() -> &'static Regex {
    static DESIGN: OnceLock<Regex> = OnceLock::new();
    DESIGN.get_or_init(|| {
        Regex::new(r"canva\.com/design/([A-Za-z0-9_-]+)").expect("canva regex should compile")
    })
}

/// Design id from a Canva share URL, or the trimmed input when it is already an id
pub fn parse_canva_design_id(input: &str) -> String {
    let trimmed = input.trim();
    canva_design_regex()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Join a base URL and an endpoint without doubling slashes or `/api`
pub fn build_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    let mut endpoint = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    };

    if base.ends_with("/api") && endpoint.starts_with("/api/") {
        endpoint = endpoint["/api".len()..].to_string();
    }

    format!("{}{}", base, endpoint)
}

/// Operations the backend offers to this client
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse>;

    /// Create an account; the response carries a token like [`Backend::login`]
    async fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse>;

    async fn current_user(&self) -> Result<UserProfile>;

    async fn logout(&self) -> Result<()>;

    /// Profile with connected platforms and accounts
    async fn user_profile(&self) -> Result<UserProfile>;

    /// One batched multipart upload; results come back in input order
    async fn upload_media(&self, files: Vec<UploadFile>) -> Result<Vec<RemoteMedia>>;

    async fn create_post(&self, payload: &PostPayload) -> Result<CreatedPost>;

    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse>;

    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GeneratedContent>;

    async fn suggest_hashtags(&self, request: &SuggestionRequest) -> Result<Vec<String>>;

    async fn suggest_mentions(&self, request: &SuggestionRequest) -> Result<Vec<String>>;

    async fn integration_status(&self, integration: Integration) -> Result<bool>;

    async fn list_drive_files(
        &self,
        provider: DriveProvider,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CloudFilePage>;

    async fn import_drive_file(&self, provider: DriveProvider, file_id: &str)
        -> Result<RemoteMedia>;

    async fn import_canva_design(&self, design_id: &str, export: CanvaExport)
        -> Result<RemoteMedia>;

    async fn disconnect_integration(&self, integration: Integration) -> Result<()>;

    /// Check the signed-in user's current password
    async fn verify_password(&self, current: &SecretString) -> Result<()>;

    /// Replace the signed-in user's password
    async fn update_password(&self, current: &SecretString, new: &SecretString) -> Result<()>;

    async fn send_otp(&self, email: &str) -> Result<()>;

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<()>;

    /// Set a new password after a verified OTP
    async fn reset_password(&self, email: &str, new: &SecretString) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("https://mgabuzzconnect.com/", "/api/posts"),
            "https://mgabuzzconnect.com/api/posts"
        );
        assert_eq!(
            build_url("https://host/api", "/api/posts"),
            "https://host/api/posts"
        );
        assert_eq!(build_url("https://host", "health"), "https://host/health");
        assert_eq!(
            build_url("https://host/api//", "/api/ai/generate-content"),
            "https://host/api/ai/generate-content"
        );
    }

    #[test]
    fn test_parse_canva_design_id() {
        assert_eq!(
            parse_canva_design_id("https://www.canva.com/design/DAF_x-9z/view?utm=1"),
            "DAF_x-9z"
        );
        assert_eq!(parse_canva_design_id("  DAF123 "), "DAF123");
        assert_eq!(parse_canva_design_id(""), "");
    }

    #[test]
    fn test_integration_parsing() {
        assert_eq!("Google-Drive".parse::<Integration>().unwrap(), Integration::GoogleDrive);
        assert_eq!("onedrive".parse::<Integration>().unwrap(), Integration::OneDrive);
        assert!("dropbox".parse::<Integration>().is_err());
        assert!(DriveProvider::try_from(Integration::Canva).is_err());
        assert_eq!(
            DriveProvider::try_from(Integration::OneDrive).unwrap().integration().slug(),
            "onedrive"
        );
    }

    #[test]
    fn test_canva_export() {
        assert_eq!("JPEG".parse::<CanvaExport>().unwrap(), CanvaExport::Jpg);
        assert!(CanvaExport::Mp4.is_video());
        assert_eq!(CanvaExport::default().as_str(), "png");
    }
}
