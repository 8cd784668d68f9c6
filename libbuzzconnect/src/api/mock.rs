//! In-memory backend for tests
//!
//! Answers every call from canned data, counts calls, and records what was
//! uploaded, created and published so tests can assert on the traffic.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Mutex, MutexGuard};

use super::{
    Backend, CanvaExport, CloudFile, CloudFilePage, CreatedPost, DriveProvider,
    GenerateContentRequest, GeneratedContent, Integration, LoginResponse, PublishResponse,
    PublishResults, RemoteMedia, SuggestionRequest, UploadFile,
};
use crate::api::types::PublishData;
use crate::composer::payload::PostPayload;
use crate::error::{ApiError, Result};
use crate::types::{Dimensions, UserProfile};

/// Number of calls made to each endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub login: usize,
    pub register: usize,
    pub logout: usize,
    pub profile: usize,
    pub upload: usize,
    pub create: usize,
    pub publish: usize,
    pub generate: usize,
    pub suggest_hashtags: usize,
    pub suggest_mentions: usize,
    pub status: usize,
    pub list_files: usize,
    pub import: usize,
    pub disconnect: usize,
    pub verify_password: usize,
    pub update_password: usize,
    pub send_otp: usize,
    pub verify_otp: usize,
    pub reset_password: usize,
}

/// Canned answers
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub profile: UserProfile,
    pub token: String,
    pub password: String,
    pub otp: String,
    /// Explicit upload results; by default each file gets a CDN URL under its name
    pub upload_results: Option<Vec<RemoteMedia>>,
    pub upload_error: Option<ApiError>,
    pub create_response: CreatedPost,
    pub create_error: Option<ApiError>,
    pub publish_response: PublishResponse,
    pub generated: GeneratedContent,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub connected: Vec<Integration>,
    pub drive_files: Vec<CloudFile>,
    /// Reported for every drive import; unset means the backend could not tell
    pub import_dimensions: Option<Dimensions>,
    pub send_otp_error: Option<ApiError>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            profile: UserProfile::default(),
            token: "mock-token".to_string(),
            password: "secret123".to_string(),
            otp: "123456".to_string(),
            upload_results: None,
            upload_error: None,
            create_response: CreatedPost {
                id: Some("post-1".to_string()),
                status: Some("draft".to_string()),
                ..Default::default()
            },
            create_error: None,
            publish_response: PublishResponse {
                success: true,
                message: None,
                data: None,
            },
            generated: GeneratedContent::new(),
            hashtags: Vec::new(),
            mentions: Vec::new(),
            connected: Vec::new(),
            drive_files: Vec::new(),
            import_dimensions: None,
            send_otp_error: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: MockCalls,
    uploaded: Vec<Vec<String>>,
    created: Vec<PostPayload>,
    published: Vec<String>,
    otp_emails: Vec<String>,
    registered: Vec<String>,
    disconnected: Vec<Integration>,
}

/// Backend double with configurable outcomes
#[derive(Debug, Default)]
pub struct MockBackend {
    config: Mutex<MockConfig>,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config: Mutex::new(config),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.config().profile = profile;
        self
    }

    pub fn with_upload_results(self, results: Vec<RemoteMedia>) -> Self {
        self.config().upload_results = Some(results);
        self
    }

    pub fn failing_upload(self, error: ApiError) -> Self {
        self.config().upload_error = Some(error);
        self
    }

    pub fn with_create_response(self, response: CreatedPost) -> Self {
        self.config().create_response = response;
        self
    }

    pub fn failing_create(self, error: ApiError) -> Self {
        self.config().create_error = Some(error);
        self
    }

    pub fn with_publish_response(self, response: PublishResponse) -> Self {
        self.config().publish_response = response;
        self
    }

    /// Publish answers `success: true` with these per-platform results
    pub fn with_publish_results(self, results: PublishResults) -> Self {
        self.with_publish_response(PublishResponse {
            success: true,
            message: None,
            data: Some(PublishData {
                publish_results: Some(results),
            }),
        })
    }

    pub fn with_generated(self, generated: GeneratedContent) -> Self {
        self.config().generated = generated;
        self
    }

    pub fn with_hashtags(self, hashtags: Vec<String>) -> Self {
        self.config().hashtags = hashtags;
        self
    }

    pub fn with_mentions(self, mentions: Vec<String>) -> Self {
        self.config().mentions = mentions;
        self
    }

    pub fn with_connected(self, integration: Integration) -> Self {
        self.config().connected.push(integration);
        self
    }

    pub fn with_drive_files(self, files: Vec<CloudFile>) -> Self {
        self.config().drive_files = files;
        self
    }

    pub fn with_import_dimensions(self, dimensions: Dimensions) -> Self {
        self.config().import_dimensions = Some(dimensions);
        self
    }

    pub fn failing_send_otp(self, error: ApiError) -> Self {
        self.config().send_otp_error = Some(error);
        self
    }

    pub fn calls(&self) -> MockCalls {
        self.state().calls.clone()
    }

    /// File names of each upload batch, in call order
    pub fn uploaded_batches(&self) -> Vec<Vec<String>> {
        self.state().uploaded.clone()
    }

    pub fn created_posts(&self) -> Vec<PostPayload> {
        self.state().created.clone()
    }

    pub fn published_ids(&self) -> Vec<String> {
        self.state().published.clone()
    }

    pub fn otp_emails(&self) -> Vec<String> {
        self.state().otp_emails.clone()
    }

    /// Emails of accounts created through `register`
    pub fn registered(&self) -> Vec<String> {
        self.state().registered.clone()
    }

    pub fn disconnected(&self) -> Vec<Integration> {
        self.state().disconnected.clone()
    }

    /// Current password, after any change or reset
    pub fn password(&self) -> String {
        self.config().password.clone()
    }

    fn config(&self) -> MutexGuard<'_, MockConfig> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn mock_media(name: &str, index: usize) -> RemoteMedia {
    RemoteMedia {
        url: Some(format!("https://cdn.mock/uploads/{}-{}", index, name)),
        public_id: Some(format!("media-{}", index)),
        filename: Some(name.to_string()),
        original_name: Some(name.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse> {
        self.state().calls.login += 1;
        let config = self.config();
        if password.expose_secret() != config.password {
            return Err(ApiError::Authentication("Invalid credentials".to_string()).into());
        }
        let mut user = config.profile.clone();
        user.email = Some(email.to_string());
        Ok(LoginResponse {
            token: config.token.clone(),
            user: Some(user),
        })
    }

    async fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse> {
        let mut state = self.state();
        state.calls.register += 1;
        if state.registered.iter().any(|e| e == email) {
            return Err(ApiError::Rejected("User already exists".to_string()).into());
        }
        state.registered.push(email.to_string());
        drop(state);

        let mut config = self.config();
        config.password = password.expose_secret().to_string();
        Ok(LoginResponse {
            token: config.token.clone(),
            user: Some(UserProfile {
                name: Some(display_name.to_string()),
                email: Some(email.to_string()),
                ..Default::default()
            }),
        })
    }

    async fn current_user(&self) -> Result<UserProfile> {
        self.state().calls.profile += 1;
        Ok(self.config().profile.clone())
    }

    async fn logout(&self) -> Result<()> {
        self.state().calls.logout += 1;
        Ok(())
    }

    async fn user_profile(&self) -> Result<UserProfile> {
        self.state().calls.profile += 1;
        Ok(self.config().profile.clone())
    }

    async fn upload_media(&self, files: Vec<UploadFile>) -> Result<Vec<RemoteMedia>> {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        {
            let mut state = self.state();
            state.calls.upload += 1;
            state.uploaded.push(names.clone());
        }

        let config = self.config();
        if let Some(err) = &config.upload_error {
            return Err(err.clone().into());
        }
        Ok(match &config.upload_results {
            Some(results) => results.clone(),
            None => names
                .iter()
                .enumerate()
                .map(|(i, name)| mock_media(name, i))
                .collect(),
        })
    }

    async fn create_post(&self, payload: &PostPayload) -> Result<CreatedPost> {
        {
            let mut state = self.state();
            state.calls.create += 1;
            state.created.push(payload.clone());
        }
        let config = self.config();
        if let Some(err) = &config.create_error {
            return Err(err.clone().into());
        }
        Ok(config.create_response.clone())
    }

    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse> {
        {
            let mut state = self.state();
            state.calls.publish += 1;
            state.published.push(post_id.to_string());
        }
        Ok(self.config().publish_response.clone())
    }

    async fn generate_content(&self, _request: &GenerateContentRequest) -> Result<GeneratedContent> {
        self.state().calls.generate += 1;
        Ok(self.config().generated.clone())
    }

    async fn suggest_hashtags(&self, _request: &SuggestionRequest) -> Result<Vec<String>> {
        self.state().calls.suggest_hashtags += 1;
        Ok(self.config().hashtags.clone())
    }

    async fn suggest_mentions(&self, _request: &SuggestionRequest) -> Result<Vec<String>> {
        self.state().calls.suggest_mentions += 1;
        Ok(self.config().mentions.clone())
    }

    async fn integration_status(&self, integration: Integration) -> Result<bool> {
        self.state().calls.status += 1;
        Ok(self.config().connected.contains(&integration))
    }

    async fn list_drive_files(
        &self,
        provider: DriveProvider,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CloudFilePage> {
        self.state().calls.list_files += 1;
        let config = self.config();
        if !config.connected.contains(&provider.integration()) {
            return Err(ApiError::Authentication(format!(
                "{} not connected",
                provider.integration()
            ))
            .into());
        }

        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + page_size as usize).min(config.drive_files.len());
        let files = config.drive_files.get(start..end).unwrap_or_default().to_vec();
        Ok(CloudFilePage {
            files,
            next_page_token: (end < config.drive_files.len()).then(|| end.to_string()),
        })
    }

    async fn import_drive_file(&self, provider: DriveProvider, file_id: &str) -> Result<RemoteMedia> {
        self.state().calls.import += 1;
        let config = self.config();
        let file = config
            .drive_files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ApiError::Http {
                status: 404,
                message: format!("File not found in {}", provider.integration()),
            })?;
        Ok(RemoteMedia {
            url: Some(format!("/uploads/{}", file.name)),
            original_name: Some(file.name.clone()),
            filename: Some(file.name.clone()),
            mime_type: file.mime_type.clone(),
            dimensions: config.import_dimensions,
            ..Default::default()
        })
    }

    async fn import_canva_design(&self, design_id: &str, export: CanvaExport) -> Result<RemoteMedia> {
        self.state().calls.import += 1;
        Ok(RemoteMedia {
            url: Some(format!(
                "https://cdn.mock/canva/{}.{}",
                design_id,
                export.as_str()
            )),
            ..Default::default()
        })
    }

    async fn disconnect_integration(&self, integration: Integration) -> Result<()> {
        {
            let mut state = self.state();
            state.calls.disconnect += 1;
            state.disconnected.push(integration);
        }
        self.config().connected.retain(|c| *c != integration);
        Ok(())
    }

    async fn verify_password(&self, current: &SecretString) -> Result<()> {
        self.state().calls.verify_password += 1;
        if current.expose_secret() != self.config().password {
            return Err(ApiError::Rejected("Current password is incorrect".to_string()).into());
        }
        Ok(())
    }

    async fn update_password(&self, current: &SecretString, new: &SecretString) -> Result<()> {
        self.state().calls.update_password += 1;
        let mut config = self.config();
        if current.expose_secret() != config.password {
            return Err(ApiError::Rejected("Current password is incorrect".to_string()).into());
        }
        config.password = new.expose_secret().to_string();
        Ok(())
    }

    async fn send_otp(&self, email: &str) -> Result<()> {
        {
            let mut state = self.state();
            state.calls.send_otp += 1;
            state.otp_emails.push(email.to_string());
        }
        if let Some(err) = &self.config().send_otp_error {
            return Err(err.clone().into());
        }
        Ok(())
    }

    async fn verify_otp(&self, _email: &str, otp: &str) -> Result<()> {
        self.state().calls.verify_otp += 1;
        if otp != self.config().otp {
            return Err(ApiError::Rejected("Invalid OTP. Please try again.".to_string()).into());
        }
        Ok(())
    }

    async fn reset_password(&self, _email: &str, new: &SecretString) -> Result<()> {
        self.state().calls.reset_password += 1;
        self.config().password = new.expose_secret().to_string();
        Ok(())
    }
}
