//! `reqwest` implementation of [`Backend`]

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::types::{data_or_body, extract_connected, extract_suggestions};
use super::{
    build_url, Backend, CanvaExport, CloudFilePage, CreatedPost, DriveProvider,
    GenerateContentRequest, GeneratedContent, Integration, LoginResponse, PublishResponse,
    RemoteMedia, SuggestionRequest, UploadFile,
};
use crate::composer::payload::PostPayload;
use crate::config::Config;
use crate::error::{ApiError, BuzzError, Result};
use crate::session::Session;
use crate::types::UserProfile;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Authentication failed. Please log in again.";

/// Client for the BuzzConnect backend
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpBackend {
    #[instrument(skip(config, session), fields(base_url = %config.api_base_url()))]
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        debug!("Creating backend client");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url().to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_ngrok(&self) -> bool {
        self.base_url.to_lowercase().contains("ngrok")
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if self.is_ngrok() {
            request = request.header("ngrok-skip-browser-warning", "true");
        }
        request
    }

    async fn send(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value> {
        let url = build_url(&self.base_url, endpoint);
        debug!(%method, %url, "API request");

        let mut request = self.authorize(self.client.request(method, &url));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "API request failed");
            ApiError::Network(format!("Unable to connect to server: {}", e))
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;
        debug!(%url, status, "API response");

        Ok(interpret_response(status, &text)?)
    }

    async fn get(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::GET, endpoint, None).await
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::DELETE, endpoint, None).await
    }
}

/// Map a raw response to its JSON body or a typed error
pub fn interpret_response(status: u16, body: &str) -> std::result::Result<Value, ApiError> {
    if status == 304 {
        return Ok(Value::Null);
    }
    if status == 429 {
        return Err(ApiError::RateLimit(RATE_LIMIT_MESSAGE.to_string()));
    }

    let fallback = format!("HTTP error! status: {}", status);
    let parsed = if body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(body)
    };

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .ok()
            .and_then(error_message)
            .unwrap_or(fallback);

        if status == 401 {
            if message.contains("token") || message.contains("authorization") {
                return Err(ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string()));
            }
            return Err(ApiError::Authentication(message));
        }
        return Err(ApiError::Http { status, message });
    }

    parsed.map_err(|_| ApiError::Decode(fallback))
}

/// `message`, then `error`, then `detail`
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Reject a 2xx body that carries `success: false`
pub fn check_success(body: &Value, fallback: &str) -> std::result::Result<(), ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_message(body).unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::Rejected(message));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| BuzzError::Api(ApiError::Decode(format!("Invalid {} response: {}", what, e))))
}

/// User payloads arrive either as `data` or wrapped in `data.user`
fn user_from_body(body: Value) -> Result<UserProfile> {
    let data = data_or_body(body);
    let user = match data {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            map.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    };
    decode(user, "user")
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse> {
        let body = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": password.expose_secret() }),
            )
            .await?;
        check_success(&body, "Login failed")?;
        decode(data_or_body(body), "login")
    }

    #[instrument(skip(self, password))]
    async fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse> {
        let body = self
            .post(
                "/api/auth/register",
                json!({
                    "displayName": display_name,
                    "email": email,
                    "password": password.expose_secret(),
                }),
            )
            .await?;
        check_success(&body, "Registration failed")?;
        decode(data_or_body(body), "register")
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<UserProfile> {
        let body = self.get("/api/auth/me").await?;
        user_from_body(body)
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<()> {
        self.send(Method::POST, "/api/auth/logout", None).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn user_profile(&self) -> Result<UserProfile> {
        let body = self.get("/api/users/profile").await?;
        user_from_body(body)
    }

    #[instrument(skip(self, files), fields(count = files.len()))]
    async fn upload_media(&self, files: Vec<UploadFile>) -> Result<Vec<RemoteMedia>> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.name.clone())
                .mime_str(file.mime.as_str())
                .map_err(|e| ApiError::Decode(format!("Invalid type for {}: {}", file.name, e)))?;
            form = form.part("files", part);
        }

        let url = build_url(&self.base_url, "/api/media/upload");
        debug!(%url, "Uploading media batch");
        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("Unable to connect to server: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: format!("Upload failed: {}", status.as_u16()),
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("Invalid upload response: {}", e)))?;

        match data_or_body(body) {
            list @ Value::Array(_) => decode(list, "upload"),
            _ => Err(ApiError::Decode("Failed to upload images - invalid response".to_string()).into()),
        }
    }

    #[instrument(skip(self, payload), fields(platforms = ?payload.platforms))]
    async fn create_post(&self, payload: &PostPayload) -> Result<CreatedPost> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::Decode(format!("Failed to encode post: {}", e)))?;
        let response = self.post("/api/posts", body).await?;
        check_success(&response, "Failed to create post")?;
        decode(data_or_body(response), "create post")
    }

    #[instrument(skip(self))]
    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse> {
        let body = self
            .send(Method::POST, &format!("/api/posts/{}/publish", post_id), None)
            .await?;
        decode(body, "publish")
    }

    #[instrument(skip(self, request))]
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GeneratedContent> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::Decode(format!("Failed to encode request: {}", e)))?;
        let response = self.post("/api/ai/generate-content", body).await?;
        check_success(&response, "Failed to generate content")?;

        let data = data_or_body(response);
        let content = match data {
            Value::Object(mut map) if map.get("content").is_some_and(Value::is_object) => {
                map.remove("content").unwrap_or(Value::Null)
            }
            other => other,
        };
        decode(content, "generated content")
    }

    #[instrument(skip(self, request))]
    async fn suggest_hashtags(&self, request: &SuggestionRequest) -> Result<Vec<String>> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::Decode(format!("Failed to encode request: {}", e)))?;
        let response = self.post("/api/ai/suggest-hashtags", body).await?;
        check_success(&response, "Failed to generate hashtags")?;
        Ok(extract_suggestions(&response, "hashtags"))
    }

    #[instrument(skip(self, request))]
    async fn suggest_mentions(&self, request: &SuggestionRequest) -> Result<Vec<String>> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::Decode(format!("Failed to encode request: {}", e)))?;
        let response = self.post("/api/ai/suggest-mentions", body).await?;
        check_success(&response, "Failed to generate mentions")?;
        Ok(extract_suggestions(&response, "mentions"))
    }

    #[instrument(skip(self))]
    async fn integration_status(&self, integration: Integration) -> Result<bool> {
        let body = self
            .get(&format!("/api/integrations/{}/status", integration.slug()))
            .await?;
        Ok(extract_connected(&body))
    }

    #[instrument(skip(self))]
    async fn list_drive_files(
        &self,
        provider: DriveProvider,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CloudFilePage> {
        let mut endpoint = format!(
            "/api/integrations/{}/files?pageSize={}",
            provider.integration().slug(),
            page_size
        );
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            endpoint.push_str("&pageToken=");
            endpoint.push_str(&percent_encode(token));
        }
        let body = self.get(&endpoint).await?;
        decode(data_or_body(body), "file list")
    }

    #[instrument(skip(self))]
    async fn import_drive_file(&self, provider: DriveProvider, file_id: &str) -> Result<RemoteMedia> {
        let body = self
            .post(
                &format!("/api/integrations/{}/import", provider.integration().slug()),
                json!({ "fileId": file_id }),
            )
            .await?;
        check_success(
            &body,
            &format!("Failed to import from {}", provider.integration()),
        )?;
        decode(data_or_body(body), "import")
    }

    #[instrument(skip(self))]
    async fn import_canva_design(&self, design_id: &str, export: CanvaExport) -> Result<RemoteMedia> {
        let body = self
            .post(
                "/api/integrations/canva/import",
                json!({ "designId": design_id, "exportType": export.as_str() }),
            )
            .await?;
        check_success(&body, "Failed to import from Canva")?;
        decode(data_or_body(body), "import")
    }

    #[instrument(skip(self))]
    async fn disconnect_integration(&self, integration: Integration) -> Result<()> {
        let body = self
            .delete(&format!("/api/integrations/{}/disconnect", integration.slug()))
            .await?;
        check_success(&body, &format!("Failed to disconnect {}", integration))?;
        Ok(())
    }

    #[instrument(skip(self, current))]
    async fn verify_password(&self, current: &SecretString) -> Result<()> {
        let body = self
            .post(
                "/api/users/verify-password",
                json!({ "currentPassword": current.expose_secret() }),
            )
            .await?;
        check_success(&body, "Current password is incorrect")?;
        Ok(())
    }

    #[instrument(skip(self, current, new))]
    async fn update_password(&self, current: &SecretString, new: &SecretString) -> Result<()> {
        let body = self
            .send(
                Method::PUT,
                "/api/users/update-password",
                Some(json!({
                    "currentPassword": current.expose_secret(),
                    "newPassword": new.expose_secret(),
                })),
            )
            .await?;
        check_success(&body, "Failed to update password")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_otp(&self, email: &str) -> Result<()> {
        let body = self
            .post("/api/auth/send-otp", json!({ "email": email }))
            .await?;
        check_success(&body, "Failed to send OTP")?;
        Ok(())
    }

    #[instrument(skip(self, otp))]
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<()> {
        let body = self
            .post("/api/auth/verify-otp", json!({ "email": email, "otp": otp }))
            .await?;
        check_success(&body, "Invalid OTP. Please try again.")?;
        Ok(())
    }

    #[instrument(skip(self, new))]
    async fn reset_password(&self, email: &str, new: &SecretString) -> Result<()> {
        let body = self
            .post(
                "/api/auth/update-password",
                json!({ "email": email, "newPassword": new.expose_secret() }),
            )
            .await?;
        check_success(&body, "Failed to reset password. Please try again.")?;
        Ok(())
    }
}

/// Query-string escaping for opaque page tokens
fn percent_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit() {
        let err = interpret_response(429, "{}").unwrap_err();
        assert!(matches!(err, ApiError::RateLimit(_)));
        assert_eq!(err.message(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_not_modified_is_empty() {
        assert_eq!(interpret_response(304, "").unwrap(), Value::Null);
    }

    #[test]
    fn test_error_message_precedence() {
        let err = interpret_response(400, r#"{"error": "bad", "detail": "worse"}"#).unwrap_err();
        assert_eq!(err.message(), "bad");

        let err = interpret_response(422, r#"{"detail": "invalid field"}"#).unwrap_err();
        assert_eq!(err.message(), "invalid field");

        let err = interpret_response(500, "<html>oops</html>").unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP error! status: 500");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_token_message() {
        let err = interpret_response(401, r#"{"message": "invalid token"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
        assert_eq!(err.message(), SESSION_EXPIRED_MESSAGE);

        let err = interpret_response(401, r#"{"message": "Invalid credentials"}"#).unwrap_err();
        assert_eq!(err.message(), "Invalid credentials");
    }

    #[test]
    fn test_success_bodies() {
        let body = interpret_response(200, r#"{"success": true, "data": {"id": "1"}}"#).unwrap();
        assert_eq!(body["data"]["id"], "1");
        assert_eq!(interpret_response(204, "").unwrap(), Value::Null);
        assert!(matches!(
            interpret_response(200, "not json").unwrap_err(),
            ApiError::Decode(_)
        ));
    }

    #[test]
    fn test_check_success() {
        assert!(check_success(&json!({"success": true}), "x").is_ok());
        assert!(check_success(&json!({"data": []}), "x").is_ok());

        let err = check_success(&json!({"success": false}), "Failed to send OTP").unwrap_err();
        assert_eq!(err.message(), "Failed to send OTP");

        let err = check_success(&json!({"success": false, "message": "User not found"}), "x")
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "User not found"));
    }

    #[test]
    fn test_user_from_body_shapes() {
        let wrapped = json!({"success": true, "data": {"user": {"email": "a@b.co"}}});
        assert_eq!(user_from_body(wrapped).unwrap().email.as_deref(), Some("a@b.co"));

        let direct = json!({"data": {"email": "c@d.co", "connectedPlatforms": ["twitter"]}});
        let user = user_from_body(direct).unwrap();
        assert_eq!(user.connected_platforms, vec!["twitter"]);
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("abc-_.~"), "abc-_.~");
        assert_eq!(percent_encode("a b/c=="), "a%20b%2Fc%3D%3D");
    }

    #[test]
    fn test_ngrok_and_base_url() {
        let mut config = Config::default();
        config.api.base_url = "https://abc.ngrok-free.app/".to_string();
        let backend = HttpBackend::new(&config, Session::anonymous()).unwrap();
        assert_eq!(backend.base_url(), "https://abc.ngrok-free.app");
        assert!(backend.is_ngrok());
    }
}
