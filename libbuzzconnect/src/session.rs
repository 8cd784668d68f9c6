//! Bearer token persistence
//!
//! The backend issues a JWT on login. It is kept in `<data dir>/token` (mode
//! 0600 on Unix) or supplied through `BUZZ_TOKEN`, and held in memory as a
//! [`SecretString`] so it never shows up in `Debug` output or logs.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};

use crate::config::resolve_data_path;
use crate::error::{ApiError, ConfigError, Result};

const TOKEN_FILE: &str = "token";

pub const NOT_LOGGED_IN_MESSAGE: &str = "Not logged in. Run `buzz-auth login` first.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Run `buzz-auth login` again.";

#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    /// Session without credentials (login, OTP and reset endpoints)
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        let token: String = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self {
            token: Some(SecretString::from(token.trim().to_string())),
        }
    }

    /// Load from `BUZZ_TOKEN`, falling back to the token file
    pub fn load() -> Result<Self> {
        if let Ok(token) = std::env::var("BUZZ_TOKEN") {
            return Ok(Self::from_token(token));
        }
        Self::load_from_path(&token_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::anonymous());
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Ok(Self::from_token(content))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// True when the token is missing, or is a JWT whose `exp` is not after `now`.
    /// Opaque tokens without a readable `exp` are assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.token {
            None => true,
            Some(token) => match token_expiry(token.expose_secret()) {
                Some(exp) => exp <= now,
                None => false,
            },
        }
    }

    /// Fail with an authentication error unless a live token is present
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_authenticated() {
            return Err(ApiError::Authentication(NOT_LOGGED_IN_MESSAGE.to_string()).into());
        }
        if self.is_expired(now) {
            return Err(ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string()).into());
        }
        Ok(())
    }
}

/// Default location of the persisted token
pub fn token_path() -> Result<PathBuf> {
    Ok(resolve_data_path()?.join(TOKEN_FILE))
}

/// Persist a token, creating the data directory if needed
pub fn save_token(path: &Path, token: &SecretString) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::ReadError)?;
    }
    std::fs::write(path, token.expose_secret()).map_err(ConfigError::ReadError)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(ConfigError::ReadError)?;
    }

    tracing::debug!(path = %path.display(), "Saved session token");
    Ok(())
}

/// Remove a persisted token; a missing file is fine
pub fn clear_token(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::ReadError(e).into()),
    }
}

/// Read the `exp` claim of a JWT without verifying its signature
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}
