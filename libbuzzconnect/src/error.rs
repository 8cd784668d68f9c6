//! Error types for BuzzConnect

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuzzError>;

#[derive(Error, Debug)]
pub enum BuzzError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// A draft failed local form validation; the message is user-facing.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BuzzError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BuzzError::InvalidInput(_) => 3,
            BuzzError::Validation(_) => 3,
            BuzzError::Api(ApiError::Authentication(_)) => 2,
            BuzzError::Api(_) => 1,
            BuzzError::Config(_) => 1,
            BuzzError::Media(_) => 1,
        }
    }

    /// Message suitable for an error banner: validation errors are shown verbatim,
    /// backend errors without their category prefix.
    pub fn user_message(&self) -> String {
        match self {
            BuzzError::Validation(msg) | BuzzError::InvalidInput(msg) => msg.clone(),
            BuzzError::Api(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend answered 2xx but flagged the request with `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Authentication(msg)
            | ApiError::RateLimit(msg)
            | ApiError::Rejected(msg)
            | ApiError::Network(msg)
            | ApiError::Decode(msg) => msg,
            ApiError::Http { message, .. } => message,
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::RateLimit(_))
    }
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("{name}: Unsupported file type")]
    UnsupportedType { name: String },

    #[error("{name}: {kind} too large (max {limit_mb}MB)")]
    TooLarge {
        name: String,
        kind: &'static str,
        limit_mb: u64,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to upload {name}: {reason}")]
    Upload { name: String, reason: String },

    #[error("Unknown media handle: {0}")]
    UnknownHandle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = BuzzError::InvalidInput("Empty content".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_validation() {
        let error = BuzzError::Validation("Content is required".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = BuzzError::Api(ApiError::Authentication("expired".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_api_errors() {
        let errors = vec![
            ApiError::RateLimit("slow down".to_string()),
            ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            },
            ApiError::Rejected("nope".to_string()),
            ApiError::Network("refused".to_string()),
            ApiError::Decode("bad json".to_string()),
        ];
        for err in errors {
            assert_eq!(BuzzError::Api(err).exit_code(), 1);
        }
    }

    #[test]
    fn test_exit_code_config_and_media() {
        let error = BuzzError::Config(ConfigError::MissingField("api.base_url".to_string()));
        assert_eq!(error.exit_code(), 1);

        let error = BuzzError::Media(MediaError::UnknownHandle("blob:x".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let error = BuzzError::Validation("Please select at least one platform".to_string());
        assert_eq!(error.to_string(), "Please select at least one platform");
        assert_eq!(error.user_message(), "Please select at least one platform");
    }

    #[test]
    fn test_api_error_formatting() {
        let error = BuzzError::Api(ApiError::Http {
            status: 404,
            message: "Post not found".to_string(),
        });
        assert_eq!(error.to_string(), "API error: HTTP 404: Post not found");
        assert_eq!(error.user_message(), "Post not found");
    }

    #[test]
    fn test_media_error_messages() {
        let err = MediaError::UnsupportedType {
            name: "notes.txt".to_string(),
        };
        assert_eq!(err.to_string(), "notes.txt: Unsupported file type");

        let err = MediaError::TooLarge {
            name: "clip.mp4".to_string(),
            kind: "Video",
            limit_mb: 500,
        };
        assert_eq!(err.to_string(), "clip.mp4: Video too large (max 500MB)");

        let err = MediaError::TooLarge {
            name: "big.png".to_string(),
            kind: "Image",
            limit_mb: 50,
        };
        assert_eq!(err.to_string(), "big.png: Image too large (max 50MB)");
    }

    #[test]
    fn test_transient_errors() {
        assert!(ApiError::Network("x".into()).is_transient());
        assert!(ApiError::RateLimit("x".into()).is_transient());
        assert!(!ApiError::Authentication("x".into()).is_transient());
        assert!(!ApiError::Rejected("x".into()).is_transient());
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::MissingField("test".to_string());
        let error: BuzzError = config_error.into();

        match error {
            BuzzError::Config(_) => {}
            _ => panic!("Expected BuzzError::Config"),
        }
    }

    #[test]
    fn test_error_conversion_from_api_error() {
        let error: BuzzError = ApiError::Network("down".to_string()).into();
        assert!(matches!(error, BuzzError::Api(ApiError::Network(_))));
    }
}
