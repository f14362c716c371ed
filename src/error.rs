//! Error types for the signup service.

/// Banner text shown when the remote service cannot be reached.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Banner text used when the remote service gives no usable error message.
pub const GENERIC_REQUEST_ERROR: &str = "Request failed. Please try again.";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures reported by the remote registration, offer and summary services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service rejected the submitted input.
    #[error("Rejected input: {0}")]
    Validation(String),

    /// Duplicate identity (e.g. the email is already registered).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),

    /// The request never completed (DNS, connect, reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// The single banner message shown to the user for this failure.
    ///
    /// Connectivity failures are re-worded so transport detail never reaches
    /// the user; everything the service itself said is passed through.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::InvalidResponse(_) => GENERIC_REQUEST_ERROR.to_string(),
            Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Server(msg) => msg.clone(),
        }
    }

    /// Whether this is a connectivity-class failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Session persistence errors. Never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
