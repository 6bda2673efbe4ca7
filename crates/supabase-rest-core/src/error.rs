use serde_json::Value as JsonValue;

/// All errors that can occur in the supabase-rest crates.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// A required clause or configuration value is missing or malformed.
    /// Raised before any network activity.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote endpoint answered with a failure status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("unknown error"))]
    Api {
        status: u16,
        /// First of `msg`, `message`, `error_description` found in the body.
        message: Option<String>,
        /// The decoded error body, when it was JSON.
        body: Option<JsonValue>,
    },

    /// No response was obtained (DNS, refused connection, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SupabaseError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Human-readable message when one is known.
    ///
    /// Returns `None` for an API error whose body carried none of the known
    /// message fields.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Config(msg) | Self::Http(msg) | Self::Serialization(msg) => Some(msg),
            Self::Api { message, .. } => message.as_deref(),
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl From<serde_json::Error> for SupabaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for SupabaseError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(format!("Invalid URL: {}", e))
    }
}

impl From<reqwest::Error> for SupabaseError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Result alias using SupabaseError.
pub type SupabaseResult<T> = Result<T, SupabaseError>;
