use std::time::Duration;

use crate::error::{SupabaseError, SupabaseResult};

/// Path of the PostgREST API under the project URL.
pub const REST_PATH: &str = "rest/v1/";
/// Path of the GoTrue auth API under the project URL.
pub const AUTH_PATH: &str = "auth/v1/";

/// Configuration for connecting to a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g. "https://xyz.supabase.co")
    pub supabase_url: String,
    /// Supabase anon/service key, sent as the `apikey` header
    pub api_key: String,
    /// Request timeout applied by the transport. `None` means no timeout.
    pub timeout: Option<Duration>,
}

impl SupabaseConfig {
    /// Create a new config from a project URL and API key.
    pub fn new(supabase_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Build a config from `SUPABASE_URL`, `SUPABASE_KEY` and the optional
    /// `SUPABASE_TIMEOUT_SECS` environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| SupabaseError::config("SUPABASE_URL is not set"))?;
        let key = std::env::var("SUPABASE_KEY")
            .map_err(|_| SupabaseError::config("SUPABASE_KEY is not set"))?;
        let mut config = Self::new(url, key);
        if let Ok(secs) = std::env::var("SUPABASE_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                SupabaseError::config(format!("SUPABASE_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Endpoint for the PostgREST API (`<url>/rest/v1/`).
    pub fn rest_endpoint(&self) -> SupabaseResult<EndpointConfig> {
        self.endpoint(REST_PATH)
    }

    /// Endpoint for the GoTrue auth API (`<url>/auth/v1/`).
    pub fn auth_endpoint(&self) -> SupabaseResult<EndpointConfig> {
        self.endpoint(AUTH_PATH)
    }

    fn endpoint(&self, path: &str) -> SupabaseResult<EndpointConfig> {
        let base = self.supabase_url.trim_end_matches('/');
        EndpointConfig::new(format!("{}/{}", base, path), self.api_key.clone())
    }
}

/// Base URL + API key for one service. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: String,
    api_key: String,
}

impl EndpointConfig {
    /// Create an endpoint config. The base URL always ends with `/`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> SupabaseResult<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        if base_url.trim().is_empty() {
            return Err(SupabaseError::config("base URL must not be empty"));
        }
        if api_key.is_empty() {
            return Err(SupabaseError::config("API key must not be empty"));
        }
        url::Url::parse(&base_url)?;

        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{}/", base_url)
        };
        Ok(Self { base_url, api_key })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Full URI for an endpoint suffix (path plus optional query string).
    pub fn uri(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}
