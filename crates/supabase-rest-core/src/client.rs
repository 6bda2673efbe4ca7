use std::sync::Arc;

use crate::config::SupabaseConfig;
use crate::error::{SupabaseError, SupabaseResult};
use crate::executor::RequestExecutor;

/// The main client for a Supabase project.
///
/// Holds the configuration and a shared HTTP client. Every accessor created
/// from it gets its own [`RequestExecutor`] (its own header set and error
/// state) while sharing the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: Arc<SupabaseConfig>,
}

impl SupabaseClient {
    /// Create a new client from a configuration.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        // Validate both endpoints up front so misconfiguration surfaces here.
        config.rest_endpoint()?;
        config.auth_endpoint()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SupabaseError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Get the full config.
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Get the project URL.
    pub fn supabase_url(&self) -> &str {
        &self.config.supabase_url
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// A fresh executor bound to the PostgREST API.
    pub fn rest_executor(&self) -> SupabaseResult<RequestExecutor> {
        RequestExecutor::with_http_client(self.http.clone(), self.config.rest_endpoint()?)
    }

    /// A fresh executor bound to the GoTrue auth API.
    pub fn auth_executor(&self) -> SupabaseResult<RequestExecutor> {
        RequestExecutor::with_http_client(self.http.clone(), self.config.auth_endpoint()?)
    }
}
