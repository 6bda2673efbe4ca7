use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::EndpointConfig;
use crate::error::{SupabaseError, SupabaseResult};

/// Body fields checked, in order, for a human-readable error message.
const ERROR_MESSAGE_FIELDS: [&str; 3] = ["msg", "message", "error_description"];

/// HTTP methods the executor can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The most recent HTTP exchange, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Response headers (lowercased names).
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Single funnel for every HTTP call.
///
/// Owns the outbound header set and the last-error state of one logical
/// session. Headers persist across calls until overwritten or removed, and a
/// successful call does not clear a previously stored error.
///
/// # Example
/// ```ignore
/// use supabase_rest_core::{EndpointConfig, HttpMethod, RequestExecutor};
///
/// let endpoint = EndpointConfig::new("https://xyz.supabase.co/rest/v1", "anon-key")?;
/// let mut executor = RequestExecutor::new(endpoint)?;
/// let uri = executor.uri("cities?select=*");
/// let rows = executor.execute(HttpMethod::Get, &uri, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
    endpoint: EndpointConfig,
    headers: HeaderMap,
    last_error: Option<String>,
    last_response: Option<RawResponse>,
}

impl RequestExecutor {
    /// Create an executor with its own HTTP client and no timeout.
    pub fn new(endpoint: EndpointConfig) -> SupabaseResult<Self> {
        Self::with_timeout(endpoint, None)
    }

    /// Create an executor whose transport gives up after `timeout`.
    pub fn with_timeout(endpoint: EndpointConfig, timeout: Option<Duration>) -> SupabaseResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SupabaseError::config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_http_client(http, endpoint)
    }

    /// Create an executor sharing an existing HTTP client (and its connection pool).
    pub fn with_http_client(http: reqwest::Client, endpoint: EndpointConfig) -> SupabaseResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(endpoint.api_key())
                .map_err(|e| SupabaseError::config(format!("Invalid API key header: {}", e)))?,
        );

        Ok(Self {
            http,
            endpoint,
            headers,
            last_error: None,
            last_response: None,
        })
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Full URI for an endpoint suffix.
    pub fn uri(&self, endpoint: &str) -> String {
        self.endpoint.uri(endpoint)
    }

    // ─── Header Set ───────────────────────────────────────────

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> SupabaseResult<()> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Set a header only if the caller has not set it already.
    pub fn set_header_if_absent(&mut self, name: &str, value: &str) -> SupabaseResult<()> {
        let (name, value) = parse_header(name, value)?;
        self.headers.entry(name).or_insert(value);
        Ok(())
    }

    /// Remove a header. Returns whether it was present.
    pub fn remove_header(&mut self, name: &str) -> bool {
        self.headers.remove(name).is_some()
    }

    /// Current value of a header (case-insensitive lookup).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set `Authorization: Bearer <token>` for subsequent calls.
    pub fn set_bearer_token(&mut self, token: &str) -> SupabaseResult<()> {
        self.set_header(AUTHORIZATION.as_str(), &format!("Bearer {}", token))
    }

    // ─── Error State ──────────────────────────────────────────

    /// Message of the last failed call, if one was extracted.
    ///
    /// Not cleared by successful calls. An empty value does not mean the
    /// last call succeeded; check the call's own result.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Store the message of `err` as the last error and hand `err` back.
    ///
    /// For failures raised before a request is sent, such as a record
    /// that cannot be encoded. An error without a message leaves the stored
    /// error as it was.
    pub fn record_error(&mut self, err: SupabaseError) -> SupabaseError {
        if let Some(msg) = err.message() {
            self.last_error = Some(msg.to_string());
        }
        err
    }

    /// The most recent response that reached us.
    pub fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    // ─── Execute ──────────────────────────────────────────────

    /// Perform one HTTP call and decode the JSON response.
    ///
    /// Statuses below 400 return the decoded body as-is (object, array or
    /// scalar; an empty body is `Null`). Every failure updates the error
    /// state and is then returned.
    pub async fn execute(
        &mut self,
        method: HttpMethod,
        uri: &str,
        body: Option<JsonValue>,
    ) -> SupabaseResult<JsonValue> {
        debug!(method = %method, uri = %uri, "Executing request");

        let mut request = self
            .http
            .request(method.into(), uri)
            .headers(self.headers.clone());

        if let Some(body) = body {
            let bytes = serde_json::to_vec(&body).map_err(|e| self.record_error(e.into()))?;
            request = request.body(bytes);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Err(self.transport_failure(e)),
        };

        let status = response.status().as_u16();
        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return Err(self.transport_failure(e)),
        };

        self.last_response = Some(RawResponse {
            status,
            headers: resp_headers,
            body: text.clone(),
        });

        if status >= 400 {
            return Err(self.api_failure(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            self.record_error(SupabaseError::serialization(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }

    fn transport_failure(&mut self, e: reqwest::Error) -> SupabaseError {
        let message = e.to_string();
        debug!(error = %message, "Transport failure");
        self.record_error(SupabaseError::Http(message))
    }

    fn api_failure(&mut self, status: u16, text: &str) -> SupabaseError {
        let body = serde_json::from_str::<JsonValue>(text).ok();
        let message = body.as_ref().and_then(error_message);

        debug!(status, message = ?message, "API error response");

        // Without a known message field the stored error stays as it was.
        if let Some(ref msg) = message {
            self.last_error = Some(msg.clone());
        }

        SupabaseError::Api {
            status,
            message,
            body,
        }
    }
}

/// Extract the first of `msg`, `message`, `error_description` from an error body.
pub fn error_message(body: &JsonValue) -> Option<String> {
    ERROR_MESSAGE_FIELDS.iter().find_map(|field| match body.get(field) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

fn parse_header(name: &str, value: &str) -> SupabaseResult<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| SupabaseError::config(format!("Invalid header name '{}': {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| SupabaseError::config(format!("Invalid header value for '{}': {}", name, e)))?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn executor() -> RequestExecutor {
        let endpoint = EndpointConfig::new("https://example.supabase.co/rest/v1", "test-key").unwrap();
        RequestExecutor::new(endpoint).unwrap()
    }

    #[test]
    fn default_headers_are_seeded() {
        let ex = executor();
        assert_eq!(ex.header("Content-Type"), Some("application/json"));
        assert_eq!(ex.header("apikey"), Some("test-key"));
        assert!(ex.header("Authorization").is_none());
    }

    #[test]
    fn set_header_is_last_write_wins_and_case_insensitive() {
        let mut ex = executor();
        ex.set_header("Prefer", "return=minimal").unwrap();
        ex.set_header("prefer", "return=representation").unwrap();
        assert_eq!(ex.header("PREFER"), Some("return=representation"));
        assert_eq!(ex.headers().get_all("prefer").iter().count(), 1);
    }

    #[test]
    fn set_header_if_absent_keeps_caller_value() {
        let mut ex = executor();
        ex.set_header("Prefer", "return=minimal").unwrap();
        ex.set_header_if_absent("Prefer", "return=representation").unwrap();
        assert_eq!(ex.header("Prefer"), Some("return=minimal"));

        ex.remove_header("Prefer");
        ex.set_header_if_absent("Prefer", "return=representation").unwrap();
        assert_eq!(ex.header("Prefer"), Some("return=representation"));
    }

    #[test]
    fn invalid_header_is_config_error() {
        let mut ex = executor();
        assert!(ex.set_header("bad header", "x").unwrap_err().is_config());
        assert!(ex.set_header("X-Ok", "line\nbreak").unwrap_err().is_config());
    }

    #[test]
    fn bearer_token_header() {
        let mut ex = executor();
        ex.set_bearer_token("abc").unwrap();
        assert_eq!(ex.header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn record_error_stores_message_and_returns_error() {
        let mut ex = executor();
        let err = ex.record_error(SupabaseError::serialization("key must be a string"));
        assert!(matches!(err, SupabaseError::Serialization(_)));
        assert_eq!(ex.last_error(), Some("key must be a string"));

        ex.record_error(SupabaseError::Api {
            status: 500,
            message: None,
            body: None,
        });
        assert_eq!(ex.last_error(), Some("key must be a string"));
    }

    #[test]
    fn error_message_field_priority() {
        let body = json!({"message": "second", "msg": "first", "error_description": "third"});
        assert_eq!(error_message(&body).as_deref(), Some("first"));

        let body = json!({"error_description": "third", "message": "second"});
        assert_eq!(error_message(&body).as_deref(), Some("second"));

        let body = json!({"error": "invalid_grant", "error_description": "Invalid login credentials"});
        assert_eq!(error_message(&body).as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn error_message_absent_fields() {
        assert!(error_message(&json!({"code": "PGRST116", "hint": null})).is_none());
        assert!(error_message(&json!([1, 2])).is_none());
        assert!(error_message(&json!({"msg": null})).is_none());
    }

    #[test]
    fn http_method_display() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
    }
}
