use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use supabase_rest_core::{HttpMethod, RequestExecutor, SupabaseConfig, SupabaseResult};

use crate::types::{Session, User, AUTHENTICATED_AUDIENCE};

/// HTTP client for the GoTrue auth API at `/auth/v1/...`.
///
/// Every call goes through the client's own [`RequestExecutor`]. The decoded
/// response of the last user-management call is kept in [`data`](Self::data).
///
/// # Example
/// ```ignore
/// use supabase_rest_auth::AuthClient;
///
/// let mut auth = AuthClient::new("https://your-project.supabase.co", "your-anon-key")?;
/// let session = auth.sign_in_with_email("user@example.com", "password").await?;
/// let user = auth.get_user(&session.access_token).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    executor: RequestExecutor,
    data: JsonValue,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// `supabase_url` is the project URL (e.g., `https://your-project.supabase.co`).
    /// `api_key` is the Supabase anon key, sent as the `apikey` header.
    pub fn new(supabase_url: &str, api_key: &str) -> SupabaseResult<Self> {
        let endpoint = SupabaseConfig::new(supabase_url, api_key).auth_endpoint()?;
        Ok(Self::from_executor(RequestExecutor::new(endpoint)?))
    }

    /// Wrap an executor already bound to the auth API.
    pub fn from_executor(executor: RequestExecutor) -> Self {
        Self {
            executor,
            data: JsonValue::Null,
        }
    }

    /// Base URL for the auth API.
    pub fn base_url(&self) -> &str {
        self.executor.endpoint().base_url()
    }

    /// Decoded response of the last successful sign-up, sign-in, refresh,
    /// OTP or recovery call. `logout`, `get_user` and `is_authenticated`
    /// leave it untouched.
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// Message of the last failed call.
    pub fn error(&self) -> Option<&str> {
        self.executor.last_error()
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut RequestExecutor {
        &mut self.executor
    }

    // ─── Sign Up ───────────────────────────────────────────────

    /// Sign up a new user with email and password.
    pub async fn sign_up_with_email(&mut self, email: &str, password: &str) -> SupabaseResult<JsonValue> {
        self.post("signup", json!({ "email": email, "password": password }))
            .await
    }

    /// Sign up a new user with phone and password.
    pub async fn sign_up_with_phone(&mut self, phone: &str, password: &str) -> SupabaseResult<JsonValue> {
        self.post("signup", json!({ "phone": phone, "password": password }))
            .await
    }

    // ─── Sign In ───────────────────────────────────────────────

    /// Sign in with email and password.
    pub async fn sign_in_with_email(&mut self, email: &str, password: &str) -> SupabaseResult<Session> {
        let data = self
            .post(
                "token?grant_type=password",
                json!({ "email": email, "password": password }),
            )
            .await?;
        decode(data)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&mut self, refresh_token: &str) -> SupabaseResult<Session> {
        let data = self
            .post(
                "token?grant_type=refresh_token",
                json!({ "refresh_token": refresh_token }),
            )
            .await?;
        decode(data)
    }

    /// Send a magic link to an email address.
    pub async fn sign_in_with_magic_link(&mut self, email: &str) -> SupabaseResult<JsonValue> {
        self.post("magiclink", json!({ "email": email })).await
    }

    /// Send a one-time password by SMS.
    pub async fn sign_in_with_sms_otp(&mut self, phone: &str) -> SupabaseResult<JsonValue> {
        self.post("otp", json!({ "phone": phone })).await
    }

    /// Send a password recovery email.
    pub async fn recover_password(&mut self, email: &str) -> SupabaseResult<JsonValue> {
        self.post("recover", json!({ "email": email })).await
    }

    // ─── Session ───────────────────────────────────────────────

    /// Revoke the session behind `access_token`.
    ///
    /// The bearer token stays on this client's headers afterwards.
    pub async fn logout(&mut self, access_token: &str) -> SupabaseResult<JsonValue> {
        self.executor.set_bearer_token(access_token)?;
        self.send(HttpMethod::Post, "logout", None).await
    }

    /// Fetch the user behind `access_token`.
    pub async fn get_user(&mut self, access_token: &str) -> SupabaseResult<User> {
        let data = self.fetch_user(access_token).await?;
        decode(data)
    }

    /// Whether `access_token` belongs to an authenticated user.
    pub async fn is_authenticated(&mut self, access_token: &str) -> SupabaseResult<bool> {
        let data = self.fetch_user(access_token).await?;
        Ok(data.get("aud").and_then(JsonValue::as_str) == Some(AUTHENTICATED_AUDIENCE))
    }

    async fn fetch_user(&mut self, access_token: &str) -> SupabaseResult<JsonValue> {
        self.executor.set_bearer_token(access_token)?;
        self.send(HttpMethod::Get, "user", None).await
    }

    // ─── Helpers ───────────────────────────────────────────────

    async fn post(&mut self, endpoint: &str, body: JsonValue) -> SupabaseResult<JsonValue> {
        let data = self.send(HttpMethod::Post, endpoint, Some(body)).await?;
        self.data = data.clone();
        Ok(data)
    }

    async fn send(
        &mut self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<JsonValue>,
    ) -> SupabaseResult<JsonValue> {
        debug!(endpoint, "Auth request");
        let uri = self.executor.uri(endpoint);
        self.executor.execute(method, &uri, body).await
    }
}

fn decode<T: DeserializeOwned>(data: JsonValue) -> SupabaseResult<T> {
    Ok(serde_json::from_value(data)?)
}
