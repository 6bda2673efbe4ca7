//! Auth client tests against a mock GoTrue server.
//!
//! Run with: cargo test -p supabase-rest-auth

use serde_json::json;
use supabase_rest_auth::{AuthClient, SupabaseClientAuthExt};
use supabase_rest_core::{SupabaseClient, SupabaseConfig};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth_client(server: &MockServer) -> AuthClient {
    AuthClient::new(&server.uri(), "anon-key").expect("Failed to create AuthClient")
}

fn session_body() -> serde_json::Value {
    json!({
        "access_token": "access-123",
        "refresh_token": "refresh-456",
        "expires_in": 3600,
        "expires_at": 1700000000,
        "token_type": "bearer",
        "user": {"id": "user-1", "aud": "authenticated", "email": "user@example.com"}
    })
}

#[tokio::test]
async fn sign_up_with_email_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(header("apikey", "anon-key"))
        .and(body_json(json!({"email": "user@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let data = auth.sign_up_with_email("user@example.com", "secret").await.unwrap();
    assert_eq!(data["id"], "user-1");
    assert_eq!(auth.data(), &data);
}

#[tokio::test]
async fn sign_up_with_phone_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_json(json!({"phone": "+64210000000", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    auth.sign_up_with_phone("+64210000000", "secret").await.unwrap();
}

#[tokio::test]
async fn sign_in_with_email_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_json(json!({"email": "user@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let session = auth.sign_in_with_email("user@example.com", "secret").await.unwrap();
    assert_eq!(session.access_token, "access-123");
    assert_eq!(session.user.email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn failed_sign_in_stores_error_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let err = auth.sign_in_with_email("user@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(auth.error(), Some("Invalid login credentials"));
}

#[tokio::test]
async fn refresh_session_uses_refresh_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "refresh-456"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let session = auth.refresh_session("refresh-456").await.unwrap();
    assert_eq!(session.refresh_token, "refresh-456");
}

#[tokio::test]
async fn passwordless_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/magiclink"))
        .and(body_json(json!({"email": "user@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .and(body_json(json!({"phone": "+64210000000"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/recover"))
        .and(body_json(json!({"email": "user@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    auth.sign_in_with_magic_link("user@example.com").await.unwrap();
    auth.sign_in_with_sms_otp("+64210000000").await.unwrap();
    auth.recover_password("user@example.com").await.unwrap();
}

#[tokio::test]
async fn logout_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("Authorization", "Bearer access-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let data = auth.logout("access-123").await.unwrap();
    assert!(data.is_null());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn get_user_and_is_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "aud": "authenticated",
            "email": "user@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", "Bearer anon-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-2", "aud": ""})))
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let user = auth.get_user("good-token").await.unwrap();
    assert_eq!(user.id, "user-1");
    assert!(auth.is_authenticated("good-token").await.unwrap());
    assert!(!auth.is_authenticated("anon-token").await.unwrap());
}

#[tokio::test]
async fn user_lookups_and_logout_keep_sign_in_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1", "aud": "authenticated"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    auth.sign_in_with_email("user@example.com", "secret").await.unwrap();
    auth.get_user("access-123").await.unwrap();
    assert!(auth.is_authenticated("access-123").await.unwrap());
    auth.logout("access-123").await.unwrap();

    assert_eq!(auth.data(), &session_body());
}

#[tokio::test]
async fn expired_token_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
        .mount(&server)
        .await;

    let mut auth = auth_client(&server);
    let err = auth.is_authenticated("expired").await.unwrap_err();
    assert!(err.is_api());
    assert_eq!(auth.error(), Some("invalid JWT"));
}

#[tokio::test]
async fn client_extension_builds_auth_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/recover"))
        .and(header("apikey", "service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = SupabaseClient::new(SupabaseConfig::new(server.uri(), "service-key")).unwrap();
    let mut auth = client.auth().unwrap();
    auth.recover_password("user@example.com").await.unwrap();
}
