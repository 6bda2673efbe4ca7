use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Audience GoTrue assigns to signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// A user session returned from password sign-in or token refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: User,
}

/// A GoTrue user object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phone_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Option<JsonValue>,
    #[serde(default)]
    pub app_metadata: Option<JsonValue>,
}

impl User {
    /// Whether GoTrue marked this user as signed in.
    pub fn is_authenticated(&self) -> bool {
        self.aud.as_deref() == Some(AUTHENTICATED_AUDIENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_deserializes_minimal_payload() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "u1", "aud": "authenticated", "email": "a@b.c"}
        }))
        .unwrap();
        assert_eq!(session.access_token, "at");
        assert!(session.expires_at.is_none());
        assert!(session.user.is_authenticated());
    }

    #[test]
    fn user_timestamps_parse() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "created_at": "2024-01-15T10:30:00Z"
        }))
        .unwrap();
        assert!(user.created_at.is_some());
        assert!(!user.is_authenticated());
    }
}
