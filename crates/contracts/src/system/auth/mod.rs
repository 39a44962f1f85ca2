//! Identity provider contract and its REST DTOs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::api_error::ServiceError;

/// Credentials are refreshed this long before they actually expire.
pub const EXPIRY_SKEW_MS: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

/// Supplies the signed-in user and short-lived bearer credentials.
#[async_trait(?Send)]
pub trait IdentityProvider {
    fn current_user(&self) -> Option<AuthUser>;

    /// A credential valid for at least a short while, refreshed on demand.
    async fn id_token(&self) -> Result<String, ServiceError>;
}

/// Signed-in session as persisted between page loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: AuthUser,
    pub id_token: String,
    pub refresh_token: String,
    /// Unix milliseconds.
    pub expires_at: i64,
}

impl StoredSession {
    pub fn from_sign_in(response: SignInResponse, now_ms: i64) -> Self {
        Self {
            expires_at: now_ms + expires_in_ms(&response.expires_in),
            user: AuthUser {
                uid: response.local_id,
                email: response.email,
            },
            id_token: response.id_token,
            refresh_token: response.refresh_token,
        }
    }

    pub fn refreshed(&self, response: RefreshTokenResponse, now_ms: i64) -> Self {
        Self {
            user: self.user.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: now_ms + expires_in_ms(&response.expires_in),
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms + EXPIRY_SKEW_MS >= self.expires_at
    }
}

/// `expiresIn` arrives as a string of seconds. Unparseable values expire at once.
fn expires_in_ms(raw: &str) -> i64 {
    raw.trim().parse::<i64>().map(|s| s * 1000).unwrap_or(0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    pub return_secure_token: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Error envelope of the identity REST API: `{"error": {"message": "..."}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityErrorBody {
    #[serde(default)]
    pub error: Option<IdentityErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityErrorDetail {
    #[serde(default)]
    pub message: String,
}

impl IdentityErrorBody {
    /// Turn codes like `INVALID_PASSWORD` into readable text.
    pub fn describe(body: &str) -> String {
        let code = serde_json::from_str::<IdentityErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .map(|e| e.message)
            .unwrap_or_default();
        match code.split(':').next().unwrap_or_default().trim() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                "Incorrect email or password".to_string()
            }
            "EMAIL_EXISTS" => "An account with this email already exists".to_string(),
            "USER_DISABLED" => "This account has been disabled".to_string(),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later".to_string(),
            "" => "Authentication failed".to_string(),
            other => other.replace('_', " ").to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_in_response() -> SignInResponse {
        serde_json::from_str(
            r#"{"idToken":"tok","refreshToken":"ref","expiresIn":"3600","localId":"u1","email":"a@b.c"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_session_from_sign_in() {
        let session = StoredSession::from_sign_in(sign_in_response(), 1_000);
        assert_eq!(session.user.uid, "u1");
        assert_eq!(session.user.email.as_deref(), Some("a@b.c"));
        assert_eq!(session.expires_at, 1_000 + 3_600_000);
    }

    #[test]
    fn test_expiry_includes_skew() {
        let session = StoredSession::from_sign_in(sign_in_response(), 0);
        assert!(!session.is_expired(0));
        assert!(!session.is_expired(3_600_000 - EXPIRY_SKEW_MS - 1));
        assert!(session.is_expired(3_600_000 - EXPIRY_SKEW_MS));
    }

    #[test]
    fn test_refresh_keeps_user() {
        let session = StoredSession::from_sign_in(sign_in_response(), 0);
        let refreshed = session.refreshed(
            serde_json::from_str(
                r#"{"id_token":"tok2","refresh_token":"ref2","expires_in":"60","user_id":"u1"}"#,
            )
            .unwrap(),
            10_000,
        );
        assert_eq!(refreshed.user, session.user);
        assert_eq!(refreshed.id_token, "tok2");
        assert_eq!(refreshed.expires_at, 70_000);
    }

    #[test]
    fn test_describe_identity_errors() {
        assert_eq!(
            IdentityErrorBody::describe(r#"{"error":{"message":"INVALID_PASSWORD"}}"#),
            "Incorrect email or password"
        );
        assert_eq!(
            IdentityErrorBody::describe(
                r#"{"error":{"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#
            ),
            "weak password"
        );
        assert_eq!(IdentityErrorBody::describe("nope"), "Authentication failed");
    }
}
