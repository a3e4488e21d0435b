//! Session credentials for the conversation SDK.
//!
//! Credentials are owned by the host's `CredentialStore`; the core only reads
//! them to decorate requests and to evaluate the authentication gate.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

/// How strongly the current user is authenticated.
///
/// Ordered so that `LoggedIn > Guest`; an action requiring `Guest` is satisfied
/// by either level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationLevel {
    /// Anonymous session issued by the backend.
    #[default]
    Guest,
    /// Registered user signed in through the host's login flow.
    LoggedIn,
}

/// Authentication credentials for the conversation backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Bearer token attached to every outbound request.
    pub access_token: Option<String>,
    /// Token used to obtain a fresh access token.
    pub refresh_token: Option<String>,
    /// Access token expiration as Unix timestamp (seconds since epoch).
    pub expires_at: Option<i64>,
    /// The backend user id, guest or registered.
    pub user_id: Option<String>,
    /// Authentication level of `user_id`.
    #[serde(default)]
    pub level: AuthenticationLevel,
}

impl Credentials {
    /// Create new empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Guest credentials for `user_id` holding `access_token`.
    pub fn guest(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            user_id: Some(user_id.into()),
            level: AuthenticationLevel::Guest,
            ..Default::default()
        }
    }

    /// Logged-in credentials for `user_id` holding `access_token`.
    pub fn logged_in(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            user_id: Some(user_id.into()),
            level: AuthenticationLevel::LoggedIn,
            ..Default::default()
        }
    }

    /// Set the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set the expiration timestamp.
    pub fn with_expires_at(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Fill `expires_at` from the access token's JWT `exp` claim when it is unset.
    pub fn with_jwt_expiry(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.access_token.as_deref().and_then(jwt_expires_at);
        }
        self
    }

    /// Check if the credentials have an access token.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Check if the token is expired.
    ///
    /// A token without a known expiration is treated as live; the backend's
    /// unauthenticated response is the authority in that case.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// Check if the credentials are usable (has token and not expired).
    pub fn is_valid(&self) -> bool {
        self.has_token() && !self.is_expired()
    }

    /// Check if these credentials satisfy `required`.
    pub fn meets(&self, required: AuthenticationLevel) -> bool {
        self.is_valid() && self.level >= required
    }

    /// Valid credentials of a registered, signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.meets(AuthenticationLevel::LoggedIn)
    }

    /// `Authorization` header value, if a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }

    /// Same credentials without the access token.
    ///
    /// Identity (user id, level, refresh token) survives so that a later
    /// refresh or login can restore the session.
    pub fn without_access_token(&self) -> Self {
        Self {
            access_token: None,
            expires_at: None,
            ..self.clone()
        }
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Extract the `exp` claim of a JWT access token.
///
/// Returns `None` if the token is not a decodable JWT.
pub fn jwt_expires_at(access_token: &str) -> Option<i64> {
    let payload = access_token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&decoded).ok()?;
    Some(claims.exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_credentials_default() {
        let creds = Credentials::default();
        assert!(creds.access_token.is_none());
        assert!(creds.refresh_token.is_none());
        assert!(creds.expires_at.is_none());
        assert!(creds.user_id.is_none());
        assert_eq!(creds.level, AuthenticationLevel::Guest);
    }

    #[test]
    fn test_credentials_has_token() {
        let mut creds = Credentials::new();
        assert!(!creds.has_token());

        creds.access_token = Some("test-token".to_string());
        assert!(creds.has_token());
    }

    #[test]
    fn test_is_expired_without_expiration_is_live() {
        let creds = Credentials::guest("u1", "token");
        assert!(!creds.is_expired());
        assert!(creds.is_valid());
    }

    #[test]
    fn test_is_expired_past_and_future() {
        let past = Credentials::guest("u1", "token").with_expires_at(0);
        assert!(past.is_expired());
        assert!(!past.is_valid());

        let future =
            Credentials::guest("u1", "token").with_expires_at(chrono::Utc::now().timestamp() + 3600);
        assert!(!future.is_expired());
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(AuthenticationLevel::LoggedIn > AuthenticationLevel::Guest);

        let guest = Credentials::guest("u1", "token");
        assert!(guest.meets(AuthenticationLevel::Guest));
        assert!(!guest.meets(AuthenticationLevel::LoggedIn));
        assert!(!guest.is_authenticated());

        let user = Credentials::logged_in("u1", "token");
        assert!(user.meets(AuthenticationLevel::Guest));
        assert!(user.is_authenticated());
    }

    #[test]
    fn test_expired_logged_in_is_not_authenticated() {
        let creds = Credentials::logged_in("u1", "token").with_expires_at(0);
        assert!(!creds.is_authenticated());
    }

    #[test]
    fn test_bearer() {
        assert_eq!(Credentials::new().bearer(), None);
        assert_eq!(
            Credentials::guest("u1", "abc").bearer(),
            Some("Bearer abc".to_string())
        );
    }

    #[test]
    fn test_without_access_token_keeps_identity() {
        let creds = Credentials::logged_in("u1", "abc")
            .with_refresh_token("r1")
            .with_expires_at(42);
        let stripped = creds.without_access_token();

        assert!(stripped.access_token.is_none());
        assert!(stripped.expires_at.is_none());
        assert_eq!(stripped.user_id.as_deref(), Some("u1"));
        assert_eq!(stripped.refresh_token.as_deref(), Some("r1"));
        assert_eq!(stripped.level, AuthenticationLevel::LoggedIn);
    }

    #[test]
    fn test_jwt_expiry_extraction() {
        let token = jwt_with_exp(1_900_000_000);
        assert_eq!(jwt_expires_at(&token), Some(1_900_000_000));
        assert_eq!(jwt_expires_at("not-a-jwt"), None);
        assert_eq!(jwt_expires_at("a.!!!.c"), None);

        let creds = Credentials::guest("u1", token).with_jwt_expiry();
        assert_eq!(creds.expires_at, Some(1_900_000_000));
    }

    #[test]
    fn test_jwt_expiry_does_not_override_explicit() {
        let creds = Credentials::guest("u1", jwt_with_exp(1_900_000_000))
            .with_expires_at(7)
            .with_jwt_expiry();
        assert_eq!(creds.expires_at, Some(7));
    }

    #[test]
    fn test_credentials_serialization() {
        let creds = Credentials::logged_in("user-id", "token")
            .with_refresh_token("refresh")
            .with_expires_at(1234567890);

        let json = serde_json::to_string(&creds).unwrap();
        assert!(json.contains(r#""level":"logged_in""#));
        let deserialized: Credentials = serde_json::from_str(&json).unwrap();
        assert_eq!(creds, deserialized);
    }

    #[test]
    fn test_missing_level_defaults_to_guest() {
        let json = r#"{
            "access_token": "old-token",
            "refresh_token": null,
            "expires_at": null,
            "user_id": "old-user"
        }"#;

        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.level, AuthenticationLevel::Guest);
        assert_eq!(creds.user_id.as_deref(), Some("old-user"));
    }
}
