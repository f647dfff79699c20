//! User and session models.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Seen on the wire: "ADMIN", "ROLE_ADMIN", "admin"
        let raw = String::deserialize(deserializer)?;
        if raw.to_ascii_lowercase().contains("admin") {
            Ok(Role::Admin)
        } else {
            Ok(Role::User)
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub login_id: String,
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Minimal user reference used in message threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token grant returned by login and refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub login_id: String,
    pub password: String,
    pub nickname: String,
    pub email: String,
}

/// Result of a login-id or nickname availability check
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    #[serde(alias = "isAvailable")]
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct EmailCodeRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct EmailVerifyRequest {
    pub email: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_variants() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"loginId":"alice","nickname":"Alice","email":"a@x.io","role":"ROLE_ADMIN"}"#,
        )
        .unwrap();
        assert!(user.is_admin());

        let user: User =
            serde_json::from_str(r#"{"id":2,"loginId":"bob","nickname":"Bob","role":"member"}"#)
                .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_token_response_optional_fields() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"accessToken":"abc","expiresIn":3600}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_none());
        assert!(token.user.is_none());
    }
}
