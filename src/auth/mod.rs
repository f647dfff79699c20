//! Session lifecycle: login, logout, proactive token refresh and sign-up.
//!
//! Tokens live in the [`SessionStore`] together with an absolute expiry
//! (`now + expiresIn`). A session whose expiry is missing or in the past is
//! unauthenticated regardless of what token strings are stored. This is a
//! convenience layer, not a security boundary.

pub mod validation;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{RegisterRequest, TokenResponse, User};
use crate::session::{now_ms, Session, SessionStore, DEFAULT_TOKEN_TYPE};

/// Refresh when the access token expires within this window
pub const REFRESH_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Backend calls the auth service depends on
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, login_id: &str, password: &str) -> ApiResult<TokenResponse>;
    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenResponse>;
    async fn me(&self) -> ApiResult<User>;
    async fn register(&self, request: &RegisterRequest) -> ApiResult<()>;
    async fn check_login_id(&self, login_id: &str) -> ApiResult<bool>;
    async fn check_nickname(&self, nickname: &str) -> ApiResult<bool>;
    async fn send_email_code(&self, email: &str) -> ApiResult<()>;
    async fn verify_email_code(&self, email: &str, code: &str) -> ApiResult<()>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, login_id: &str, password: &str) -> ApiResult<TokenResponse> {
        ApiClient::login(self, login_id, password).await
    }

    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenResponse> {
        ApiClient::refresh(self, refresh_token).await
    }

    async fn me(&self) -> ApiResult<User> {
        ApiClient::me(self).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        ApiClient::register(self, request).await
    }

    async fn check_login_id(&self, login_id: &str) -> ApiResult<bool> {
        ApiClient::check_login_id(self, login_id).await
    }

    async fn check_nickname(&self, nickname: &str) -> ApiResult<bool> {
        ApiClient::check_nickname(self, nickname).await
    }

    async fn send_email_code(&self, email: &str) -> ApiResult<()> {
        ApiClient::send_email_code(self, email).await
    }

    async fn verify_email_code(&self, email: &str, code: &str) -> ApiResult<()> {
        ApiClient::verify_email_code(self, email, code).await
    }
}

/// What [`AuthService::check_and_refresh_token`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No stored session
    NoSession,
    /// Token is valid for longer than the refresh window
    StillValid,
    /// A new token was obtained and stored
    Refreshed,
}

#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    session: SessionStore,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, session: SessionStore) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Log in and persist tokens, absolute expiry and the user snapshot
    pub async fn login(&self, login_id: &str, password: &str) -> ApiResult<User> {
        if login_id.trim().is_empty() {
            return Err(ApiError::validation("loginId", "Login ID is required"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password", "Password is required"));
        }

        let grant = self.backend.login(login_id, password).await?;
        let session = session_from_grant(grant, None, now_ms());
        self.session.save(&session)?;

        let user = match session.cached_user {
            Some(user) => user,
            None => match self.backend.me().await {
                Ok(user) => {
                    self.session.set_cached_user(&user)?;
                    user
                }
                Err(err) => {
                    warn!(error = %err, "Fetching the signed-in user failed, clearing session");
                    self.session.clear()?;
                    return Err(err);
                }
            },
        };

        info!(user_id = user.id, login_id = %user.login_id, "Logged in");
        Ok(user)
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(now_ms())
    }

    /// True only if a token exists and its absolute expiry is after `now_ms`
    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        self.session
            .load()
            .map(|s| s.is_valid_at(now_ms))
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }
        self.session.cached_user()
    }

    /// Refetch the user snapshot; failures keep the old snapshot
    pub async fn refresh_user(&self) -> ApiResult<User> {
        let user = self.backend.me().await?;
        self.session.set_cached_user(&user)?;
        Ok(user)
    }

    /// Refresh the token if it expires within [`REFRESH_WINDOW_MS`].
    ///
    /// A single refresh is attempted. If it fails, or no refresh token is
    /// stored, the session is cleared and the error is returned.
    pub async fn check_and_refresh_token(&self) -> ApiResult<RefreshOutcome> {
        self.check_and_refresh_token_at(now_ms()).await
    }

    pub async fn check_and_refresh_token_at(&self, now_ms: i64) -> ApiResult<RefreshOutcome> {
        let Some(session) = self.session.load() else {
            return Ok(RefreshOutcome::NoSession);
        };

        let remaining = session.remaining_ms(now_ms).unwrap_or(i64::MIN);
        if remaining > REFRESH_WINDOW_MS {
            debug!(remaining_ms = remaining, "Token still valid");
            return Ok(RefreshOutcome::StillValid);
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            warn!("Token near expiry and no refresh token stored");
            self.logout()?;
            return Err(ApiError::NotAuthenticated);
        };

        match self.backend.refresh(&refresh_token).await {
            Ok(grant) => {
                let mut refreshed = session_from_grant(grant, session.cached_user, now_ms);
                if refreshed.refresh_token.is_none() {
                    refreshed.refresh_token = Some(refresh_token);
                }
                self.session.save(&refreshed)?;
                info!("Access token refreshed");
                Ok(RefreshOutcome::Refreshed)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, logging out");
                self.logout()?;
                Err(err)
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        validation::validate_login_id(&request.login_id)?;
        validation::validate_password(&request.password)?;
        validation::validate_nickname(&request.nickname)?;
        validation::validate_email(&request.email)?;
        self.backend.register(request).await?;
        info!(login_id = %request.login_id, "Registered new account");
        Ok(())
    }

    pub async fn check_login_id(&self, login_id: &str) -> ApiResult<bool> {
        validation::validate_login_id(login_id)?;
        self.backend.check_login_id(login_id).await
    }

    pub async fn check_nickname(&self, nickname: &str) -> ApiResult<bool> {
        validation::validate_nickname(nickname)?;
        self.backend.check_nickname(nickname.trim()).await
    }

    pub async fn send_email_code(&self, email: &str) -> ApiResult<()> {
        validation::validate_email(email)?;
        self.backend.send_email_code(email).await
    }

    pub async fn verify_email_code(&self, email: &str, code: &str) -> ApiResult<()> {
        validation::validate_email(email)?;
        validation::validate_verify_code(code)?;
        self.backend.verify_email_code(email, code).await
    }
}

fn session_from_grant(grant: TokenResponse, previous_user: Option<User>, now_ms: i64) -> Session {
    Session {
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
        token_type: grant
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
        expires_at_epoch_ms: Some(now_ms.saturating_add(grant.expires_in.saturating_mul(1000))),
        cached_user: grant.user.or(previous_user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Role;
    use parking_lot::Mutex;

    fn alice() -> User {
        User {
            id: 1,
            login_id: "alice".into(),
            nickname: "Alice".into(),
            email: "alice@example.com".into(),
            role: Role::User,
        }
    }

    fn grant(token: &str, expires_in: i64, with_user: bool) -> TokenResponse {
        TokenResponse {
            access_token: token.into(),
            refresh_token: Some(format!("{}-refresh", token)),
            token_type: None,
            expires_in,
            user: with_user.then(alice),
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        refresh_fails: bool,
        login_includes_user: bool,
        me_fails: bool,
        refresh_calls: Mutex<u32>,
        me_calls: Mutex<u32>,
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn login(&self, login_id: &str, password: &str) -> ApiResult<TokenResponse> {
            if login_id == "alice" && password == "secret123" {
                Ok(grant("first", 3600, self.login_includes_user))
            } else {
                Err(ApiError::from_response(
                    reqwest::StatusCode::UNAUTHORIZED,
                    r#"{"message":"Invalid credentials"}"#,
                ))
            }
        }

        async fn refresh(&self, _refresh_token: &str) -> ApiResult<TokenResponse> {
            *self.refresh_calls.lock() += 1;
            if self.refresh_fails {
                Err(ApiError::Network("connection reset".into()))
            } else {
                let mut g = grant("second", 3600, false);
                g.refresh_token = None;
                Ok(g)
            }
        }

        async fn me(&self) -> ApiResult<User> {
            *self.me_calls.lock() += 1;
            if self.me_fails {
                return Err(ApiError::Network("connection reset".into()));
            }
            Ok(alice())
        }

        async fn register(&self, _request: &RegisterRequest) -> ApiResult<()> {
            Ok(())
        }

        async fn check_login_id(&self, login_id: &str) -> ApiResult<bool> {
            Ok(login_id != "alice")
        }

        async fn check_nickname(&self, nickname: &str) -> ApiResult<bool> {
            Ok(nickname != "Alice")
        }

        async fn send_email_code(&self, _email: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn verify_email_code(&self, _email: &str, code: &str) -> ApiResult<()> {
            if code == "123456" {
                Ok(())
            } else {
                Err(ApiError::from_response(reqwest::StatusCode::BAD_REQUEST, ""))
            }
        }
    }

    fn service(backend: FakeBackend) -> (AuthService, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let service = AuthService::new(backend.clone(), SessionStore::in_memory());
        (service, backend)
    }

    fn store_session(service: &AuthService, expires_at: Option<i64>, refresh: Option<&str>) {
        service
            .session()
            .save(&Session {
                access_token: "stored".into(),
                refresh_token: refresh.map(str::to_string),
                token_type: "Bearer".into(),
                expires_at_epoch_ms: expires_at,
                cached_user: Some(alice()),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_persists_absolute_expiry() {
        let (service, backend) = service(FakeBackend {
            login_includes_user: true,
            ..Default::default()
        });

        let before = now_ms();
        let user = service.login("alice", "secret123").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(*backend.me_calls.lock(), 0);

        let session = service.session().load().unwrap();
        assert_eq!(session.token_type, "Bearer");
        let expires = session.expires_at_epoch_ms.unwrap();
        assert!(expires >= before + 3_600_000);
        assert!(service.is_authenticated());
        assert_eq!(service.current_user(), Some(alice()));
    }

    #[tokio::test]
    async fn test_login_fetches_user_when_missing() {
        let (service, backend) = service(FakeBackend::default());
        service.login("alice", "secret123").await.unwrap();
        assert_eq!(*backend.me_calls.lock(), 1);
        assert_eq!(service.session().cached_user(), Some(alice()));
    }

    #[tokio::test]
    async fn test_login_failure_keeps_no_session() {
        let (service, _) = service(FakeBackend::default());
        let err = service.login("alice", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(service.session().load().is_none());

        let err = service.login("", "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_login_clears_session_when_user_fetch_fails() {
        let (service, backend) = service(FakeBackend {
            me_fails: true,
            ..Default::default()
        });

        let err = service.login("alice", "secret123").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(*backend.me_calls.lock(), 1);
        assert!(service.session().load().is_none());
        assert!(!service.is_authenticated());
        assert!(service.current_user().is_none());
    }

    #[test]
    fn test_session_expiry_saturates_on_huge_expires_in() {
        let session = session_from_grant(grant("big", i64::MAX, false), None, now_ms());
        assert_eq!(session.expires_at_epoch_ms, Some(i64::MAX));
    }

    #[test]
    fn test_is_authenticated_at_boundaries() {
        let (service, _) = service(FakeBackend::default());
        assert!(!service.is_authenticated_at(1_000));

        store_session(&service, Some(1_000), None);
        assert!(service.is_authenticated_at(999));
        assert!(!service.is_authenticated_at(1_000));
        assert!(!service.is_authenticated_at(1_001));

        store_session(&service, None, None);
        assert!(!service.is_authenticated_at(0));
    }

    #[tokio::test]
    async fn test_refresh_skipped_when_far_from_expiry() {
        let (service, backend) = service(FakeBackend::default());
        let now = 10_000_000;
        store_session(&service, Some(now + REFRESH_WINDOW_MS + 1), Some("r"));

        let outcome = service.check_and_refresh_token_at(now).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::StillValid);
        assert_eq!(*backend.refresh_calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_refresh_within_window() {
        let (service, backend) = service(FakeBackend::default());
        let now = now_ms();
        store_session(&service, Some(now + 60_000), Some("r"));

        let outcome = service.check_and_refresh_token_at(now).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(*backend.refresh_calls.lock(), 1);

        let session = service.session().load().unwrap();
        assert_eq!(session.access_token, "second");
        // Refresh token kept when the grant omits one
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
        assert_eq!(session.cached_user, Some(alice()));
        assert_eq!(session.expires_at_epoch_ms, Some(now + 3_600_000));
    }

    #[tokio::test]
    async fn test_refresh_failure_logs_out() {
        let (service, backend) = service(FakeBackend {
            refresh_fails: true,
            ..Default::default()
        });
        let now = now_ms();
        store_session(&service, Some(now + 1_000), Some("r"));

        let err = service.check_and_refresh_token_at(now).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(*backend.refresh_calls.lock(), 1);
        assert!(service.session().load().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_logs_out() {
        let (service, _) = service(FakeBackend::default());
        store_session(&service, Some(now_ms() + 1_000), None);

        let err = service.check_and_refresh_token().await.unwrap_err();
        assert!(err.is_auth());
        assert!(service.session().load().is_none());
    }

    #[tokio::test]
    async fn test_no_session_is_not_an_error() {
        let (service, _) = service(FakeBackend::default());
        let outcome = service.check_and_refresh_token().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::NoSession);
    }

    #[tokio::test]
    async fn test_register_validates_before_request() {
        let (service, _) = service(FakeBackend::default());
        let mut request = RegisterRequest {
            login_id: "newbie".into(),
            password: "password1".into(),
            nickname: "Newbie".into(),
            email: "newbie@example.com".into(),
        };
        assert!(service.register(&request).await.is_ok());

        request.email = "broken".into();
        let err = service.register(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_availability_and_email_checks() {
        let (service, _) = service(FakeBackend::default());
        assert!(!service.check_login_id("alice").await.unwrap());
        assert!(service.check_login_id("bobby").await.unwrap());
        assert!(!service.check_nickname(" Alice ").await.unwrap());
        assert!(service.send_email_code("a@b.io").await.is_ok());
        assert!(service.verify_email_code("a@b.io", "123456").await.is_ok());
        assert!(service.verify_email_code("a@b.io", "000000").await.is_err());
    }
}
