//! Local session: tokens, absolute expiry and the cached user snapshot.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiResult;
use crate::models::User;

const KEY_ACCESS_TOKEN: &str = "accessToken";
const KEY_REFRESH_TOKEN: &str = "refreshToken";
const KEY_TOKEN_TYPE: &str = "tokenType";
const KEY_EXPIRES_AT: &str = "expiresAt";
const KEY_USER: &str = "user";

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at_epoch_ms: Option<i64>,
    pub cached_user: Option<User>,
}

impl Session {
    /// A session counts as authenticated only with a token and a future expiry
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.access_token.is_empty()
            && matches!(self.expires_at_epoch_ms, Some(exp) if exp > now_ms)
    }

    /// Milliseconds until expiry, negative once expired
    pub fn remaining_ms(&self, now_ms: i64) -> Option<i64> {
        self.expires_at_epoch_ms.map(|exp| exp - now_ms)
    }

    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Typed view over the key-value store
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Store every field of `session`.
    ///
    /// If any write fails the previously stored session is put back, so a
    /// failed save never leaves a mix of old and new fields.
    pub fn save(&self, session: &Session) -> ApiResult<()> {
        let previous = self.load();
        if let Err(err) = self.write_all(session) {
            let restored = match &previous {
                Some(old) => self.write_all(old),
                None => self.clear(),
            };
            if let Err(e) = restored {
                warn!(error = %e, "Could not restore previous session after a failed save");
            }
            return Err(err);
        }
        Ok(())
    }

    fn write_all(&self, session: &Session) -> ApiResult<()> {
        self.store.set(KEY_ACCESS_TOKEN, &session.access_token)?;
        match &session.refresh_token {
            Some(token) => self.store.set(KEY_REFRESH_TOKEN, token)?,
            None => self.store.remove(KEY_REFRESH_TOKEN)?,
        }
        self.store.set(KEY_TOKEN_TYPE, &session.token_type)?;
        match session.expires_at_epoch_ms {
            Some(exp) => self.store.set(KEY_EXPIRES_AT, &exp.to_string())?,
            None => self.store.remove(KEY_EXPIRES_AT)?,
        }
        match &session.cached_user {
            Some(user) => self.set_cached_user(user)?,
            None => self.store.remove(KEY_USER)?,
        }
        Ok(())
    }

    /// Read the stored session, if an access token exists.
    ///
    /// This does not check expiry; see [`Session::is_valid_at`].
    pub fn load(&self) -> Option<Session> {
        let access_token = self.store.get(KEY_ACCESS_TOKEN)?;
        Some(Session {
            access_token,
            refresh_token: self.store.get(KEY_REFRESH_TOKEN),
            token_type: self
                .store
                .get(KEY_TOKEN_TYPE)
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_at_epoch_ms: self
                .store
                .get(KEY_EXPIRES_AT)
                .and_then(|raw| raw.parse().ok()),
            cached_user: self.cached_user(),
        })
    }

    pub fn clear(&self) -> ApiResult<()> {
        for key in [
            KEY_ACCESS_TOKEN,
            KEY_REFRESH_TOKEN,
            KEY_TOKEN_TYPE,
            KEY_EXPIRES_AT,
            KEY_USER,
        ] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    /// `Authorization` header value for a currently valid session
    pub fn authorization_header(&self) -> Option<String> {
        self.load()
            .filter(|s| s.is_valid_at(now_ms()))
            .map(|s| s.authorization_header())
    }

    pub fn cached_user(&self) -> Option<User> {
        let raw = self.store.get(KEY_USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cached user");
                None
            }
        }
    }

    pub fn set_cached_user(&self, user: &User) -> ApiResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(KEY_USER, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn session(expires: Option<i64>) -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: Some("refresh".into()),
            token_type: "Bearer".into(),
            expires_at_epoch_ms: expires,
            cached_user: Some(User {
                id: 1,
                login_id: "alice".into(),
                nickname: "Alice".into(),
                email: "alice@example.com".into(),
                role: Role::User,
            }),
        }
    }

    #[test]
    fn test_validity_depends_only_on_expiry() {
        let now = 1_000_000;
        assert!(session(Some(now + 1)).is_valid_at(now));
        assert!(!session(Some(now)).is_valid_at(now));
        assert!(!session(Some(now - 1)).is_valid_at(now));
        assert!(!session(None).is_valid_at(now));

        let mut odd = session(Some(now + 1));
        odd.access_token = "not-even-a-jwt".into();
        assert!(odd.is_valid_at(now));
    }

    #[test]
    fn test_save_load_clear() {
        let store = SessionStore::in_memory();
        assert!(store.load().is_none());

        let original = session(Some(42));
        store.save(&original).unwrap();
        assert_eq!(store.load().unwrap(), original);

        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(store.cached_user().is_none());
    }

    /// Fails every write of one key
    struct FailingKey {
        inner: MemoryStore,
        key: &'static str,
        armed: parking_lot::Mutex<bool>,
    }

    impl KeyValueStore for FailingKey {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> ApiResult<()> {
            if key == self.key && *self.armed.lock() {
                return Err(crate::error::ApiError::Storage("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> ApiResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_save_restores_previous_session() {
        let kv = Arc::new(FailingKey {
            inner: MemoryStore::new(),
            key: KEY_EXPIRES_AT,
            armed: parking_lot::Mutex::new(false),
        });
        let store = SessionStore::new(kv.clone());
        let original = session(Some(42));
        store.save(&original).unwrap();

        *kv.armed.lock() = true;
        let mut next = session(Some(99));
        next.access_token = "other".into();
        assert!(store.save(&next).is_err());

        // The restore also fails on the expiry key, which still holds the old value
        assert_eq!(store.load().unwrap(), original);
    }

    #[test]
    fn test_failed_first_save_leaves_no_session() {
        let kv = Arc::new(FailingKey {
            inner: MemoryStore::new(),
            key: KEY_EXPIRES_AT,
            armed: parking_lot::Mutex::new(true),
        });
        let store = SessionStore::new(kv);
        assert!(store.save(&session(Some(42))).is_err());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("accessToken", "abc").unwrap();
        let store = SessionStore::new(kv);
        assert_eq!(store.load().unwrap().token_type, "Bearer");
    }

    #[test]
    fn test_authorization_header_requires_valid_session() {
        let store = SessionStore::in_memory();
        store.save(&session(Some(now_ms() - 1_000))).unwrap();
        assert!(store.authorization_header().is_none());

        let mut fresh = session(Some(now_ms() + 60_000));
        fresh.token_type = "Token".into();
        store.save(&fresh).unwrap();
        assert_eq!(store.authorization_header().as_deref(), Some("Token token"));
    }
}
