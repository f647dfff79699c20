//! Admin dashboard: users and their message-send quota.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{MessageAuthority, User};

#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn list_users(&self) -> ApiResult<Vec<User>>;
    async fn list_authorities(&self) -> ApiResult<Vec<MessageAuthority>>;
    async fn grant_authority(&self, user_id: i64, count: u32) -> ApiResult<MessageAuthority>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminRow {
    pub user: User,
    pub remaining_messages: u32,
}

pub struct AdminPage {
    backend: Arc<dyn AdminBackend>,
    users: Vec<User>,
    authorities: HashMap<i64, u32>,
}

impl AdminPage {
    /// Refuses non-admins locally, before any request is made
    pub fn new(backend: Arc<dyn AdminBackend>, viewer: Option<&User>) -> ApiResult<Self> {
        match viewer {
            None => Err(ApiError::NotAuthenticated),
            Some(user) if !user.is_admin() => {
                Err(ApiError::forbidden("Admin access required"))
            }
            Some(_) => Ok(Self {
                backend,
                users: Vec::new(),
                authorities: HashMap::new(),
            }),
        }
    }

    pub async fn load(&mut self) -> ApiResult<()> {
        let (users, authorities) =
            tokio::try_join!(self.backend.list_users(), self.backend.list_authorities())?;
        self.users = users;
        self.authorities = authorities
            .into_iter()
            .map(|a| (a.user_id, a.count))
            .collect();
        Ok(())
    }

    /// Users in server order with their remaining quota (0 when unset)
    pub fn rows(&self) -> Vec<AdminRow> {
        self.users
            .iter()
            .map(|user| AdminRow {
                user: user.clone(),
                remaining_messages: self.authorities.get(&user.id).copied().unwrap_or(0),
            })
            .collect()
    }

    pub async fn grant(&mut self, user_id: i64, count: u32) -> ApiResult<u32> {
        let granted = self.backend.grant_authority(user_id, count).await?;
        info!(user_id, count = granted.count, "Message authority granted");
        self.authorities.insert(granted.user_id, granted.count);
        Ok(granted.count)
    }
}
