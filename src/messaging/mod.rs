//! Direct messaging: thread derivation, unread tracking and send quota.

pub mod cache;
pub mod debounce;
pub mod threads;
pub mod unread;

pub use cache::{NicknameCache, TtlCache};
pub use debounce::Debouncer;
pub use threads::{derive_threads, fallback_nickname, total_unread};
pub use unread::UnreadStore;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::MessagingConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{Message, MessageAuthority, MessageThread, NewMessage};

#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn received(&self) -> ApiResult<Vec<Message>>;
    async fn sent(&self) -> ApiResult<Vec<Message>>;
    async fn send(&self, message: &NewMessage) -> ApiResult<()>;
    async fn mark_read(&self, message_id: i64) -> ApiResult<()>;
    async fn delete(&self, message_id: i64) -> ApiResult<()>;
    async fn authority(&self, user_id: i64) -> ApiResult<MessageAuthority>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn nickname(&self, user_id: i64) -> ApiResult<String>;
}

/// Resolve nicknames through the cache, fetching misses in parallel.
///
/// Failed lookups are left out of the map and are not cached.
pub async fn resolve_nicknames(
    directory: &dyn UserDirectory,
    cache: &NicknameCache,
    user_ids: &[i64],
) -> HashMap<i64, String> {
    let mut resolved = HashMap::with_capacity(user_ids.len());
    let mut misses = Vec::new();

    for &id in user_ids {
        match cache.get(&id) {
            Some(name) => {
                resolved.insert(id, name);
            }
            None => misses.push(id),
        }
    }

    let lookups = misses.iter().map(|&id| async move { (id, directory.nickname(id).await) });
    for (id, result) in join_all(lookups).await {
        match result {
            Ok(name) => {
                cache.insert(id, name.clone());
                resolved.insert(id, name);
            }
            Err(e) => debug!(user_id = id, "Nickname lookup failed: {}", e),
        }
    }

    resolved
}

pub fn validate_message(content: &str, max_len: usize) -> ApiResult<()> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("content", "Message cannot be empty"));
    }
    if content.chars().count() > max_len {
        return Err(ApiError::validation(
            "content",
            format!("Message must be at most {} characters", max_len),
        ));
    }
    Ok(())
}

/// An auth failure on a mailbox fetch reads as an empty mailbox
fn empty_on_auth(result: ApiResult<Vec<Message>>, mailbox: &str) -> ApiResult<Vec<Message>> {
    match result {
        Err(e) if e.is_auth() => {
            debug!("Not authorized to read {} messages: {}", mailbox, e);
            Ok(Vec::new())
        }
        other => other,
    }
}

struct Inner {
    backend: Arc<dyn MessageBackend>,
    directory: Arc<dyn UserDirectory>,
    me: i64,
    nicknames: NicknameCache,
    threads: ArcSwap<Vec<MessageThread>>,
    unread: Arc<UnreadStore>,
    quota: Mutex<Option<u32>>,
    max_message_length: usize,
}

impl Inner {
    async fn refresh(&self) -> ApiResult<Arc<Vec<MessageThread>>> {
        let (received, sent) = tokio::join!(self.backend.received(), self.backend.sent());
        let received = empty_on_auth(received, "received")?;
        let sent = empty_on_auth(sent, "sent")?;

        let others = threads::counterparties(self.me, received.iter().chain(sent.iter()));
        let names = resolve_nicknames(self.directory.as_ref(), &self.nicknames, &others).await;

        let derived = derive_threads(self.me, received, sent, &names);
        let unread = total_unread(&derived);
        debug!(threads = derived.len(), unread, "Message threads refreshed");

        let derived = Arc::new(derived);
        self.threads.store(derived.clone());
        self.unread.set(unread);
        Ok(derived)
    }
}

/// Client-side message state for the signed-in user.
///
/// Threads are rebuilt from the two mailboxes on every refresh. Send and
/// mark-read schedule a debounced refresh; delete refreshes immediately.
pub struct MessageCenter {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl MessageCenter {
    pub fn new(
        backend: Arc<dyn MessageBackend>,
        directory: Arc<dyn UserDirectory>,
        me: i64,
        config: &MessagingConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                directory,
                me,
                nicknames: NicknameCache::new(
                    config.nickname_cache_capacity,
                    config.nickname_cache_ttl(),
                ),
                threads: ArcSwap::from_pointee(Vec::new()),
                unread: Arc::new(UnreadStore::new()),
                quota: Mutex::new(None),
                max_message_length: config.max_message_length,
            }),
            debouncer: Debouncer::new(config.refresh_debounce()),
        }
    }

    pub fn me(&self) -> i64 {
        self.inner.me
    }

    pub fn threads(&self) -> Arc<Vec<MessageThread>> {
        self.inner.threads.load_full()
    }

    pub fn thread(&self, other_id: i64) -> Option<MessageThread> {
        self.inner
            .threads
            .load()
            .iter()
            .find(|t| t.id == other_id)
            .cloned()
    }

    pub fn unread_store(&self) -> Arc<UnreadStore> {
        self.inner.unread.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.unread.get()
    }

    /// Last known send quota; `None` until checked
    pub fn remaining_quota(&self) -> Option<u32> {
        *self.inner.quota.lock()
    }

    pub async fn refresh(&self) -> ApiResult<Arc<Vec<MessageThread>>> {
        self.inner.refresh().await
    }

    pub fn schedule_refresh(&self) {
        let inner = self.inner.clone();
        self.debouncer.schedule(move || async move {
            if let Err(e) = inner.refresh().await {
                warn!("Debounced message refresh failed: {}", e);
            }
        });
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Fetch the remaining quota and update the local mirror
    pub async fn check_authority(&self) -> ApiResult<u32> {
        let authority = self.inner.backend.authority(self.inner.me).await?;
        *self.inner.quota.lock() = Some(authority.count);
        Ok(authority.count)
    }

    pub async fn send(&self, receiver_id: i64, content: &str) -> ApiResult<()> {
        validate_message(content, self.inner.max_message_length)?;

        let remaining = self.check_authority().await?;
        if remaining == 0 {
            info!(receiver_id, "Message not sent: quota exhausted");
            return Err(ApiError::QuotaExhausted);
        }

        let message = NewMessage {
            receiver_id,
            content: content.to_string(),
        };
        self.inner.backend.send(&message).await?;

        if let Some(count) = self.inner.quota.lock().as_mut() {
            *count = count.saturating_sub(1);
        }
        debug!(receiver_id, "Message sent");
        self.schedule_refresh();
        Ok(())
    }

    /// Mark every unread message from `other_id` as read.
    ///
    /// Returns how many messages changed state. Messages the server failed
    /// to mark stay unread locally; the first such error is returned after
    /// the successful ones are applied.
    pub async fn mark_thread_read(&self, other_id: i64) -> ApiResult<usize> {
        let me = self.inner.me;
        let pending: Vec<i64> = match self.thread(other_id) {
            Some(thread) => thread
                .messages
                .iter()
                .filter(|m| m.is_unread_for(me))
                .map(|m| m.id)
                .collect(),
            None => return Ok(0),
        };
        if pending.is_empty() {
            return Ok(0);
        }

        let backend = &self.inner.backend;
        let results = join_all(pending.iter().map(|&id| async move {
            (id, backend.mark_read(id).await)
        }))
        .await;

        let mut marked = Vec::new();
        let mut first_error = None;
        for (id, result) in results {
            match result {
                Ok(()) => marked.push(id),
                Err(e) => {
                    warn!(message_id = id, "Failed to mark message read: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        let changed = marked.len();
        if changed > 0 {
            self.inner.threads.rcu(|current| {
                let mut next: Vec<MessageThread> = (**current).clone();
                if let Some(thread) = next.iter_mut().find(|t| t.id == other_id) {
                    for message in thread.messages.iter_mut() {
                        if marked.contains(&message.id) {
                            message.is_read = true;
                        }
                    }
                    if marked.contains(&thread.last_message.id) {
                        thread.last_message.is_read = true;
                    }
                    thread.unread_count = thread.unread_count.saturating_sub(changed);
                }
                next
            });
            self.inner.unread.decrement(changed);
            self.schedule_refresh();
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }

    pub async fn delete_message(&self, message_id: i64) -> ApiResult<()> {
        self.inner.backend.delete(message_id).await?;
        self.debouncer.cancel();
        self.inner.refresh().await?;
        Ok(())
    }

    /// Cancel pending work and close the unread store
    pub fn shutdown(&self) {
        self.debouncer.cancel();
        self.inner.unread.close();
    }
}
