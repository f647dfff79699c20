//! Observable unread-message count shared across the client.
//!
//! Subscribers hold a `watch::Receiver`; dropping it unsubscribes. The
//! store is torn down explicitly with [`UnreadStore::close`], after which
//! updates are ignored and receivers observe the channel as closed.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug)]
pub struct UnreadStore {
    tx: Mutex<Option<watch::Sender<usize>>>,
    rx: watch::Receiver<usize>,
}

impl Default for UnreadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadStore {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(0);
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.rx.clone()
    }

    pub fn get(&self) -> usize {
        *self.rx.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Publish a new count; returns false once closed
    pub fn set(&self, count: usize) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => {
                tx.send_replace(count);
                true
            }
            None => false,
        }
    }

    /// Lower the count by `n`, never below zero
    pub fn decrement(&self, n: usize) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => {
                tx.send_modify(|count| *count = count.saturating_sub(n));
                true
            }
            None => false,
        }
    }

    pub fn close(&self) {
        if self.tx.lock().take().is_some() {
            debug!("Unread store closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let store = UnreadStore::new();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.set(5);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 5);

        store.decrement(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 3);
        assert_eq!(store.get(), 3);
    }

    #[test]
    fn test_decrement_saturates() {
        let store = UnreadStore::new();
        store.set(1);
        store.decrement(4);
        assert_eq!(store.get(), 0);
    }

    #[tokio::test]
    async fn test_close_is_explicit_teardown() {
        let store = UnreadStore::new();
        store.set(2);
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.close();
        assert!(store.is_closed());
        assert!(!store.set(9));
        assert!(!store.decrement(1));
        assert!(rx.changed().await.is_err());
        // Late subscribers still read the final value
        assert_eq!(*store.subscribe().borrow(), 2);
    }

    #[test]
    fn test_dropped_receiver_does_not_block_updates() {
        let store = UnreadStore::new();
        drop(store.subscribe());
        assert!(store.set(3));
        assert_eq!(store.get(), 3);
    }
}
