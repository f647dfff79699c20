//! Generic data-fetch hook.
//!
//! A [`DataHook`] pairs an async fetcher with a dependency value. It tracks
//! `{data, loading, error}`, re-runs the fetcher when the dependencies
//! change and never retries on its own.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

type Fetcher<T, D> = Box<dyn Fn(D) -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&ApiError) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

pub struct DataHook<T, D> {
    fetcher: Fetcher<T, D>,
    deps: D,
    state: FetchState<T>,
    on_error: Option<ErrorCallback>,
}

impl<T, D> DataHook<T, D>
where
    T: Send + 'static,
    D: Clone + PartialEq + Send + 'static,
{
    pub fn new<F, Fut>(deps: D, fetcher: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        Self {
            fetcher: Box::new(move |deps| fetcher(deps).boxed()),
            deps,
            state: FetchState::default(),
            on_error: None,
        }
    }

    /// Called with every fetch error, after it is stored
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ApiError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    /// Local edits to the fetched data (optimistic list updates)
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.state.data.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Run the fetcher with the current dependencies.
    ///
    /// On failure the previous data is kept and the error message stored.
    pub async fn load(&mut self) -> &FetchState<T> {
        self.state.loading = true;
        self.state.error = None;

        let result = (self.fetcher)(self.deps.clone()).await;
        self.state.loading = false;

        match result {
            Ok(data) => self.state.data = Some(data),
            Err(err) => {
                warn!(error = %err, "Fetch failed");
                self.state.error = Some(err.to_string());
                if let Some(callback) = &self.on_error {
                    callback(&err);
                }
            }
        }

        &self.state
    }

    pub async fn refetch(&mut self) -> &FetchState<T> {
        self.load().await
    }

    /// Replace the dependencies; fetches again only if they changed
    pub async fn set_deps(&mut self, deps: D) -> bool {
        if deps == self.deps {
            return false;
        }
        self.deps = deps;
        self.load().await;
        true
    }

    /// Drop data and error without fetching
    pub fn reset(&mut self) {
        self.state = FetchState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_hook(calls: Arc<AtomicU32>) -> DataHook<Vec<i64>, i64> {
        DataHook::new(1, move |page| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if page < 0 {
                    Err(ApiError::Network("offline".into()))
                } else {
                    Ok(vec![page, page * 10])
                }
            }
        })
    }

    #[tokio::test]
    async fn test_load_populates_data() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut hook = counting_hook(calls.clone());
        assert!(hook.data().is_none());

        let state = hook.load().await;
        assert_eq!(state.data, Some(vec![1, 10]));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_deps_refetches_only_on_change() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut hook = counting_hook(calls.clone());
        hook.load().await;

        assert!(!hook.set_deps(1).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(hook.set_deps(2).await);
        assert_eq!(hook.data(), Some(&vec![2, 20]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        hook.refetch().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data_and_calls_back() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut hook = counting_hook(calls.clone())
            .on_error(move |err| sink.lock().push(err.to_string()));

        hook.load().await;
        hook.set_deps(-1).await;

        assert_eq!(hook.data(), Some(&vec![1, 10]));
        assert_eq!(hook.error(), Some("Network error: offline"));
        assert_eq!(seen.lock().len(), 1);
        // No automatic retry
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let mut hook = counting_hook(Arc::new(AtomicU32::new(0)));
        hook.load().await;
        hook.reset();
        assert_eq!(hook.state(), &FetchState::default());
        assert_eq!(*hook.deps(), 1);
    }
}
