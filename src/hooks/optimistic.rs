//! Optimistic mutation helper.
//!
//! Every optimistic update in the client goes through
//! [`optimistic_mutation`], so apply/request/rollback behave the same way
//! for likes, bookmarks and comment removal.

use std::future::Future;
use tracing::warn;

use crate::error::ApiResult;

/// Apply a local change, await the request and roll back on failure.
///
/// `rollback` receives the mutated state and the pre-apply snapshot. The
/// request error is logged and returned unchanged.
pub async fn optimistic_mutation<S, T, A, Q, Fut, R>(
    state: &mut S,
    apply: A,
    request: Q,
    rollback: R,
) -> ApiResult<T>
where
    S: Clone,
    A: FnOnce(&mut S),
    Q: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
    R: FnOnce(&mut S, S),
{
    let snapshot = state.clone();
    apply(state);

    match request().await {
        Ok(value) => Ok(value),
        Err(err) => {
            rollback(state, snapshot);
            warn!(error = %err, "Optimistic update rolled back");
            Err(err)
        }
    }
}

/// [`optimistic_mutation`] restoring the snapshot on failure
pub async fn optimistic<S, T, A, Q, Fut>(state: &mut S, apply: A, request: Q) -> ApiResult<T>
where
    S: Clone,
    A: FnOnce(&mut S),
    Q: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    optimistic_mutation(state, apply, request, |state, snapshot| *state = snapshot).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_success_keeps_applied_state() {
        let mut count = 1;
        let result = tokio_test::block_on(optimistic(
            &mut count,
            |c| *c += 1,
            || async { Ok::<_, ApiError>("ok") },
        ));
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_failure_restores_snapshot() {
        let mut items = vec![1, 2, 3];
        let result: ApiResult<()> = tokio_test::block_on(optimistic(
            &mut items,
            |items| items.retain(|i| *i != 2),
            || async { Err(ApiError::Network("down".into())) },
        ));
        assert!(result.is_err());
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_custom_rollback_sees_snapshot() {
        let mut value = 10;
        let result: ApiResult<()> = optimistic_mutation(
            &mut value,
            |v| *v = 20,
            || async { Err(ApiError::QuotaExhausted) },
            |v, snapshot| {
                assert_eq!(*v, 20);
                *v = snapshot + 1;
            },
        )
        .await;
        assert!(matches!(result, Err(ApiError::QuotaExhausted)));
        assert_eq!(value, 11);
    }
}
