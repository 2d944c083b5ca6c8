//! Ordered, bounded fan-out over a list of inputs.

use std::future::Future;

use tokio::task::JoinSet;

use crate::errors::{ExplorerError, Result};

/// Map every item through `f` with at most `limit` tasks in flight.
///
/// Results come back in input order. The first failure aborts all
/// outstanding tasks and is returned; no partial output escapes.
pub async fn try_map_ordered<T, R, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let limit = limit.max(1);
    let total = items.len();
    let mut pending: JoinSet<(usize, Result<R>)> = JoinSet::new();
    let mut done: Vec<(usize, R)> = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        if pending.len() >= limit {
            collect_next(&mut pending, &mut done).await?;
        }
        let fut = f(item);
        pending.spawn(async move { (index, fut.await) });
    }

    while !pending.is_empty() {
        collect_next(&mut pending, &mut done).await?;
    }

    done.sort_by_key(|(index, _)| *index);
    Ok(done.into_iter().map(|(_, r)| r).collect())
}

async fn collect_next<R: Send + 'static>(
    pending: &mut JoinSet<(usize, Result<R>)>,
    done: &mut Vec<(usize, R)>,
) -> Result<()> {
    match pending.join_next().await {
        Some(Ok((index, Ok(value)))) => {
            done.push((index, value));
            Ok(())
        }
        Some(Ok((_, Err(e)))) => {
            pending.abort_all();
            Err(e)
        }
        Some(Err(e)) => {
            pending.abort_all();
            Err(ExplorerError::Task(e.to_string()))
        }
        None => Ok(()),
    }
}
