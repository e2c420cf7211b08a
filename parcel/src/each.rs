//! Per-element fan-out: one task per element, no partitioning.
//!
//! These free functions spawn an independent task for every element instead
//! of batching elements into chunks. The element function runs on the caller
//! to construct each element's future, so it may capture mutably and needs
//! neither `Clone` nor `Sync`; only the futures it returns move to other
//! tasks. Prefer this form over [`Fanout`](crate::Fanout) when per-element
//! cost is wildly uneven or elements cannot be cloned; prefer the chunked
//! form when elements are many and cheap, since it spawns a bounded number
//! of tasks.
//!
//! The join contract is the same as [`Fanout`](crate::Fanout): outputs come
//! back in input order, the first error aborts all siblings, no task outlives
//! the call, and panics are resumed on the caller. If the element function
//! panics while the batch is still being spawned, the unwind aborts the
//! tasks already spawned. Calling these functions outside a Tokio runtime
//! panics.

use crate::gather::{gather, Aborter};
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawns one task per element, guarding each with the aborter at spawn.
///
/// Building the batch runs `f` on the caller, so `f` can unwind while some
/// tasks are already running; registering handles at spawn means the unwind
/// aborts those tasks instead of detaching them.
fn spawn_each<I, O, F, Fut>(items: I, mut f: F) -> (Aborter, Vec<JoinHandle<O>>)
where
    I: IntoIterator,
    O: Send + 'static,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let mut aborter = Aborter::new();
    let tasks = items
        .into_iter()
        .map(|item| {
            let task = tokio::spawn(f(item));
            aborter.push(&task);
            task
        })
        .collect();
    (aborter, tasks)
}

/// Maps every element through `f` on its own task, returning the outputs in
/// input order.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lengths = parcel::each::try_map(["a", "bb", "ccc"], |word| async move {
///     Ok::<_, ()>(word.len())
/// })
/// .await
/// .unwrap();
/// assert_eq!(lengths, vec![1, 2, 3]);
/// # }
/// ```
pub async fn try_map<I, R, E, F, Fut>(items: I, f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    R: Send + 'static,
    E: Send + 'static,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let (aborter, tasks) = spawn_each(items, f);
    debug!(items = tasks.len(), "fanning out per element");
    gather(aborter, tasks).await
}

/// Maps every element through `f` on its own task and keeps the `Some`
/// outputs, in input order.
pub async fn try_filter_map<I, R, E, F, Fut>(items: I, f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    R: Send + 'static,
    E: Send + 'static,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
{
    let (aborter, tasks) = spawn_each(items, f);
    debug!(items = tasks.len(), "fanning out per element");
    let outputs = gather(aborter, tasks).await?;
    Ok(outputs.into_iter().flatten().collect())
}

/// Runs `f` on every element, each on its own task, for its side effects.
pub async fn try_for_each<I, E, F, Fut>(items: I, f: F) -> Result<(), E>
where
    I: IntoIterator,
    E: Send + 'static,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    let (aborter, tasks) = spawn_each(items, f);
    debug!(items = tasks.len(), "fanning out per element");
    gather(aborter, tasks).await?;
    Ok(())
}
