//! Join a batch of spawned tasks into a single ordered result.
//!
//! [`gather`] is the synchronization point behind every fan-out in this
//! crate: it polls all task handles to completion, reassembles successful
//! outputs in spawn order, and guarantees that no task outlives the call. The
//! first element failure aborts every sibling, and a panic inside a task is
//! resumed on the caller after the rest of the batch has been aborted.

use futures::{
    future::FutureExt,
    stream::{FuturesUnordered, StreamExt},
};
use std::panic;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, trace};

/// Aborts a batch of tasks, at the latest when dropped.
///
/// Every task is registered with [`push`](Aborter::push) the moment it is
/// spawned, so an unwind while the batch is still being built aborts the
/// tasks already running. Holding the guard across every await point in
/// [`gather`] ensures that dropping the in-flight operation (e.g. from a
/// select branch that loses) cannot leak running tasks either.
#[derive(Default)]
pub(crate) struct Aborter {
    handles: Vec<AbortHandle>,
}

impl Aborter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `task` for abort with the rest of the batch.
    pub(crate) fn push<T>(&mut self, task: &JoinHandle<T>) {
        self.handles.push(task.abort_handle());
    }

    fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for Aborter {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Waits for every task and returns their outputs in spawn order.
///
/// `aborter` must guard every handle in `tasks`. Outputs are reassembled by
/// task index, never by completion order. On the first failure all siblings
/// are aborted, every handle is drained to a terminal state, and the failure
/// is returned with successful outputs discarded. Task panics are resumed on
/// the caller.
pub(crate) async fn gather<O, E>(
    aborter: Aborter,
    tasks: Vec<JoinHandle<Result<O, E>>>,
) -> Result<Vec<O>, E> {
    let mut pending: FuturesUnordered<_> = tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| task.map(move |joined| (index, joined)))
        .collect();

    let mut outputs = Vec::with_capacity(pending.len());
    let mut failure = None;
    while let Some((index, joined)) = pending.next().await {
        match joined {
            Ok(Ok(output)) => {
                trace!(task = index, "task completed");
                if failure.is_none() {
                    outputs.push((index, output));
                }
            }
            Ok(Err(err)) => {
                if failure.is_none() {
                    debug!(task = index, "task failed, aborting siblings");
                    aborter.abort();
                    failure = Some(err);
                }
            }
            Err(joined) if joined.is_panic() => {
                debug!(task = index, "task panicked, aborting siblings");
                aborter.abort();
                panic::resume_unwind(joined.into_panic());
            }
            Err(_) => {
                // An aborted sibling finished tearing down; nothing to record.
            }
        }
    }
    if let Some(err) = failure {
        return Err(err);
    }

    outputs.sort_by_key(|(index, _)| *index);
    Ok(outputs.into_iter().map(|(_, output)| output).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Duration,
    };
    use tokio::sync::oneshot;

    /// Sets a flag when dropped, proving a task was torn down.
    struct Witness(Arc<AtomicBool>);

    impl Drop for Witness {
        fn drop(&mut self) {
            self.0.store(true, Ordering::Release);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_outputs_follow_spawn_order() {
        let mut aborter = Aborter::new();
        let tasks: Vec<_> = (0..8u64)
            .map(|index| {
                let task = tokio::spawn(async move {
                    // Finish in reverse spawn order.
                    tokio::time::sleep(Duration::from_millis((8 - index) * 5)).await;
                    Ok::<_, ()>(index)
                });
                aborter.push(&task);
                task
            })
            .collect();
        let outputs = gather(aborter, tasks).await.unwrap();
        assert_eq!(outputs, (0..8u64).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    #[should_panic(expected = "worker exploded")]
    async fn test_panic_resumes_on_caller() {
        let mut aborter = Aborter::new();
        let task: JoinHandle<Result<(), ()>> = tokio::spawn(async { panic!("worker exploded") });
        aborter.push(&task);
        let _ = gather(aborter, vec![task]).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drop_aborts_outstanding_tasks() {
        let (started, ready) = oneshot::channel();
        let aborted = Arc::new(AtomicBool::new(false));
        let witness = Witness(aborted.clone());
        let mut aborter = Aborter::new();
        let task = tokio::spawn(async move {
            let _witness = witness;
            let _ = started.send(());
            futures::future::pending::<()>().await;
            Ok::<_, ()>(())
        });
        aborter.push(&task);

        // Poll the operation into flight, then drop it mid-join.
        let mut operation = Box::pin(gather(aborter, vec![task]));
        assert!(futures::poll!(operation.as_mut()).is_pending());
        ready.await.unwrap();
        drop(operation);

        // The abort lands at the task's next await point.
        for _ in 0..100 {
            if aborted.load(Ordering::Acquire) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task survived drop of the operation");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_aborter_drop_aborts_before_gather() {
        let (started, ready) = oneshot::channel();
        let aborted = Arc::new(AtomicBool::new(false));
        let witness = Witness(aborted.clone());
        let mut aborter = Aborter::new();
        let task = tokio::spawn(async move {
            let _witness = witness;
            let _ = started.send(());
            futures::future::pending::<()>().await;
            Ok::<_, ()>(())
        });
        aborter.push(&task);
        ready.await.unwrap();

        // Dropping the guard before any join, as an unwind mid-spawn would,
        // must still abort the task even though its handle is detached.
        drop(aborter);
        drop(task);

        for _ in 0..100 {
            if aborted.load(Ordering::Acquire) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task survived drop of its guard");
    }
}
