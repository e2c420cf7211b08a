//! Chunked fan-out over slices.
//!
//! [`Fanout`] carves a slice into contiguous chunks with
//! [`split_evenly`](crate::split_evenly), spawns one task per chunk, and
//! joins the batch in a single gather step. Each worker receives an owned
//! copy of its chunk, so element types must be [`Clone`] and workers never
//! borrow from the caller. Within a chunk, elements are processed one at a
//! time and in order; across chunks, work proceeds concurrently.

use crate::{
    gather::{gather, Aborter},
    partition::split_evenly,
};
use std::{future::Future, num::NonZeroUsize, sync::Arc, thread};
use tokio::task::JoinHandle;
use tracing::debug;

/// Applies `f` to every element of an owned chunk, stopping at the first error.
async fn run_chunk<T, R, E, F, Fut>(chunk: Vec<T>, f: Arc<F>) -> Result<Vec<R>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let mut outputs = Vec::with_capacity(chunk.len());
    for item in chunk {
        outputs.push(f(item).await?);
    }
    Ok(outputs)
}

/// Runs a fallible, suspending function over every element of a slice by
/// fanning the slice out across a fixed number of tasks.
///
/// All methods share the same contract:
///
/// * Outputs are returned in input order, regardless of which chunk finishes
///   first.
/// * The first element error aborts all sibling tasks, and the call returns
///   that error with every successful output discarded.
/// * No spawned task outlives the call: every handle is driven to a terminal
///   state before a method returns, and an unwind or drop of an in-flight
///   call aborts the whole batch, even while chunks are still being spawned.
/// * A panic inside the element function is resumed on the caller.
///
/// Methods must be called from within a Tokio runtime and panic otherwise.
#[derive(Clone, Debug)]
pub struct Fanout {
    chunks: NonZeroUsize,
}

impl Fanout {
    /// Returns an engine that splits work into `chunks` tasks.
    pub fn new(chunks: NonZeroUsize) -> Self {
        Self { chunks }
    }

    /// Returns the number of chunks the engine fans out to.
    pub fn chunks(&self) -> NonZeroUsize {
        self.chunks
    }

    /// Spawns one worker per chunk, each owning a copy of its elements.
    ///
    /// Workers are guarded by the returned aborter from the moment they are
    /// spawned, so a panicking `T::clone` mid-loop aborts the chunks already
    /// in flight instead of detaching them.
    fn spawn_chunks<T, R, E, F, Fut>(
        &self,
        items: &[T],
        f: F,
    ) -> (Aborter, Vec<JoinHandle<Result<Vec<R>, E>>>)
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let plan = split_evenly(items.len(), self.chunks);
        debug!(items = items.len(), chunks = self.chunks.get(), "fanning out");
        let f = Arc::new(f);
        let mut aborter = Aborter::new();
        let tasks = plan
            .iter()
            .map(|range| {
                let chunk = items[range].to_vec();
                let task = tokio::spawn(run_chunk(chunk, f.clone()));
                aborter.push(&task);
                task
            })
            .collect();
        (aborter, tasks)
    }

    /// Maps every element through `f`, returning the outputs in input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use parcel::Fanout;
    /// use std::num::NonZeroUsize;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let fanout = Fanout::new(NonZeroUsize::new(4).unwrap());
    /// let doubled = fanout
    ///     .try_map(&[1u64, 2, 3, 4, 5], |item| async move { Ok::<_, ()>(item * 2) })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
    /// # }
    /// ```
    pub async fn try_map<T, R, E, F, Fut>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let (aborter, tasks) = self.spawn_chunks(items, f);
        let chunks = gather(aborter, tasks).await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Maps every element through `f` and keeps the `Some` outputs, in input
    /// order.
    pub async fn try_filter_map<T, R, E, F, Fut>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<R>, E>> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let (aborter, tasks) = self.spawn_chunks(items, f);
        let chunks = gather(aborter, tasks).await?;
        Ok(chunks.into_iter().flatten().flatten().collect())
    }

    /// Runs `f` on every element for its side effects.
    pub async fn try_for_each<T, E, F, Fut>(&self, items: &[T], f: F) -> Result<(), E>
    where
        T: Clone + Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(());
        }
        let (aborter, tasks) = self.spawn_chunks(items, f);
        gather(aborter, tasks).await?;
        Ok(())
    }

    /// Replaces every element with `f(element)`, writing back in place.
    ///
    /// Workers compute replacements on copies; the slice is only touched once
    /// every chunk has succeeded. On error the slice is left exactly as it
    /// was, so a failed call never exposes a partially-updated collection.
    ///
    /// # Examples
    ///
    /// ```
    /// use parcel::Fanout;
    /// use std::num::NonZeroUsize;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let fanout = Fanout::new(NonZeroUsize::new(2).unwrap());
    /// let mut items = vec![1u64, 2, 3];
    /// fanout
    ///     .try_modify_each(&mut items, |item| async move { Ok::<_, ()>(item + 10) })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(items, vec![11, 12, 13]);
    /// # }
    /// ```
    pub async fn try_modify_each<T, E, F, Fut>(&self, items: &mut [T], f: F) -> Result<(), E>
    where
        T: Clone + Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if items.is_empty() {
            return Ok(());
        }
        let (aborter, tasks) = self.spawn_chunks(items, f);
        let mutated = gather(aborter, tasks).await?;

        // Every chunk succeeded; move the replacements into the slice.
        let plan = split_evenly(items.len(), self.chunks);
        for (range, chunk) in plan.iter().zip(mutated) {
            for (slot, value) in items[range].iter_mut().zip(chunk) {
                *slot = value;
            }
        }
        Ok(())
    }
}

impl Default for Fanout {
    /// Returns an engine with one chunk per available CPU.
    fn default() -> Self {
        Self::new(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }
}
