//! Sequential traversals for fallible, suspending element functions.
//!
//! Every function here visits elements one at a time, in order, on the
//! caller's task; nothing is spawned and no `Send` or `'static` bounds
//! apply. The first element error stops the traversal and is returned
//! immediately, leaving later elements unvisited. These are the ordering
//! baseline the fan-out forms in this crate are measured against, and the
//! right tool when elements must observe the effects of their predecessors.
//!
//! Predicates receive elements by reference but must return futures that own
//! their captures, mirroring the signatures of
//! [`TryStreamExt`](futures::stream::TryStreamExt).

use std::future::Future;

/// Maps every element through `f`, in order, collecting the outputs.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let halves = parcel::seq::try_map([2u64, 4, 6], |item| async move {
///     Ok::<_, ()>(item / 2)
/// })
/// .await
/// .unwrap();
/// assert_eq!(halves, vec![1, 2, 3]);
/// # }
/// ```
pub async fn try_map<I, R, E, F, Fut>(items: I, mut f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let items = items.into_iter();
    let mut outputs = Vec::with_capacity(items.size_hint().0);
    for item in items {
        outputs.push(f(item).await?);
    }
    Ok(outputs)
}

/// Keeps the elements for which `keep` returns `true`, in order.
pub async fn try_filter<I, E, F, Fut>(items: I, mut keep: F) -> Result<Vec<I::Item>, E>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut kept = Vec::new();
    for item in items {
        if keep(&item).await? {
            kept.push(item);
        }
    }
    Ok(kept)
}

/// Maps every element through `f`, in order, keeping the `Some` outputs.
pub async fn try_filter_map<I, R, E, F, Fut>(items: I, mut f: F) -> Result<Vec<R>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<R>, E>>,
{
    let mut outputs = Vec::new();
    for item in items {
        if let Some(output) = f(item).await? {
            outputs.push(output);
        }
    }
    Ok(outputs)
}

/// Folds the elements into an accumulator, in order.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let total = parcel::seq::try_fold([1u64, 2, 3], 0u64, |acc, item| async move {
///     Ok::<_, ()>(acc + item)
/// })
/// .await
/// .unwrap();
/// assert_eq!(total, 6);
/// # }
/// ```
pub async fn try_fold<I, A, E, F, Fut>(items: I, init: A, mut f: F) -> Result<A, E>
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> Fut,
    Fut: Future<Output = Result<A, E>>,
{
    let mut acc = init;
    for item in items {
        acc = f(acc, item).await?;
    }
    Ok(acc)
}

/// Runs `f` on every element, in order, for its side effects.
pub async fn try_for_each<I, E, F, Fut>(items: I, mut f: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    for item in items {
        f(item).await?;
    }
    Ok(())
}

/// Returns the first element for which `found` returns `true`.
///
/// Elements after the match are never visited.
pub async fn try_find<I, E, F, Fut>(items: I, mut found: F) -> Result<Option<I::Item>, E>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    for item in items {
        if found(&item).await? {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

/// Drops the longest prefix for which `skip` returns `true` and keeps the
/// rest.
///
/// The predicate runs only until its first `false`; the remaining elements
/// are kept without being tested, so it can neither fail nor suspend on them.
pub async fn try_skip_while<I, E, F, Fut>(items: I, mut skip: F) -> Result<Vec<I::Item>, E>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut items = items.into_iter();
    let mut kept = Vec::new();
    for item in items.by_ref() {
        if !skip(&item).await? {
            kept.push(item);
            break;
        }
    }
    kept.extend(items);
    Ok(kept)
}

/// Keeps the longest prefix for which `keep` returns `true`.
///
/// Traversal stops at the first `false`; elements after it are never
/// visited.
pub async fn try_take_while<I, E, F, Fut>(items: I, mut keep: F) -> Result<Vec<I::Item>, E>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut kept = Vec::new();
    for item in items {
        if !keep(&item).await? {
            break;
        }
        kept.push(item);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Boom(u64);

    #[tokio::test]
    async fn test_map_stops_at_first_error() {
        let mut visited = 0u64;
        let result = try_map(0..10u64, |item| {
            visited += 1;
            async move {
                if item == 3 {
                    Err(Boom(item))
                } else {
                    Ok(item)
                }
            }
        })
        .await;
        assert_eq!(result, Err(Boom(3)));
        assert_eq!(visited, 4);
    }

    #[tokio::test]
    async fn test_filter_keeps_matching_elements() {
        let odds = try_filter(0..10u64, |item| {
            let odd = item % 2 == 1;
            async move { Ok::<_, ()>(odd) }
        })
        .await
        .unwrap();
        assert_eq!(odds, vec![1, 3, 5, 7, 9]);
    }

    #[tokio::test]
    async fn test_filter_map_drops_none() {
        let outputs = try_filter_map(0..6u64, |item| async move {
            Ok::<_, ()>((item % 3 == 0).then_some(item * 10))
        })
        .await
        .unwrap();
        assert_eq!(outputs, vec![0, 30]);
    }

    #[tokio::test]
    async fn test_fold_accumulates_in_order() {
        let digits = try_fold([1u64, 2, 3], 0u64, |acc, item| async move {
            Ok::<_, ()>(acc * 10 + item)
        })
        .await
        .unwrap();
        assert_eq!(digits, 123);
    }

    #[tokio::test]
    async fn test_for_each_stops_at_first_error() {
        let mut visited = 0u64;
        let result = try_for_each(0..10u64, |item| {
            visited += 1;
            async move {
                if item == 5 {
                    Err(Boom(item))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert_eq!(result, Err(Boom(5)));
        assert_eq!(visited, 6);
    }

    #[tokio::test]
    async fn test_find_returns_first_match() {
        let mut visited = 0u64;
        let found = try_find([4u64, 8, 15, 16, 23], |item| {
            visited += 1;
            let matches = *item > 10;
            async move { Ok::<_, ()>(matches) }
        })
        .await
        .unwrap();
        assert_eq!(found, Some(15));
        assert_eq!(visited, 3);
    }

    #[tokio::test]
    async fn test_skip_while_keeps_untested_suffix() {
        let mut tested = 0u64;
        let kept = try_skip_while([0u64, 1, 2, 3, 0, 1], |item| {
            tested += 1;
            let skip = *item < 2;
            async move { Ok::<_, ()>(skip) }
        })
        .await
        .unwrap();
        assert_eq!(kept, vec![2, 3, 0, 1]);

        // The trailing elements below the threshold were kept without being
        // tested.
        assert_eq!(tested, 3);
    }

    #[tokio::test]
    async fn test_take_while_stops_consuming() {
        let mut tested = 0u64;
        let kept = try_take_while([0u64, 1, 2, 9, 0], |item| {
            tested += 1;
            let keep = *item < 5;
            async move { Ok::<_, ()>(keep) }
        })
        .await
        .unwrap();
        assert_eq!(kept, vec![0, 1, 2]);
        assert_eq!(tested, 4);
    }
}
