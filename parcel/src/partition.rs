//! Split an index space into contiguous, evenly-sized chunks.
//!
//! A [`Plan`] describes how `0..len` is carved into a fixed number of
//! half-open ranges. Chunk sizes never differ by more than one: the first
//! `len % chunks` ranges hold one extra element. When there are more chunks
//! than elements, the surplus ranges are empty and sit at position `len` so
//! every chunk remains addressable by index.

use std::{num::NonZeroUsize, ops::Range};

/// An ordered set of half-open ranges covering `0..len`.
///
/// Produced by [`split_evenly`]. Ranges are indexed in collection order: the
/// range at index `i` always precedes (or abuts) the range at index `i + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    ranges: Vec<Range<usize>>,
}

impl Plan {
    /// Returns the number of chunks in the plan.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns whether the plan contains no chunks.
    ///
    /// Plans built by [`split_evenly`] always contain at least one chunk,
    /// even for an empty collection.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the range at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<Range<usize>> {
        self.ranges.get(index).cloned()
    }

    /// Returns an iterator over the ranges in collection order.
    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.ranges.iter().cloned()
    }
}

impl IntoIterator for Plan {
    type Item = Range<usize>;
    type IntoIter = std::vec::IntoIter<Range<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

/// Splits `0..len` into exactly `chunks` contiguous ranges of near-equal size.
///
/// Each range is at most one element longer than any other, and the longer
/// ranges come first. The ranges are returned in collection order and cover
/// `0..len` without gaps or overlap. If `chunks` exceeds `len`, the trailing
/// ranges are empty (`len..len`) rather than omitted.
///
/// # Examples
///
/// ```
/// use parcel::split_evenly;
/// use std::num::NonZeroUsize;
///
/// let plan = split_evenly(7, NonZeroUsize::new(3).unwrap());
/// let ranges: Vec<_> = plan.iter().collect();
/// assert_eq!(ranges, vec![0..3, 3..5, 5..7]);
/// ```
pub fn split_evenly(len: usize, chunks: NonZeroUsize) -> Plan {
    let chunks = chunks.get();
    let base = len / chunks;
    let remainder = len % chunks;
    let mut ranges = Vec::with_capacity(chunks);
    let mut start = 0;
    for index in 0..chunks {
        // The first `remainder` chunks absorb one extra element each.
        let size = if index < remainder { base + 1 } else { base };
        ranges.push(start..start + size);
        start += size;
    }
    Plan { ranges }
}
