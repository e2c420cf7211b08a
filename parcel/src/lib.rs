//! Fan out fallible, suspending work over ordered collections.
//!
//! # Overview
//!
//! This crate applies an async, fallible function to every element of an
//! ordered collection and hands the results back in input order. The chunked
//! engine ([`Fanout`]) splits a slice into contiguous, evenly-sized ranges
//! with [`split_evenly`], runs one Tokio task per chunk, and reassembles the
//! chunk outputs by position. The per-element form ([`each`]) spawns one task
//! per element and skips partitioning entirely. The sequential form ([`seq`])
//! visits elements one at a time on the caller's task and is the semantic
//! baseline for both.
//!
//! All concurrent forms share one contract: the first element error aborts
//! every sibling task and becomes the call's error, completion order never
//! leaks into output order, and no spawned task outlives the call that
//! spawned it. In-place mutation ([`Fanout::try_modify_each`]) is
//! all-or-nothing: a failed call leaves the collection untouched.
//!
//! # Example
//!
//! ```
//! use parcel::Fanout;
//! use std::num::NonZeroUsize;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // Parse a batch of records across four tasks.
//! let records = ["1", "2", "3", "4", "5", "6"];
//! let fanout = Fanout::new(NonZeroUsize::new(4).unwrap());
//! let parsed = fanout
//!     .try_map(&records, |record| async move { record.parse::<u64>() })
//!     .await
//!     .unwrap();
//! assert_eq!(parsed, vec![1, 2, 3, 4, 5, 6]);
//! # }
//! ```

mod fanout;
mod gather;
mod partition;

pub mod each;
pub mod seq;

pub use fanout::Fanout;
pub use partition::{split_evenly, Plan};
