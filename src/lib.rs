//! Most-recently-used queue over the fixed universe `1..=n`.
//!
//! `fetch(k)` returns the value at 1-based position `k` and moves it to the
//! back of the sequence. Square-root decomposition over circular-buffer
//! sections keeps each fetch at O(sqrt(n)) slot touches instead of the O(n)
//! splice of a flat list.
//!
//! ```
//! use mru_queue::MruQueue;
//!
//! let mut queue = MruQueue::new(8)?;
//! assert_eq!(queue.fetch(3)?, 3);
//! assert_eq!(queue.to_vec(), vec![1, 2, 4, 5, 6, 7, 8, 3]);
//! assert_eq!(queue.fetch(5)?, 6);
//! assert_eq!(queue.to_vec(), vec![1, 2, 4, 5, 7, 8, 3, 6]);
//! # Ok::<(), mru_queue::Error>(())
//! ```
//!
//! `MruQueue` is single-threaded; use [`SharedMruQueue`] to share one queue
//! between threads.

pub mod error;
pub mod queue;
pub mod section;
pub mod shared;

pub use error::{Error, Result};
pub use queue::{FetchStats, MruQueue};
pub use section::Section;
pub use shared::SharedMruQueue;
