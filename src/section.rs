//! Fixed-capacity circular buffer holding one contiguous run of the queue.
//!
//! A section is always full: it holds exactly `capacity` live values, read in
//! logical order starting at physical slot `head` and wrapping around. `tail`
//! is the physical slot of the last live value, so at rest
//! `tail == (head + capacity - 1) % capacity`.
//!
//! ```text
//!   storage = [7, 8, 5, 6]    head = 2, tail = 1
//!   logical  =  5, 6, 7, 8
//! ```
//!
//! During a fetch the queue temporarily treats the `tail` slot as free: it
//! closes a gap up to `tail`, then refills `tail` with a donated value.
//! Sections are built and mutated only by the queue; outside the crate they
//! are read-only views.

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    storage: Box<[u32]>,
    head: usize,
    tail: usize,
}

impl Section {
    /// Builds a full section from its initial logical contents.
    pub(crate) fn new(values: Vec<u32>) -> Result<Self> {
        let tail = values
            .len()
            .checked_sub(1)
            .ok_or(Error::InvalidArgument("section capacity must be positive"))?;
        Ok(Self {
            storage: values.into_boxed_slice(),
            head: 0,
            tail,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub fn physical_index(&self, logical_offset: usize) -> usize {
        debug_assert!(logical_offset < self.capacity());
        (self.head + logical_offset) % self.capacity()
    }

    #[inline]
    pub fn value_at(&self, logical_offset: usize) -> u32 {
        self.storage[self.physical_index(logical_offset)]
    }

    /// Shifts every value after `gap` one physical slot back until the gap
    /// reaches `tail`, which is left free for the caller to refill.
    ///
    /// Returns the number of values moved.
    pub(crate) fn close_gap_at(&mut self, mut gap: usize) -> usize {
        debug_assert!(gap < self.capacity());
        let capacity = self.capacity();
        let mut moved = 0;
        while gap != self.tail {
            let next = (gap + 1) % capacity;
            self.storage[gap] = self.storage[next];
            gap = next;
            moved += 1;
        }
        moved
    }

    #[inline]
    pub(crate) fn advance_head(&mut self) {
        self.head = (self.head + 1) % self.capacity();
    }

    #[inline]
    pub(crate) fn advance_tail(&mut self) {
        self.tail = (self.tail + 1) % self.capacity();
    }

    #[inline]
    pub fn head_value(&self) -> u32 {
        self.storage[self.head]
    }

    #[inline]
    pub(crate) fn set_tail_value(&mut self, value: u32) {
        self.storage[self.tail] = value;
    }

    /// Live values in logical order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.capacity()).map(move |offset| self.value_at(offset))
    }
}
