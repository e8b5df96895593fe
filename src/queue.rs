//! Square-root decomposed most-recently-used queue.
//!
//! The logical sequence `1..=upper_limit` is split into `ceil(sqrt(n))`-sized
//! [`Section`]s (the last one may be shorter). `fetch` removes one value and
//! appends it to the back of the sequence:
//!
//! ```text
//!   fetch(3) on n = 8, section_size = 3
//!
//!   [1 2 3][4 5 6][7 8]        close gap in owning section
//!   [1 2 _][4 5 6][7 8]        ripple: each later head fills the previous tail
//!   [1 2 4][5 6 _][7 8]
//!   [1 2 4][5 6 7][8 _]        fetched value lands in the last tail
//!   [1 2 4][5 6 7][8 3]
//! ```
//!
//! Only the owning section shifts element by element; every later section
//! donates one value and rotates its head and tail, so a fetch touches
//! O(sqrt(n)) slots.

use std::fmt;

use crate::section::Section;
use crate::{Error, Result};

/// Element-touch counters collected by every [`MruQueue::fetch`].
///
/// Touches count one for reading the fetched value, one per value moved while
/// closing the gap, one per value donated across sections, and one for the
/// final write. A move or donation is a read plus a write but counts once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub fetches: u64,
    pub touches: u64,
    pub last_touches: u64,
    pub max_touches: u64,
}

impl FetchStats {
    fn record(&mut self, touches: u64) {
        self.fetches += 1;
        self.touches += touches;
        self.last_touches = touches;
        self.max_touches = self.max_touches.max(touches);
    }

    /// Mean touches per fetch, or zero before the first fetch.
    pub fn mean_touches(&self) -> f64 {
        if self.fetches == 0 {
            return 0.0;
        }
        self.touches as f64 / self.fetches as f64
    }
}

#[derive(Debug, Clone)]
pub struct MruQueue {
    upper_limit: u32,
    section_size: usize,
    sections: Vec<Section>,
    stats: FetchStats,
}

impl MruQueue {
    /// Creates a queue holding `1..=upper_limit` in ascending order.
    pub fn new(upper_limit: u32) -> Result<Self> {
        if upper_limit == 0 {
            return Err(Error::InvalidArgument("upper limit must be positive"));
        }
        let (section_size, section_count) = layout(upper_limit)?;

        let size = section_size as u64;
        let limit = u64::from(upper_limit);
        let mut sections = Vec::with_capacity(section_count);
        for index in 0..section_count as u64 {
            let first = index * size + 1;
            let last = (first + size - 1).min(limit);
            sections.push(Section::new((first as u32..=last as u32).collect())?);
        }

        log::debug!(
            "mru queue created: upper_limit={} section_size={} sections={} last_section={}",
            upper_limit,
            section_size,
            section_count,
            sections.last().map_or(0, Section::capacity)
        );

        Ok(Self {
            upper_limit,
            section_size,
            sections,
            stats: FetchStats::default(),
        })
    }

    /// Returns the value at 1-based `position` and moves it to the back.
    ///
    /// Every value after `position` shifts one place toward the front. The
    /// queue is left untouched when `position` is out of range.
    pub fn fetch(&mut self, position: u32) -> Result<u32> {
        let (owner, offset) = self.locate(position)?;

        let section = &mut self.sections[owner];
        let gap = section.physical_index(offset);
        let value = section.value_at(offset);
        let moved = section.close_gap_at(gap);

        let last = self.sections.len() - 1;
        for index in owner..last {
            let donated = self.sections[index + 1].head_value();
            self.sections[index].set_tail_value(donated);
            let next = &mut self.sections[index + 1];
            next.advance_head();
            next.advance_tail();
        }
        self.sections[last].set_tail_value(value);

        let touches = 2 + moved as u64 + (last - owner) as u64;
        self.stats.record(touches);
        log::trace!(
            "fetch position={} value={} section={} touches={}",
            position,
            value,
            owner,
            touches
        );
        Ok(value)
    }

    /// Reads the value at 1-based `position` without reordering.
    pub fn get(&self, position: u32) -> Option<u32> {
        let (owner, offset) = self.locate(position).ok()?;
        Some(self.sections[owner].value_at(offset))
    }

    pub fn len(&self) -> usize {
        self.upper_limit as usize
    }

    /// Always false: a queue holds at least one value.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn upper_limit(&self) -> u32 {
        self.upper_limit
    }

    pub fn section_size(&self) -> usize {
        self.section_size
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Values in current logical order, front to back.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.sections.iter().flat_map(|section| section.iter())
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = FetchStats::default();
    }

    /// Checks that the section layout holds and that the contents are a
    /// permutation of `1..=upper_limit`.
    pub fn validate_invariants(&self) -> Result<()> {
        let count = self.sections.len();
        let mut total = 0usize;
        for (index, section) in self.sections.iter().enumerate() {
            let capacity = section.capacity();
            let sized = if index + 1 < count {
                capacity == self.section_size
            } else {
                capacity > 0 && capacity <= self.section_size
            };
            if !sized {
                return Err(Error::Corrupt(format!(
                    "section {index} has capacity {capacity}"
                )));
            }
            if section.tail() != (section.head() + capacity - 1) % capacity {
                return Err(Error::Corrupt(format!(
                    "section {index} tail out of step with head"
                )));
            }
            total += capacity;
        }
        if total != self.len() {
            return Err(Error::Corrupt(format!(
                "section sizes sum to {total}, expected {}",
                self.len()
            )));
        }

        let mut seen = vec![false; self.len()];
        for value in self.iter() {
            if !(1..=self.upper_limit).contains(&value) {
                return Err(Error::Corrupt(format!("value {value} outside universe")));
            }
            let slot = &mut seen[value as usize - 1];
            if *slot {
                return Err(Error::Corrupt(format!("value {value} duplicated")));
            }
            *slot = true;
        }
        Ok(())
    }

    fn locate(&self, position: u32) -> Result<(usize, usize)> {
        if position == 0 || position > self.upper_limit {
            return Err(Error::IndexOutOfRange {
                position,
                len: self.upper_limit,
            });
        }
        let index = (position - 1) as usize;
        Ok((index / self.section_size, index % self.section_size))
    }
}

impl fmt::Display for MruQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 32;
        write!(f, "[")?;
        for (i, value) in self.iter().take(SHOWN).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        if self.len() > SHOWN {
            write!(f, ", ... ({} total)", self.len())?;
        }
        write!(f, "]")
    }
}

/// Section size `ceil(sqrt(n))` and count `ceil(n / size)`.
fn layout(upper_limit: u32) -> Result<(usize, usize)> {
    let limit = u64::from(upper_limit);
    let size = ceil_sqrt(limit);
    let count = limit.div_ceil(size);
    let size = usize::try_from(size)
        .map_err(|_| Error::InvalidArgument("section size exceeds usize"))?;
    let count = usize::try_from(count)
        .map_err(|_| Error::InvalidArgument("section count exceeds usize"))?;
    usize::try_from(upper_limit)
        .map_err(|_| Error::InvalidArgument("upper limit exceeds usize"))?;
    Ok((size, count))
}

fn ceil_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Newton iteration for floor(sqrt(n)).
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    if x * x == n {
        x
    } else {
        x + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_sqrt_matches_float_for_small_inputs() {
        for n in 1..10_000u64 {
            let expected = (n as f64).sqrt().ceil() as u64;
            assert_eq!(ceil_sqrt(n), expected, "n = {n}");
        }
        assert_eq!(ceil_sqrt(u64::from(u32::MAX)), 65_536);
    }

    #[test]
    fn layout_for_eight() {
        let queue = MruQueue::new(8).expect("queue");
        assert_eq!(queue.section_size(), 3);
        assert_eq!(queue.section_count(), 3);
        let sizes: Vec<usize> = queue.sections().iter().map(Section::capacity).collect();
        assert_eq!(sizes, vec![3, 3, 2]);
        assert_eq!(queue.to_vec(), (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn layout_for_perfect_square() {
        let queue = MruQueue::new(16).expect("queue");
        assert_eq!(queue.section_size(), 4);
        let sizes: Vec<usize> = queue.sections().iter().map(Section::capacity).collect();
        assert_eq!(sizes, vec![4, 4, 4, 4]);
    }

    #[test]
    fn layout_with_divisible_non_square() {
        // ceil(sqrt(6)) = 3, two full sections, no remainder.
        let queue = MruQueue::new(6).expect("queue");
        let sizes: Vec<usize> = queue.sections().iter().map(Section::capacity).collect();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn zero_upper_limit_is_rejected() {
        assert!(matches!(MruQueue::new(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn fetch_in_last_section_skips_ripple() {
        let mut queue = MruQueue::new(8).expect("queue");
        assert_eq!(queue.fetch(7).expect("fetch"), 7);
        assert_eq!(queue.to_vec(), vec![1, 2, 3, 4, 5, 6, 8, 7]);
        assert_eq!(queue.stats().last_touches, 3);
        queue.validate_invariants().expect("invariants");
    }

    #[test]
    fn validation_reports_duplicated_value() {
        let mut queue = MruQueue::new(9).expect("queue");
        queue.validate_invariants().expect("fresh queue");
        // Overwrite the last slot of the first section with a value that is
        // already present elsewhere.
        queue.sections[0].set_tail_value(5);
        assert_eq!(
            queue.validate_invariants(),
            Err(Error::Corrupt("value 5 duplicated".to_string()))
        );
    }

    #[test]
    fn get_does_not_reorder() {
        let mut queue = MruQueue::new(5).expect("queue");
        queue.fetch(1).expect("fetch");
        assert_eq!(queue.get(1), Some(2));
        assert_eq!(queue.get(5), Some(1));
        assert_eq!(queue.get(0), None);
        assert_eq!(queue.get(6), None);
        assert_eq!(queue.to_vec(), vec![2, 3, 4, 5, 1]);
    }

    #[test]
    fn stats_accumulate_and_reset() {
        let mut queue = MruQueue::new(9).expect("queue");
        queue.fetch(1).expect("fetch");
        // read + two gap moves + two ripple steps + final write
        assert_eq!(queue.stats().last_touches, 6);
        queue.fetch(9).expect("fetch");
        let stats = queue.stats();
        assert_eq!(stats.fetches, 2);
        assert_eq!(stats.touches, 8);
        assert_eq!(stats.max_touches, 6);
        assert_eq!(stats.mean_touches(), 4.0);
        queue.reset_stats();
        assert_eq!(queue.stats(), FetchStats::default());
    }

    #[test]
    fn display_truncates_long_queues() {
        let queue = MruQueue::new(4).expect("queue");
        assert_eq!(queue.to_string(), "[1, 2, 3, 4]");
        let queue = MruQueue::new(40).expect("queue");
        let text = queue.to_string();
        assert!(text.starts_with("[1, 2, 3"));
        assert!(text.ends_with(", 32, ... (40 total)]"));
    }
}
