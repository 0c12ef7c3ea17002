//! Fixed-capacity ring buffer for recent readings
//!
//! The aggregator keeps a sliding window of the most recent readings
//! (capacity [`crate::constants::HISTORY_CAPACITY`]). When the ring is full,
//! a push silently evicts the oldest entry; recent data is always worth more
//! than old data here, and the durable log retains everything anyway.
//!
//! Invariants:
//! - `write_pos < N` (next write position is always valid)
//! - `len <= N`
//! - Iteration and [`HistoryBuffer::to_vec`] yield chronological order,
//!   oldest first.

use crate::reading::Reading;

/// Fixed-size FIFO ring of [`Reading`]s, oldest evicted first.
///
/// Capacity is a compile-time constant; the buffer never allocates on push.
/// Not internally synchronized: the aggregator guards it together with the
/// rest of the state under one lock.
#[derive(Clone)]
pub struct HistoryBuffer<const N: usize> {
    /// Storage slots; `None` until written once
    slots: [Option<Reading>; N],
    /// Index of the next write, wraps at N
    write_pos: usize,
    /// Number of valid readings, saturates at N
    len: usize,
}

impl<const N: usize> HistoryBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Append a reading, evicting the oldest when full.
    pub fn push(&mut self, reading: Reading) {
        self.slots[self.write_pos] = Some(reading);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of stored readings.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no readings.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next push will evict.
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recently pushed reading.
    pub fn last(&self) -> Option<&Reading> {
        if self.is_empty() {
            return None;
        }

        // Most recent is one before the write position
        let idx = if self.write_pos == 0 {
            N - 1
        } else {
            self.write_pos - 1
        };

        self.slots[idx].as_ref()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        (0..self.len).filter_map(|i| self.get(i))
    }

    /// Owned chronological copy, oldest first.
    ///
    /// Snapshots hand this out so callers never hold a reference into the
    /// live ring.
    pub fn to_vec(&self) -> Vec<Reading> {
        self.iter().copied().collect()
    }

    /// Map a logical index (0 = oldest) to a slot.
    ///
    /// Until the ring wraps, logical and physical indices match; once full,
    /// the oldest entry sits at `write_pos`.
    fn get(&self, index: usize) -> Option<&Reading> {
        if index >= self.len {
            return None;
        }

        let slot = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.slots[slot].as_ref()
    }
}

impl<const N: usize> Default for HistoryBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
