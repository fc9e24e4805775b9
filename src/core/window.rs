//! Bounded sliding window over behavioral samples.
//!
//! Insertion order is temporal order. The window is owned exclusively by
//! one session and mutated only inside its tick body.

use crate::source::types::BehavioralSample;

/// Order-preserving buffer holding at most `capacity` samples.
#[derive(Debug)]
pub struct SlidingWindowBuffer {
    samples: Vec<BehavioralSample>,
    capacity: usize,
}

impl SlidingWindowBuffer {
    /// Create a window with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append to the tail, evicting oldest-first until length <= capacity.
    ///
    /// Never blocks or fails; appending to a full window always succeeds.
    pub fn append(&mut self, sample: BehavioralSample) {
        self.samples.push(sample);
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(0..excess);
        }
    }

    /// The most recent `n` samples, oldest first, or fewer if unavailable.
    pub fn latest(&self, n: usize) -> &[BehavioralSample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// Current number of buffered samples.
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all buffered samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
