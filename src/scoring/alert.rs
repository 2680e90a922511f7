//! # Alert State
//!
//! Per-call record of which forts are on high alert. The flag for a fort
//! only ever goes `false -> true`; nothing resets it. Each fort also carries
//! a version counter that increments exactly once, on that transition, so
//! cached scores can be recognised as stale.

/// Monotonic alert flags plus transition versions, indexed by fort.
#[derive(Debug, Clone)]
pub struct AlertState {
    alerted: Vec<bool>,
    versions: Vec<u32>,
    count: usize,
}

impl AlertState {
    /// A state for `n` forts, none alerted.
    pub fn new(n: usize) -> Self {
        Self {
            alerted: vec![false; n],
            versions: vec![0; n],
            count: 0,
        }
    }

    pub fn is_alerted(&self, idx: usize) -> bool {
        self.alerted[idx]
    }

    /// Put a fort on alert. Returns true if the flag flipped on this call.
    pub fn mark(&mut self, idx: usize) -> bool {
        if self.alerted[idx] {
            return false;
        }
        self.alerted[idx] = true;
        self.versions[idx] += 1;
        self.count += 1;
        true
    }

    /// Number of times the fort's alert flag has changed (0 or 1).
    pub fn version(&self, idx: usize) -> u32 {
        self.versions[idx]
    }

    /// How many forts are currently on alert.
    pub fn alerted_count(&self) -> usize {
        self.count
    }
}
