//! Identifier generation
//!
//! Stored records get integer ids from an [`IdSequence`] owned by their store.
//! Unstored roadmap plans get timestamp-derived string ids from
//! [`TimestampIds`]. Neither survives a restart.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic integer sequence starting at 1
///
/// Not synchronized: the owner must hold its own lock while issuing ids.
#[derive(Debug)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next id
    pub fn issue(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next `issue` call will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// `<prefix>-<unix millis>` ids, strictly increasing within a process
///
/// Two calls in the same millisecond get consecutive values rather than
/// colliding.
#[derive(Debug)]
pub struct TimestampIds {
    prefix: &'static str,
    last: AtomicI64,
}

impl TimestampIds {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format!("{}-{}", self.prefix, candidate),
                Err(observed) => current = observed,
            }
        }
    }
}
