//! Identity generation for newly created pets.
//!
//! The Petstore API does not allocate ids, so the client picks one before
//! sending the create request. Generators are injected so tests can use a
//! deterministic sequence.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of fresh pet ids.
pub trait IdGenerator: Send + Sync {
    /// Return an id that has not been handed out before.
    fn next_id(&self) -> i64;
}

/// Random positive ids taken from a v4 UUID (63 bits of entropy).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> i64 {
        let (high, _) = uuid::Uuid::new_v4().as_u64_pair();
        // Clear the sign bit; zero is reserved by some Petstore servers.
        let id = (high & (i64::MAX as u64)) as i64;
        if id == 0 { 1 } else { id }
    }
}

/// Monotonic counter starting at a fixed value.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    /// Create a counter whose first id is `start`.
    #[must_use]
    pub fn starting_at(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
