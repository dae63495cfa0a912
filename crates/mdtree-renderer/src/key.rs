//! Identity key generation.
//!
//! Paragraph, emphasis and list-item nodes receive a key from a monotonically
//! increasing counter. In production the counter is process-wide: it is never
//! reset, it is shared by every render call and by nested inline processing,
//! and increments are atomic so concurrent renders never hand out the same key.
//! Tests can use [`KeyGenerator::isolated`] to get a private counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::node::Key;

static GLOBAL: OnceLock<KeyGenerator> = OnceLock::new();

/// Shared, strictly increasing key counter.
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    counter: Arc<AtomicU64>,
}

impl KeyGenerator {
    /// Handle to the process-wide counter.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.get_or_init(Self::isolated).clone()
    }

    /// A new counter, independent from the process-wide one.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Issue the next key. The first key of a fresh counter is 1.
    pub fn next_key(&self) -> Key {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Last issued key (0 if none).
    #[must_use]
    pub fn last_key(&self) -> Key {
        self.counter.load(Ordering::Relaxed)
    }

    /// Whether two handles share the same counter.
    #[must_use]
    pub fn shares_counter_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.counter, &other.counter)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::global()
    }
}
