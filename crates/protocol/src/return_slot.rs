//! Single-slot, overwrite-on-write return channel
//!
//! The layout peer expects at most one pending response per request. Each
//! new computation overwrites whatever the slot held; the next read
//! consumes the slot. Last-write-wins, no queueing, no history.

use std::sync::Mutex;

/// Single-value mailbox with take-and-clear semantics
///
/// # Example
///
/// ```
/// use driftview_protocol::ReturnSlot;
///
/// let slot = ReturnSlot::new();
/// slot.put(1);
/// slot.put(2); // overwrites
///
/// assert_eq!(slot.take(), Some(2));
/// assert_eq!(slot.take(), None); // consumed
/// ```
#[derive(Debug, Default)]
pub struct ReturnSlot<T> {
    slot: Mutex<Option<T>>,
}

impl<T> ReturnSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Store a value, overwriting any pending one
    pub fn put(&self, value: T) {
        *self.slot.lock().unwrap() = Some(value);
    }

    /// Consume the pending value, leaving the slot empty
    ///
    /// The read and clear happen atomically; concurrent readers never
    /// observe the same value twice.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().unwrap().take()
    }

    /// Whether a value is pending
    pub fn is_empty(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}
