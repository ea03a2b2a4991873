use super::error::SyncError;
use super::refcount::{RefCount, RefCounted};
use super::synchronizer::Synchronizer;

use std::cell::OnceCell;
use std::fmt;

/// A value that is set once and then read by any number of tasks.
///
/// Tasks that wait before the value is set are all woken by
/// [`set`](Self::set); tasks that arrive afterwards never block. The
/// default `Latch<()>` carries no payload and only signals readiness.
///
/// # Examples
///
/// ```rust,ignore
/// let latch = Rc::new(Latch::new());
///
/// let reader = latch.clone();
/// task::spawn(async move {
///     assert_eq!(*reader.value().await, 42);
/// });
///
/// latch.set(42)?;
/// ```
pub struct Latch<T = ()> {
    base: Synchronizer,
    slot: OnceCell<T>,
}

impl<T> Latch<T> {
    pub fn new() -> Self {
        Self::named("Latch")
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            base: Synchronizer::new(name),
            slot: OnceCell::new(),
        }
    }

    /// Returns `true` once a value has been set.
    pub fn valid(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Waits until a value has been set.
    pub async fn wait(&self) {
        while !self.valid() {
            self.base.block_broadcast().await;
        }
    }

    /// Stores `value` and wakes every waiting task.
    ///
    /// # Errors
    ///
    /// [`SyncError::AlreadySet`] if a value was set before. The stored
    /// value is kept and `value` is dropped.
    pub fn set(&self, value: T) -> Result<(), SyncError> {
        self.slot.set(value).map_err(|_| SyncError::AlreadySet)?;
        self.base.unblock_all();

        Ok(())
    }

    /// Waits for the value and returns a reference to it.
    pub async fn value(&self) -> &T {
        loop {
            if let Some(value) = self.slot.get() {
                return value;
            }

            self.base.block_broadcast().await;
        }
    }

    /// The value, if it has been set.
    pub fn try_get(&self) -> Option<&T> {
        self.slot.get()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.base
    }
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RefCounted for Latch<T> {
    fn ref_count(&self) -> &RefCount {
        self.base.ref_count()
    }
}

impl<T: fmt::Debug> fmt::Debug for Latch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Latch")
            .field("sync", &self.base)
            .field("value", &self.slot.get())
            .finish()
    }
}
