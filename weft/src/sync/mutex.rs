use super::error::SyncError;
use super::refcount::{RefCount, RefCounted};
use super::synchronizer::Synchronizer;

use std::cell::Cell;
use std::fmt;

/// A mutual exclusion lock for cooperative tasks.
///
/// The mutex guards no data and tracks no owner: `lock` and `unlock` may be
/// called from different tasks. It is not reentrant, so a task that locks
/// a mutex it already holds waits forever.
///
/// # Examples
///
/// ```rust,ignore
/// let mutex = Mutex::new();
///
/// mutex.lock().await;
/// // critical section, may suspend
/// mutex.unlock()?;
/// ```
pub struct Mutex {
    base: Synchronizer,
    locked: Cell<bool>,
}

impl Mutex {
    pub fn new() -> Self {
        Self::named("Mutex")
    }

    /// Creates a mutex that shows up as `name` in diagnostics.
    pub fn named(name: &'static str) -> Self {
        Self {
            base: Synchronizer::new(name),
            locked: Cell::new(false),
        }
    }

    /// Locks the mutex, suspending the task until it is available.
    ///
    /// A woken task checks the lock again before taking it; if another
    /// task got there first it goes back to waiting.
    pub async fn lock(&self) {
        while self.locked.get() {
            self.base.block().await;
        }

        self.locked.set(true);
    }

    /// Locks the mutex if it is free. Never suspends.
    pub fn try_lock(&self) -> bool {
        if self.locked.get() {
            return false;
        }

        self.locked.set(true);
        true
    }

    /// Unlocks the mutex and wakes the longest-waiting locker.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotLocked`] if the mutex is not locked.
    pub fn unlock(&self) -> Result<(), SyncError> {
        if !self.locked.get() {
            return Err(SyncError::NotLocked);
        }

        self.locked.set(false);
        self.base.unblock_first();

        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.base
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl RefCounted for Mutex {
    fn ref_count(&self) -> &RefCount {
        self.base.ref_count()
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("sync", &self.base)
            .field("locked", &self.locked.get())
            .finish()
    }
}
