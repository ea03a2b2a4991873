use super::error::SyncError;
use super::refcount::{RefCount, RefCounted};
use super::synchronizer::Synchronizer;

use std::cell::Cell;
use std::fmt;

use tracing::warn;

/// A counting semaphore.
///
/// Requests larger than the current count are filled piecemeal: the
/// requester takes whatever is available, waits, and takes more on every
/// release until its request is complete.
pub struct Semaphore {
    base: Synchronizer,
    count: Cell<usize>,
}

impl Semaphore {
    pub fn new(value: usize) -> Self {
        Self::named("Semaphore", value)
    }

    /// Creates a semaphore that shows up as `name` in diagnostics.
    pub fn named(name: &'static str, value: usize) -> Self {
        Self {
            base: Synchronizer::new(name),
            count: Cell::new(value),
        }
    }

    /// Takes `n` units, suspending until all of them are available.
    ///
    /// If a remainder is left after the request is filled, the next waiter
    /// is woken to try its own request against it. Dropping the future
    /// before it completes gives back whatever it had taken so far.
    pub async fn acquire(&self, n: usize) {
        let mut partial = Partial {
            sem: self,
            taken: 0,
        };
        let mut wanted = n;

        while wanted > 0 {
            let count = self.count.get();

            if wanted <= count {
                self.take(wanted);
                partial.taken = 0;
                return;
            }

            wanted -= count;
            partial.taken += count;
            self.count.set(0);

            self.base.block().await;
        }
    }

    /// Takes `n` units if they are all available right now.
    pub fn try_acquire(&self, n: usize) -> bool {
        if n > self.count.get() {
            return false;
        }

        self.take(n);
        true
    }

    /// Returns `n` units and wakes the longest waiter.
    ///
    /// The count saturates at `usize::MAX` instead of wrapping.
    ///
    /// # Errors
    ///
    /// [`SyncError::Overflow`] if the count saturated. The count is still
    /// clamped and a waiter is still woken.
    pub fn release(&self, n: usize) -> Result<(), SyncError> {
        let (count, saturated) = match self.count.get().checked_add(n) {
            Some(count) => (count, false),
            None => (usize::MAX, true),
        };

        self.count.set(count);

        if count > 0 {
            self.base.unblock_first();
        }

        if saturated {
            warn!(target: "weft::sync", "[{}] release({n}) saturated", self.base);
            return Err(SyncError::Overflow);
        }

        Ok(())
    }

    /// Current count. Diagnostic only, may be stale as soon as the caller
    /// suspends.
    pub fn value(&self) -> usize {
        self.count.get()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.base
    }

    fn take(&self, n: usize) {
        let left = self.count.get() - n;
        self.count.set(left);

        if left > 0 {
            self.base.unblock_first();
        }
    }
}

/// Units taken by an acquire that has not completed yet.
struct Partial<'a> {
    sem: &'a Semaphore,
    taken: usize,
}

impl Drop for Partial<'_> {
    fn drop(&mut self) {
        if self.taken > 0 {
            let _ = self.sem.release(self.taken);
        }
    }
}

impl RefCounted for Semaphore {
    fn ref_count(&self) -> &RefCount {
        self.base.ref_count()
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("sync", &self.base)
            .field("count", &self.count.get())
            .finish()
    }
}
