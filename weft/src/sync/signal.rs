use super::refcount::{RefCount, RefCounted};
use super::synchronizer::{Block, Synchronizer};

use std::fmt;

/// A broadcast-only condition.
///
/// A signal carries no state: raising it with nobody waiting has no
/// effect, and a task that starts waiting afterwards waits for the next
/// one.
pub struct Signal {
    base: Synchronizer,
}

impl Signal {
    pub fn new() -> Self {
        Self::named("Signal")
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            base: Synchronizer::new(name),
        }
    }

    /// Waits for the next [`signal`](Self::signal) or
    /// [`signal_all`](Self::signal_all).
    pub fn wait(&self) -> Block<'_> {
        self.base.block_broadcast()
    }

    /// Wakes the longest-waiting task. Returns `false` if none was waiting.
    pub fn signal(&self) -> bool {
        self.base.unblock_first()
    }

    /// Wakes every waiting task and returns how many there were.
    pub fn signal_all(&self) -> usize {
        self.base.unblock_all()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.base
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefCounted for Signal {
    fn ref_count(&self) -> &RefCount {
        self.base.ref_count()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&self.base).finish()
    }
}
