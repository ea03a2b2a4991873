use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::task::Waker;
use std::time::Instant;

/// A scheduled wake-up in the waiter's timer heap.
///
/// The entry is cancelled through the flag it shares with its
/// [`Sleep`](crate::time::Sleep) future; cancelled entries are skipped and
/// pruned lazily.
pub(crate) struct TimerEntry {
    pub(crate) deadline: Instant,
    pub(crate) waker: Waker,
    pub(crate) cancelled: Rc<Cell<bool>>,
}

impl TimerEntry {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline.eq(&other.deadline)
    }
}

impl Ord for TimerEntry {
    /// Reversed, so that a `BinaryHeap<TimerEntry>` pops the earliest
    /// deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
