/// Task is parked and not scheduled.
///
/// The task exists but waits for a waker to put it back on the run queue.
pub(crate) const IDLE: usize = 0;

/// Task sits in the run queue.
pub(crate) const QUEUED: usize = 1;

/// Task is being polled by the run loop.
pub(crate) const RUNNING: usize = 2;

/// The future returned `Poll::Ready` and has been dropped.
pub(crate) const COMPLETED: usize = 3;

/// Task was woken while running.
///
/// It goes back to the run queue as soon as the current poll returns.
pub(crate) const NOTIFIED: usize = 4;

/// The runtime shut down before the task completed.
///
/// Its future has been dropped and it will never be polled again.
pub(crate) const CANCELLED: usize = 5;
