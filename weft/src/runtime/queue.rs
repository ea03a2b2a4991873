use crate::runtime::task::Task;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// The ready set: a FIFO queue of tasks waiting to be polled.
///
/// Tasks are appended in the order they are woken, so a synchronizer that
/// releases its waiters front to back also has them resumed front to back.
///
/// The queue is mutex-protected because wakers are `Send` and may be
/// invoked from any thread, even though the tasks themselves only ever
/// run on the runtime thread.
pub(crate) struct RunQueue {
    queue: Mutex<VecDeque<Arc<Task>>>,
}

impl RunQueue {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Task>>> {
        // A panic while holding the lock cannot leave the deque in a
        // torn state, so a poisoned lock is still usable.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn push(&self, task: Arc<Task>) {
        self.lock().push_back(task);
    }

    pub(crate) fn pop(&self) -> Option<Arc<Task>> {
        self.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn clear(&self) {
        let drained: Vec<_> = self.lock().drain(..).collect();
        drop(drained);
    }
}
