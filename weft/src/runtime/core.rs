use super::builder::Config;
use super::context::{self, Handle, enter_context};
use super::error::RuntimeError;
use super::queue::RunQueue;
use super::task::{self, JoinHandle, TaskId};
use crate::utils::Slab;
use crate::waiter::{Turn, Waiter};

use std::cell::RefCell;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Wake, Waker};

use tracing::debug;

/// A single-threaded cooperative runtime.
///
/// `Runtime` owns the ready queue, the registry of spawned tasks and the
/// [`Waiter`] that parks the thread on descriptors and timers when no task
/// is ready. Exactly one task runs at any instant and a task only gives up
/// the thread at a suspension point, so any code between two suspension
/// points is atomic with respect to every other task.
///
/// Dropping the runtime cancels every task that has not completed.
pub struct Runtime {
    handle: Handle,
}

/// Waker of the root future passed to `block_on`.
#[derive(Default)]
struct RootWaker {
    notified: AtomicBool,
}

impl RootWaker {
    fn take(&self) -> bool {
        self.notified.swap(false, Ordering::AcqRel)
    }

    fn is_notified(&self) -> bool {
        self.notified.load(Ordering::Acquire)
    }
}

impl Wake for RootWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.notified.store(true, Ordering::Release);
    }
}

impl Runtime {
    pub(crate) fn new(config: Config) -> Self {
        let handle = Handle {
            queue: Arc::new(RunQueue::new()),
            waiter: Rc::new(RefCell::new(Waiter::new(config.event_capacity))),
            tasks: Rc::new(RefCell::new(Slab::with_capacity(64))),
            config,
        };

        debug!(target: "weft::runtime", wrap_io = config.wrap_io, "runtime created");

        Self { handle }
    }

    /// Spawns a future onto the runtime.
    ///
    /// The task only makes progress while the runtime is driven by
    /// [`block_on`](Self::block_on).
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        enter_context(self.handle.clone(), || task::spawn(future))
    }

    /// Runs a future to completion on the current thread, driving every
    /// spawned task along the way.
    ///
    /// # Panics
    ///
    /// Panics on deadlock, see [`try_block_on`](Self::try_block_on).
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let result = runtime.block_on(async {
    ///     42
    /// });
    /// assert_eq!(result, 42);
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        match self.try_block_on(future) {
            Ok(value) => value,
            Err(err) => panic!("block_on failed: {err}"),
        }
    }

    /// Runs a future to completion, reporting a deadlock instead of
    /// panicking.
    ///
    /// A deadlock is detected when the root future is pending, no task is
    /// ready and the waiter has neither descriptors nor timers to wait for.
    /// Tasks blocked on a [`Mutex`](crate::sync::Mutex) or any other
    /// synchronizer wait indefinitely, so this is the only way such a
    /// runtime can stop.
    pub fn try_block_on<F: Future>(&self, future: F) -> Result<F::Output, RuntimeError> {
        let root = Arc::new(RootWaker::default());
        root.notified.store(true, Ordering::Release);

        let waker = Waker::from(root.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = pin!(future);

        enter_context(self.handle.clone(), || {
            loop {
                if root.take() {
                    let poll = context::enter_task(TaskId::ROOT, || future.as_mut().poll(&mut cx));
                    if let Poll::Ready(value) = poll {
                        return Ok(value);
                    }
                }

                self.run_ready();

                let busy = root.is_notified() || !self.handle.queue.is_empty();

                if busy {
                    // Keep due timers and ready descriptors flowing even
                    // when tasks never stop yielding.
                    let mut waiter = self.handle.waiter.borrow_mut();
                    if waiter.has_waits() {
                        waiter.turn(false);
                    }
                    continue;
                }

                let turn = self.handle.waiter.borrow_mut().turn(true);

                if turn == Turn::Idle && !root.is_notified() && self.handle.queue.is_empty() {
                    let tasks = self.handle.tasks.borrow().len();
                    debug!(target: "weft::runtime", tasks, "deadlock detected");

                    return Err(RuntimeError::Deadlock { tasks });
                }
            }
        })
    }

    /// Polls every task that is ready at the start of the batch.
    ///
    /// Tasks woken during the batch wait for the next one, so the root
    /// future gets a chance to run in between.
    fn run_ready(&self) {
        let batch = self.handle.queue.len();

        for _ in 0..batch {
            let Some(task) = self.handle.queue.pop() else {
                break;
            };

            if context::enter_task(task.id(), || task.run()) {
                self.handle.tasks.borrow_mut().try_remove(task.key());
            }
        }
    }
}

impl Drop for Runtime {
    /// Cancels every live task.
    ///
    /// Futures are dropped inside the runtime context so their destructors
    /// can leave wait queues and deregister from the waiter.
    fn drop(&mut self) {
        enter_context(self.handle.clone(), || {
            let tasks = self.handle.tasks.borrow_mut().drain();
            let cancelled = tasks.len();

            for task in &tasks {
                task.cancel();
            }

            self.handle.queue.clear();
            self.handle.waiter.borrow_mut().clear();

            debug!(target: "weft::runtime", cancelled, "runtime shut down");
        });
    }
}
