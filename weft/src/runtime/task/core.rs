use super::JoinHandle;
use super::handle::JoinSlot;
use super::id::TaskId;
use super::state::{CANCELLED, COMPLETED, IDLE, NOTIFIED, QUEUED, RUNNING};
use crate::runtime::context;
use crate::runtime::queue::RunQueue;
use crate::runtime::task::waker::make_waker;

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tracing::trace;

type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

/// A spawned task owned by the runtime.
///
/// The task wraps a type-erased future whose output has already been
/// routed to a [`JoinSlot`]. Its state machine decides whether a wake-up
/// pushes it onto the run queue or just marks it for another poll.
pub(crate) struct Task {
    id: TaskId,

    /// Key of this task in the runtime's task registry.
    key: usize,

    /// The future, `None` once completed or cancelled.
    future: RefCell<Option<LocalFuture>>,

    /// Lifecycle state (`IDLE`, `QUEUED`, ...).
    pub(crate) state: AtomicUsize,

    /// Run queue the task is pushed onto when woken.
    queue: Arc<RunQueue>,
}

// Safety: the future is only touched by the runtime thread, in `run` and
// `cancel`. Wakers handed to other threads reach `wake`, which only uses
// the atomic state and the mutex-protected run queue. The future is
// dropped on the runtime thread, either on completion or when the
// runtime cancels remaining tasks.
unsafe impl Send for Task {}
unsafe impl Sync for Task {}

impl Task {
    fn new(id: TaskId, key: usize, future: LocalFuture, queue: Arc<RunQueue>) -> Self {
        Self {
            id,
            key,
            future: RefCell::new(Some(future)),
            state: AtomicUsize::new(QUEUED),
            queue,
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn key(&self) -> usize {
        self.key
    }

    /// Polls the task once.
    ///
    /// Returns `true` when the task is finished and can be dropped from the
    /// registry.
    pub(crate) fn run(self: &Arc<Self>) -> bool {
        let current = self.state.load(Ordering::Acquire);

        if current == CANCELLED || current == COMPLETED {
            return true;
        }

        if current != QUEUED && current != NOTIFIED {
            return false;
        }

        if self
            .state
            .compare_exchange(current, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        let poll = {
            let mut slot = self.future.borrow_mut();
            match slot.as_mut() {
                Some(future) => future.as_mut().poll(&mut cx),
                None => Poll::Ready(()),
            }
        };

        match poll {
            Poll::Pending => {
                if self
                    .state
                    .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Woken during its own poll: straight back to the queue.
                    self.state.store(QUEUED, Ordering::Release);
                    self.queue.push(self.clone());
                }
                false
            }
            Poll::Ready(()) => {
                self.state.store(COMPLETED, Ordering::Release);

                let finished = self.future.borrow_mut().take();
                drop(finished);

                trace!(target: "weft::runtime", task = %self.id, "completed");
                true
            }
        }
    }

    /// Re-admits the task to the run queue.
    ///
    /// An idle task is queued; a running task is marked `NOTIFIED` so the
    /// run loop queues it again once the current poll returns.
    pub(crate) fn wake(self: Arc<Self>) {
        loop {
            let state = self.state.load(Ordering::Acquire);

            match state {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.queue.push(self.clone());
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Drops the future of a task that will never complete.
    ///
    /// Called by the runtime on shutdown, inside the runtime context so
    /// that the future's destructors can deregister from synchronizers and
    /// from the waiter.
    pub(crate) fn cancel(&self) {
        let previous = self.state.swap(CANCELLED, Ordering::AcqRel);

        if previous == COMPLETED {
            return;
        }

        let future = self.future.borrow_mut().take();
        drop(future);

        trace!(target: "weft::runtime", task = %self.id, "cancelled");
    }
}

/// Spawns a future as a new task on the current runtime.
///
/// The future does not need to be `Send`: every task runs on the thread
/// that drives the runtime. The returned [`JoinHandle`] resolves to the
/// future's output.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    let handle = context::current().expect("spawn must be called within the context of a runtime");

    let slot = Rc::new(JoinSlot::new());
    let output = slot.clone();

    let wrapped: LocalFuture = Box::pin(async move {
        output.complete(future.await);
    });

    let task = {
        let mut tasks = handle.tasks.borrow_mut();
        let task = Arc::new(Task::new(
            TaskId::next(),
            tasks.vacant_key(),
            wrapped,
            handle.queue.clone(),
        ));
        tasks.insert(task.clone());
        task
    };

    trace!(
        target: "weft::runtime",
        task = %task.id,
        parent = %context::current_task(),
        "spawned"
    );

    handle.queue.push(task);

    JoinHandle { slot }
}
