use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Output slot shared between a task and its [`JoinHandle`].
pub(crate) struct JoinSlot<T> {
    output: RefCell<Option<T>>,
    finished: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl<T> JoinSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            output: RefCell::new(None),
            finished: Cell::new(false),
            waker: RefCell::new(None),
        }
    }

    /// Stores the task output and wakes the task awaiting the handle.
    pub(crate) fn complete(&self, value: T) {
        *self.output.borrow_mut() = Some(value);
        self.finished.set(true);

        let waker = self.waker.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// A handle to a spawned task.
///
/// Awaiting the handle yields the task's output. Dropping it does not
/// cancel the task; the output is simply discarded.
pub struct JoinHandle<T> {
    pub(crate) slot: Rc<JoinSlot<T>>,
}

impl<T> JoinHandle<T> {
    /// Returns `true` once the task has produced its output.
    pub fn is_finished(&self) -> bool {
        self.slot.finished.get()
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if polled again after it returned the output.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(value) = self.slot.output.borrow_mut().take() {
            return Poll::Ready(value);
        }

        assert!(!self.slot.finished.get(), "JoinHandle polled after completion");

        *self.slot.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}
