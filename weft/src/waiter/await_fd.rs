use super::core::Waiter;
use crate::io::sys::PollFd;
use crate::runtime::context;

use std::cell::RefCell;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Instant;

/// A descriptor wait registered with the [`Waiter`].
///
/// Holds a copy of the caller's descriptors; `revents` are written back to
/// the caller when the wait completes.
pub(crate) struct AwaitFd {
    fds: RefCell<Vec<PollFd>>,
    deadline: Option<Instant>,
    outcome: RefCell<Option<io::Result<usize>>>,
    waker: RefCell<Waker>,
}

impl AwaitFd {
    fn new(fds: &[PollFd], deadline: Option<Instant>, waker: Waker) -> Self {
        Self {
            fds: RefCell::new(fds.iter().map(PollFd::cleared).collect()),
            deadline,
            outcome: RefCell::new(None),
            waker: RefCell::new(waker),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.fds.borrow().len()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn copy_into(&self, out: &mut Vec<PollFd>) {
        out.extend(self.fds.borrow().iter().map(PollFd::cleared));
    }

    pub(crate) fn store_revents(&self, fired: &[PollFd]) {
        for (slot, fired) in self.fds.borrow_mut().iter_mut().zip(fired) {
            slot.set_revents(fired.revents());
        }
    }

    pub(crate) fn clear_revents(&self) {
        for slot in self.fds.borrow_mut().iter_mut() {
            slot.set_revents(0);
        }
    }

    /// Records the result and wakes the waiting task.
    pub(crate) fn complete(&self, result: io::Result<usize>) {
        *self.outcome.borrow_mut() = Some(result);
        self.waker.borrow().wake_by_ref();
    }

    fn take_outcome(&self) -> Option<io::Result<usize>> {
        self.outcome.borrow_mut().take()
    }

    fn update_waker(&self, waker: &Waker) {
        let mut slot = self.waker.borrow_mut();
        if !slot.will_wake(waker) {
            *slot = waker.clone();
        }
    }
}

/// Suspends the current task until one of `fds` is ready or `deadline`
/// passes.
///
/// Resolves to the number of descriptors with non-zero `revents`, `0` on
/// timeout. The `revents` of `fds` are updated on completion.
pub(crate) fn wait_fd(fds: &mut [PollFd], deadline: Option<Instant>) -> WaitFd<'_> {
    WaitFd {
        fds,
        deadline,
        state: WaitState::Idle,
    }
}

enum WaitState {
    Idle,
    Registered {
        waiter: Rc<RefCell<Waiter>>,
        token: usize,
        wait: Rc<AwaitFd>,
    },
    Done,
}

/// Future returned by [`wait_fd`].
///
/// Dropping it before completion withdraws the wait from the waiter.
pub(crate) struct WaitFd<'a> {
    fds: &'a mut [PollFd],
    deadline: Option<Instant>,
    state: WaitState,
}

impl Future for WaitFd<'_> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match &this.state {
            WaitState::Idle => {
                let Some(handle) = context::current() else {
                    return Poll::Ready(Err(io::Error::other("polled outside of a weft runtime")));
                };

                let wait = Rc::new(AwaitFd::new(this.fds, this.deadline, cx.waker().clone()));
                let token = handle.waiter.borrow_mut().register(wait.clone());

                this.state = WaitState::Registered {
                    waiter: handle.waiter,
                    token,
                    wait,
                };

                Poll::Pending
            }
            WaitState::Registered { wait, .. } => match wait.take_outcome() {
                Some(result) => {
                    if result.is_ok() {
                        for (out, fired) in this.fds.iter_mut().zip(wait.fds.borrow().iter()) {
                            out.set_revents(fired.revents());
                        }
                    }

                    this.state = WaitState::Done;
                    Poll::Ready(result)
                }
                None => {
                    wait.update_waker(cx.waker());
                    Poll::Pending
                }
            },
            WaitState::Done => panic!("WaitFd polled after completion"),
        }
    }
}

impl Drop for WaitFd<'_> {
    fn drop(&mut self) {
        if let WaitState::Registered {
            waiter,
            token,
            wait,
        } = &self.state
        {
            waiter.borrow_mut().cancel(*token, wait);
        }
    }
}
