use super::refcount::{RefCount, RefCounted};
use crate::runtime::context;
use crate::runtime::task::TaskId;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, Waker};

use tracing::trace;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A task parked on a wait queue.
struct Parked {
    task: TaskId,
    waker: RefCell<Waker>,
    woken: Cell<bool>,
}

/// The wait queue every primitive is built on.
///
/// A task parks itself with [`block`](Self::block) and stays parked until
/// [`unblock_first`](Self::unblock_first) or
/// [`unblock_all`](Self::unblock_all) reaches it. Tasks are released in the
/// order they blocked and re-enter the ready set in that order.
pub struct Synchronizer {
    id: u64,
    name: &'static str,
    refs: RefCount,
    queue: RefCell<VecDeque<Rc<Parked>>>,
}

impl Synchronizer {
    pub fn new(name: &'static str) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
            refs: RefCount::new(),
            queue: RefCell::new(VecDeque::new()),
        }
    }

    /// Process-unique id, used in diagnostics.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of parked tasks.
    pub fn waiting(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Parks the current task at the back of the queue until it is
    /// unblocked.
    ///
    /// A task that is woken but dropped before it runs again passes its
    /// wake-up on to the next parked task, so no release is ever lost.
    pub fn block(&self) -> Block<'_> {
        Block {
            sync: self,
            state: BlockState::Idle,
            forward: true,
        }
    }

    /// Like [`block`](Self::block), but a wake-up consumed by a dropped
    /// waiter is not passed on. For primitives whose wake-ups are
    /// broadcasts rather than hand-offs.
    pub fn block_broadcast(&self) -> Block<'_> {
        Block {
            sync: self,
            state: BlockState::Idle,
            forward: false,
        }
    }

    /// Wakes the longest-waiting task. Returns `false` if none was parked.
    pub fn unblock_first(&self) -> bool {
        let parked = self.queue.borrow_mut().pop_front();

        match parked {
            Some(parked) => {
                trace!(target: "weft::sync", "[{}] unblock {}", self, parked.task);

                parked.woken.set(true);
                parked.waker.borrow().wake_by_ref();
                true
            }
            None => false,
        }
    }

    /// Wakes every parked task, in blocking order. Returns how many were
    /// woken.
    pub fn unblock_all(&self) -> usize {
        let mut woken = 0;
        while self.unblock_first() {
            woken += 1;
        }
        woken
    }

    fn park(&self, parked: Rc<Parked>) {
        trace!(target: "weft::sync", "[{}] block {}", self, parked.task);
        self.queue.borrow_mut().push_back(parked);
    }

    fn unpark(&self, parked: &Rc<Parked>) {
        self.queue
            .borrow_mut()
            .retain(|queued| !Rc::ptr_eq(queued, parked));
    }
}

impl RefCounted for Synchronizer {
    fn ref_count(&self) -> &RefCount {
        &self.refs
    }
}

impl fmt::Display for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("waiting", &self.waiting())
            .finish()
    }
}

enum BlockState {
    Idle,
    Parked(Rc<Parked>),
    Done,
}

/// Future returned by [`Synchronizer::block`].
pub struct Block<'a> {
    sync: &'a Synchronizer,
    state: BlockState,
    forward: bool,
}

impl Future for Block<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        match &this.state {
            BlockState::Idle => {
                let parked = Rc::new(Parked {
                    task: context::current_task(),
                    waker: RefCell::new(cx.waker().clone()),
                    woken: Cell::new(false),
                });

                this.sync.park(parked.clone());
                this.state = BlockState::Parked(parked);

                Poll::Pending
            }
            BlockState::Parked(parked) => {
                if parked.woken.get() {
                    this.state = BlockState::Done;
                    return Poll::Ready(());
                }

                let mut waker = parked.waker.borrow_mut();
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }

                Poll::Pending
            }
            BlockState::Done => Poll::Ready(()),
        }
    }
}

impl Drop for Block<'_> {
    fn drop(&mut self) {
        if let BlockState::Parked(parked) = &self.state {
            if !parked.woken.get() {
                self.sync.unpark(parked);
            } else if self.forward {
                self.sync.unblock_first();
            }
        }
    }
}
