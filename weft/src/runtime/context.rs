use crate::runtime::builder::Config;
use crate::runtime::queue::RunQueue;
use crate::runtime::task::{Task, TaskId};
use crate::utils::Slab;
use crate::waiter::Waiter;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Everything a runtime component needs to reach the running runtime.
#[derive(Clone)]
pub(crate) struct Handle {
    /// The ready set.
    pub(crate) queue: Arc<RunQueue>,

    /// The descriptor and timer waiter.
    pub(crate) waiter: Rc<RefCell<Waiter>>,

    /// Live spawned tasks, keyed by [`Task::key`].
    pub(crate) tasks: Rc<RefCell<Slab<Arc<Task>>>>,

    pub(crate) config: Config,
}

thread_local! {
    /// Handle of the runtime driving this thread, if any.
    static CURRENT: RefCell<Option<Handle>> = const { RefCell::new(None) };

    /// Task currently being polled on this thread.
    static CURRENT_TASK: Cell<TaskId> = const { Cell::new(TaskId::ROOT) };
}

/// Restores the previously installed handle when dropped, so a panic
/// inside the runtime does not leave a stale context behind.
struct ContextGuard {
    previous: Option<Handle>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|cell| *cell.borrow_mut() = previous);
    }
}

/// Installs `handle` as the current runtime for the duration of `f`.
pub(crate) fn enter_context<R>(handle: Handle, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT.with(|cell| cell.borrow_mut().replace(handle));
    let _guard = ContextGuard { previous };

    f()
}

/// Returns a clone of the current runtime handle.
pub(crate) fn current() -> Option<Handle> {
    CURRENT.with(|cell| cell.borrow().clone())
}

/// Runs `f` with `task` recorded as the task being polled.
pub(crate) fn enter_task<R>(task: TaskId, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_TASK.with(|cell| cell.replace(task));
    let out = f();
    CURRENT_TASK.with(|cell| cell.set(previous));

    out
}

/// The task being polled on this thread, [`TaskId::ROOT`] outside tasks.
pub(crate) fn current_task() -> TaskId {
    CURRENT_TASK.with(Cell::get)
}
