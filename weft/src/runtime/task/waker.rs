use crate::runtime::task::Task;

use std::mem;
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Vtable for wakers backed by an `Arc<Task>`.
///
/// # Safety
///
/// Every function receives a pointer produced by `Arc::into_raw` and
/// keeps the strong count balanced: `clone` adds one reference, `wake`
/// and `drop` consume one, `wake_by_ref` leaves it unchanged.
static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Creates a [`Waker`] that puts `task` back on its run queue.
///
/// Waking only re-admits the task to the ready set; the run loop decides
/// when it is actually polled.
pub(crate) fn make_waker(task: Arc<Task>) -> Waker {
    unsafe { Waker::from_raw(RawWaker::new(Arc::into_raw(task) as *const (), &VTABLE)) }
}

fn clone_raw(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::<Task>::from_raw(ptr as *const Task) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
}

fn wake_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<Task>::from_raw(ptr as *const Task) };
    arc.wake();
}

fn wake_by_ref_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<Task>::from_raw(ptr as *const Task) };
    arc.clone().wake();
    mem::forget(arc);
}

fn drop_raw(ptr: *const ()) {
    unsafe { drop(Arc::<Task>::from_raw(ptr as *const Task)) };
}
