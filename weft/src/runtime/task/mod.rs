//! Task primitives.
//!
//! A task is a lightweight, cooperatively scheduled unit of execution: a
//! future owned by the runtime and polled only from the runtime thread.
//! It suspends exactly where its future returns `Poll::Pending`, which in
//! this crate means inside a synchronizer's `block()` or a descriptor
//! hand-off to the waiter.
//!
//! Most users only need [`spawn`] and [`JoinHandle`].

pub(crate) mod handle;
pub(crate) mod id;
pub(crate) mod state;
pub(crate) mod waker;

mod core;

pub(crate) use self::core::Task;

pub use self::core::spawn;
pub use handle::JoinHandle;
pub use id::TaskId;
