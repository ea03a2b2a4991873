//! Cooperative replacements for blocking descriptor calls.
//!
//! [`read`], [`poll`] and [`select`] behave like their OS counterparts, but
//! instead of blocking the runtime thread they hand the wait to the
//! runtime's waiter and suspend only the calling task. Each call takes the
//! same three steps:
//!
//! 1. Descriptors in non-blocking mode and zero timeouts go straight to the
//!    OS.
//! 2. A zero-timeout probe checks whether the call can complete right away.
//! 3. Otherwise the wait is handed off and the task resumes once a
//!    descriptor is ready or the deadline passes.
//!
//! Outside a runtime, or when the runtime was built with
//! [`wrap_io(false)`](crate::RuntimeBuilder::wrap_io), every call forwards
//! to the OS directly.

mod fdset;
mod poll;
mod read;
mod select;

pub(crate) mod sys;

#[doc(inline)]
pub use fdset::FdSet;

#[doc(inline)]
pub use poll::poll;

#[doc(inline)]
pub use read::{read, read_timeout};

#[doc(inline)]
pub use select::select;

pub use sys::{EventClass, POLLEX_SET, POLLIN_SET, POLLOUT_SET, PollFd};

use crate::runtime::context;

use std::time::{Duration, Instant};

/// Whether waits may be handed to the waiter of the current runtime.
fn hand_off_enabled() -> bool {
    context::current().is_some_and(|handle| handle.config.wrap_io)
}

/// Absolute deadline `timeout` from now. `None` if it cannot be
/// represented, which amounts to waiting indefinitely.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
