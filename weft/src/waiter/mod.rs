//! The waiter: where the runtime parks when no task is ready.
//!
//! Tasks that need the OS hand a set of descriptors and an optional
//! deadline to the waiter and suspend. Whenever the ready set runs dry the
//! runtime gives the waiter a turn: it issues a single `poll(2)` over every
//! pending descriptor, bounded by the nearest deadline, and resumes the
//! tasks whose descriptors fired or whose deadlines passed.

mod await_fd;
mod core;
mod timer;

pub(crate) use self::await_fd::wait_fd;
pub(crate) use self::core::{Turn, Waiter};
