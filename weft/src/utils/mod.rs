//! Small data structures used internally by the runtime.
//!
//! [`Slab`] hands out stable integer keys; the scheduler uses it to own
//! live tasks and the waiter uses it to track pending descriptor waits.

mod slab;

pub(crate) use slab::Slab;
