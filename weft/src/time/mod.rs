//! Timers.
//!
//! [`sleep`] registers a deadline with the runtime's waiter, which wakes the
//! sleeping task once the deadline has passed.

mod sleep;

#[doc(inline)]
pub use sleep::{Sleep, sleep};
