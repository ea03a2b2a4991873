//! Core runtime components.
//!
//! This module contains the single-threaded run loop, the task
//! representation and cooperative yielding.
//!
//! It is responsible for:
//! - polling ready tasks in the order they were woken,
//! - parking the thread in the waiter when no task is ready,
//! - detecting when nothing can make progress anymore,
//! - providing the thread-local runtime context.
//!
//! Most users will interact with [`Runtime`] through the `#[weft::main]`
//! and `#[weft::test]` macros.

mod core;
mod queue;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod yield_now;

pub mod task;

pub use self::core::Runtime;
