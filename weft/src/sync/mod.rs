//! Synchronization primitives for cooperative tasks.
//!
//! All primitives are built on a [`Synchronizer`], a FIFO queue of parked
//! tasks. An operation that cannot proceed parks the calling task on the
//! queue; the matching release wakes the longest waiter, which re-enters
//! the runtime's ready set.
//!
//! The current primitives include:
//! - [`Mutex`]: a non-reentrant lock without owner tracking.
//! - [`Semaphore`]: a counting semaphore that fills large requests in
//!   pieces.
//! - [`Signal`]: a stateless broadcast condition.
//! - [`Latch`]: a value that is set once and read by everyone.
//!
//! ## Design notes
//!
//! - Only one task runs at a time and tasks only switch at `.await`
//!   points, so a primitive's check-then-update needs no atomics. The
//!   primitives are `!Send` and `!Sync` and are shared between tasks with
//!   `Rc` or [`Shared`].
//! - Waiting on a primitive has no timeout.
//! - Misuse, such as unlocking an unlocked mutex, is reported as a
//!   [`SyncError`] rather than a panic.
//!
//! The [`handle`] module wraps the primitives in init/destroy handles that
//! report status codes.

mod error;
mod latch;
mod mutex;
mod refcount;
mod semaphore;
mod signal;
mod synchronizer;

pub mod handle;

pub use error::SyncError;
pub use latch::Latch;
pub use mutex::Mutex;
pub use refcount::{RefCount, RefCounted, Shared};
pub use semaphore::Semaphore;
pub use signal::Signal;
pub use synchronizer::{Block, Synchronizer};
