//! # Weft
//!
//! **Weft** is a single-threaded cooperative task runtime with
//! synchronization primitives and a cooperative I/O layer.
//!
//! Exactly one task runs at a time and a task only gives up the thread at
//! an `.await`, so code between two suspension points never races with
//! another task. On top of that model Weft provides:
//!
//! - **Synchronization primitives**: [`Mutex`](sync::Mutex),
//!   [`Semaphore`](sync::Semaphore), [`Signal`](sync::Signal) and
//!   [`Latch`](sync::Latch), all waking their waiters in FIFO order
//! - **Reference-counted handles** ([`Shared`](sync::Shared)) and an
//!   init/destroy handle layer reporting OS-style status codes
//! - **Cooperative I/O**: [`io::read`], [`io::poll`] and [`io::select`]
//!   suspend the calling task instead of blocking the thread
//! - **Timers** with [`time::sleep`]
//! - **Ergonomic macros** like `#[weft::main]`, `#[weft::test]` and `join!`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use weft::sync::Latch;
//! use weft::task;
//!
//! #[weft::main]
//! async fn main() {
//!     let answer = Rc::new(Latch::new());
//!
//!     let reader = answer.clone();
//!     let handle = task::spawn(async move { *reader.value().await });
//!
//!     answer.set(42).unwrap();
//!     assert_eq!(handle.await, 42);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`sync`]: Synchronization primitives and handles
//! - [`io`]: Cooperative descriptor I/O
//! - [`time`]: Timers
//! - [`task`]: Spawning tasks

mod runtime;
mod utils;
mod waiter;

pub mod io;
pub mod sync;
pub mod time;

pub use runtime::Runtime;
pub use runtime::builder::RuntimeBuilder;
pub use runtime::error::RuntimeError;
pub use runtime::task;
pub use runtime::yield_now::yield_now;

pub use weft_macros::*;
