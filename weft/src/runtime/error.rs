use thiserror::Error;

/// Errors reported by [`Runtime::try_block_on`](crate::Runtime::try_block_on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The root future is pending, no task is ready to run and the waiter
    /// has no descriptor or timer to wait for. Nothing can ever wake the
    /// root future again.
    #[error("deadlock: root future is pending and none of the {tasks} live task(s) can make progress")]
    Deadlock {
        /// Number of spawned tasks still alive (all of them blocked).
        tasks: usize,
    },
}
