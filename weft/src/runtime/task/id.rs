use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a task, used in diagnostics only.
///
/// The root future driven by [`Runtime::block_on`](crate::Runtime::block_on)
/// is [`TaskId::ROOT`]; spawned tasks get increasing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// The root future of `block_on`.
    pub const ROOT: TaskId = TaskId(0);

    pub(crate) fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == TaskId::ROOT {
            f.write_str("root")
        } else {
            write!(f, "task#{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskId;

    #[test]
    fn ids_are_unique_and_not_root() {
        let a = TaskId::next();
        let b = TaskId::next();

        assert_ne!(a, b);
        assert_ne!(a, TaskId::ROOT);
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn display() {
        assert_eq!(TaskId::ROOT.to_string(), "root");
        assert!(TaskId::next().to_string().starts_with("task#"));
    }
}
