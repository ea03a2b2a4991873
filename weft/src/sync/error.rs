use libc::c_int;
use thiserror::Error;

/// Errors reported by the synchronization primitives and their handles.
///
/// Two kinds of conditions share this type. Caller misuse, such as
/// unlocking a mutex that is not locked, is reported through
/// [`is_contract_violation`](Self::is_contract_violation); everything else
/// is an ordinary status a caller is expected to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The handle was never initialized or has been destroyed.
    #[error("invalid or destroyed handle")]
    InvalidHandle,

    /// A non-blocking operation could not proceed.
    #[error("operation would block")]
    WouldBlock,

    /// The mutex is held by another task.
    #[error("mutex is locked")]
    Busy,

    /// The semaphore count is at its maximum.
    #[error("semaphore count overflow")]
    Overflow,

    /// `unlock` on a mutex that is not locked.
    #[error("mutex is not locked")]
    NotLocked,

    /// `set` on a latch that already holds a value.
    #[error("latch is already set")]
    AlreadySet,

    /// A reference count would exceed its capacity.
    #[error("reference count overflow")]
    RefCountOverflow,

    /// A reference was released more often than it was acquired.
    #[error("reference released twice")]
    DoubleRelease,
}

impl SyncError {
    /// The conventional OS error code for this condition.
    pub fn errno(self) -> c_int {
        match self {
            SyncError::InvalidHandle | SyncError::DoubleRelease => libc::EINVAL,
            SyncError::WouldBlock | SyncError::AlreadySet => libc::EAGAIN,
            SyncError::Busy => libc::EBUSY,
            SyncError::Overflow | SyncError::RefCountOverflow => libc::EOVERFLOW,
            SyncError::NotLocked => libc::EPERM,
        }
    }

    /// Returns `true` if the error reports caller misuse rather than a
    /// runtime condition.
    pub fn is_contract_violation(self) -> bool {
        matches!(
            self,
            SyncError::NotLocked
                | SyncError::AlreadySet
                | SyncError::RefCountOverflow
                | SyncError::DoubleRelease
        )
    }
}

impl From<SyncError> for std::io::Error {
    fn from(err: SyncError) -> Self {
        std::io::Error::from_raw_os_error(err.errno())
    }
}

#[cfg(test)]
mod tests {
    use super::SyncError;

    #[test]
    fn status_codes() {
        assert_eq!(SyncError::InvalidHandle.errno(), libc::EINVAL);
        assert_eq!(SyncError::WouldBlock.errno(), libc::EAGAIN);
        assert_eq!(SyncError::Busy.errno(), libc::EBUSY);
        assert_eq!(SyncError::Overflow.errno(), libc::EOVERFLOW);
    }

    #[test]
    fn misuse_is_distinguished_from_status() {
        assert!(SyncError::NotLocked.is_contract_violation());
        assert!(SyncError::DoubleRelease.is_contract_violation());
        assert!(!SyncError::WouldBlock.is_contract_violation());
        assert!(!SyncError::Overflow.is_contract_violation());
    }
}
