use libc::{FD_CLR, FD_ISSET, FD_SET, FD_SETSIZE, FD_ZERO, fd_set};
use std::fmt;
use std::mem::MaybeUninit;
use std::os::fd::RawFd;

/// A `select(2)` descriptor set.
///
/// Descriptors outside `0..FD_SETSIZE` cannot be represented; inserting one
/// is refused and queries for one return `false`.
#[derive(Clone, Copy)]
pub struct FdSet(fd_set);

impl FdSet {
    /// Largest number of descriptors a set can hold.
    pub const CAPACITY: usize = FD_SETSIZE as usize;

    /// Creates an empty set.
    pub fn new() -> Self {
        let mut raw = MaybeUninit::<fd_set>::uninit();

        // FD_ZERO initializes the whole set.
        unsafe {
            FD_ZERO(raw.as_mut_ptr());
            Self(raw.assume_init())
        }
    }

    fn in_range(fd: RawFd) -> bool {
        fd >= 0 && (fd as usize) < Self::CAPACITY
    }

    /// Adds `fd` to the set. Returns `false` if `fd` is out of range.
    pub fn insert(&mut self, fd: RawFd) -> bool {
        if !Self::in_range(fd) {
            return false;
        }

        unsafe { FD_SET(fd, &mut self.0) };
        true
    }

    pub fn remove(&mut self, fd: RawFd) {
        if Self::in_range(fd) {
            unsafe { FD_CLR(fd, &mut self.0) };
        }
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        Self::in_range(fd) && unsafe { FD_ISSET(fd, &self.0) }
    }

    pub fn clear(&mut self) {
        unsafe { FD_ZERO(&mut self.0) };
    }

    /// Members below `nfds`, in ascending order.
    pub fn iter(&self, nfds: RawFd) -> impl Iterator<Item = RawFd> + '_ {
        let end = nfds.clamp(0, Self::CAPACITY as RawFd);
        (0..end).filter(move |&fd| self.contains(fd))
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut fd_set {
        &mut self.0
    }
}

impl Default for FdSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter(Self::CAPACITY as RawFd)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FdSet;

    #[test]
    fn membership() {
        let mut set = FdSet::new();
        assert_eq!(set.iter(64).count(), 0);

        assert!(set.insert(3));
        assert!(set.insert(7));
        assert!(set.contains(3));
        assert!(!set.contains(4));

        set.remove(3);
        assert_eq!(set.iter(64).collect::<Vec<_>>(), vec![7]);

        set.clear();
        assert!(!set.contains(7));
    }

    #[test]
    fn out_of_range_descriptors_are_refused() {
        let mut set = FdSet::new();

        assert!(!set.insert(-1));
        assert!(!set.insert(FdSet::CAPACITY as i32));
        assert!(!set.contains(-1));
        set.remove(-1);
    }

    #[test]
    fn iteration_stops_at_nfds() {
        let mut set = FdSet::new();
        set.insert(1);
        set.insert(5);

        assert_eq!(set.iter(5).collect::<Vec<_>>(), vec![1]);
        assert_eq!(set.iter(6).collect::<Vec<_>>(), vec![1, 5]);
    }
}
