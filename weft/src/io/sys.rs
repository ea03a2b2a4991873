//! Thin `libc` wrappers used by the I/O layer and the waiter.

use super::fdset::FdSet;

use libc::{F_GETFL, O_NONBLOCK, c_int, c_short, fcntl, nfds_t, pollfd, timeval};
use std::fmt;
use std::io;
use std::os::fd::RawFd;
use std::ptr;
use std::time::Duration;

/// Events that make a descriptor read-ready.
pub const POLLIN_SET: c_short = libc::POLLRDBAND | libc::POLLIN | libc::POLLHUP | libc::POLLERR;

/// Events that make a descriptor write-ready.
pub const POLLOUT_SET: c_short = libc::POLLWRBAND | libc::POLLOUT | libc::POLLERR;

/// Events that signal an exceptional condition.
pub const POLLEX_SET: c_short = libc::POLLPRI;

/// The three readiness classes of `select(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Read,
    Write,
    Except,
}

impl EventClass {
    /// The `poll(2)` events this class stands for.
    pub fn mask(self) -> c_short {
        match self {
            EventClass::Read => POLLIN_SET,
            EventClass::Write => POLLOUT_SET,
            EventClass::Except => POLLEX_SET,
        }
    }
}

/// A descriptor and the events to wait for, laid out as `struct pollfd`.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct PollFd(pollfd);

impl PollFd {
    pub fn new(fd: RawFd, events: c_short) -> Self {
        Self(pollfd {
            fd,
            events,
            revents: 0,
        })
    }

    pub fn fd(&self) -> RawFd {
        self.0.fd
    }

    pub fn events(&self) -> c_short {
        self.0.events
    }

    /// Events reported by the last poll.
    pub fn revents(&self) -> c_short {
        self.0.revents
    }

    pub fn set_revents(&mut self, revents: c_short) {
        self.0.revents = revents;
    }

    /// A copy with `revents` cleared.
    pub(crate) fn cleared(&self) -> Self {
        Self::new(self.fd(), self.events())
    }
}

impl fmt::Debug for PollFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollFd")
            .field("fd", &self.fd())
            .field("events", &format_args!("{:#x}", self.events()))
            .field("revents", &format_args!("{:#x}", self.revents()))
            .finish()
    }
}

/// Reads from a file descriptor into the given buffer.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };

    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Calls `poll(2)`. A negative `timeout_ms` waits indefinitely.
pub(crate) fn sys_poll(fds: &mut [PollFd], timeout_ms: c_int) -> io::Result<usize> {
    // `PollFd` is a transparent wrapper around `pollfd`.
    let rc = unsafe { libc::poll(fds.as_mut_ptr() as *mut pollfd, fds.len() as nfds_t, timeout_ms) };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as usize)
    }
}

/// Calls `select(2)`. `None` waits indefinitely.
pub(crate) fn sys_select(
    nfds: c_int,
    readfds: Option<&mut FdSet>,
    writefds: Option<&mut FdSet>,
    exceptfds: Option<&mut FdSet>,
    timeout: Option<Duration>,
) -> io::Result<usize> {
    let mut tv = timeout.map(|timeout| timeval {
        tv_sec: timeout.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    });

    let rc = unsafe {
        libc::select(
            nfds,
            readfds.map_or(ptr::null_mut(), FdSet::as_mut_ptr),
            writefds.map_or(ptr::null_mut(), FdSet::as_mut_ptr),
            exceptfds.map_or(ptr::null_mut(), FdSet::as_mut_ptr),
            tv.as_mut().map_or(ptr::null_mut(), |tv| tv as *mut timeval),
        )
    };

    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc as usize)
    }
}

/// Returns `true` if `fd` is in non-blocking mode.
pub(crate) fn sys_is_nonblocking(fd: RawFd) -> io::Result<bool> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(flags & O_NONBLOCK != 0)
}
