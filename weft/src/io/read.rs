use super::sys::{POLLIN_SET, PollFd, sys_is_nonblocking, sys_poll, sys_read};
use super::{deadline_after, hand_off_enabled};
use crate::waiter::wait_fd;

use std::io;
use std::os::fd::RawFd;
use std::time::{Duration, Instant};

use tracing::trace;

/// Reads from `fd` into `buf` without blocking other tasks.
///
/// If no data is available yet, the calling task is suspended until `fd`
/// becomes readable; the actual `read(2)` is then performed once. A
/// descriptor in non-blocking mode is read directly, so `WouldBlock` is
/// reported as usual.
///
/// # Examples
///
/// ```rust,ignore
/// let mut buf = [0u8; 64];
/// let n = weft::io::read(fd, &mut buf).await?;
/// ```
pub async fn read(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    read_until(fd, buf, None).await
}

/// Like [`read`], but gives up after `timeout`.
///
/// Returns [`io::ErrorKind::TimedOut`] if `fd` did not become readable in
/// time. In that case nothing was read.
pub async fn read_timeout(fd: RawFd, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
    read_until(fd, buf, deadline_after(timeout)).await
}

async fn read_until(fd: RawFd, buf: &mut [u8], deadline: Option<Instant>) -> io::Result<usize> {
    if !hand_off_enabled() || sys_is_nonblocking(fd)? {
        trace!(target: "weft::io", fd, "read: direct");
        return sys_read(fd, buf);
    }

    let mut fds = [PollFd::new(fd, POLLIN_SET)];

    if sys_poll(&mut fds, 0)? == 0 {
        trace!(target: "weft::io", fd, "read: hand-off");

        if wait_fd(&mut fds, deadline).await? == 0 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
    }

    trace!(target: "weft::io", fd, "read");
    sys_read(fd, buf)
}
