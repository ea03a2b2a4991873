use super::hand_off_enabled;
use super::sys::{PollFd, sys_poll};
use crate::waiter::wait_fd;

use libc::c_int;
use std::io;
use std::time::{Duration, Instant};

use tracing::trace;

/// Waits for events on a set of descriptors, like `poll(2)`.
///
/// `timeout_ms` follows `poll(2)`: negative waits indefinitely, zero
/// returns immediately. On return every entry's `revents` holds the events
/// that occurred, and the result is the number of entries with non-zero
/// `revents` (`0` on timeout).
pub async fn poll(fds: &mut [PollFd], timeout_ms: c_int) -> io::Result<usize> {
    if timeout_ms == 0 || !hand_off_enabled() {
        return sys_poll(fds, timeout_ms);
    }

    let ready = sys_poll(fds, 0)?;
    if ready > 0 {
        return Ok(ready);
    }

    trace!(target: "weft::io", nfds = fds.len(), timeout_ms, "poll: hand-off");

    let deadline =
        (timeout_ms > 0).then(|| Instant::now() + Duration::from_millis(timeout_ms as u64));

    wait_fd(fds, deadline).await
}
