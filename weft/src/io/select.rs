use super::fdset::FdSet;
use super::sys::{EventClass, PollFd, sys_poll, sys_select};
use super::{deadline_after, hand_off_enabled};
use crate::waiter::wait_fd;

use libc::c_int;
use std::io;
use std::time::{Duration, Instant};

use tracing::trace;

const CLASSES: [EventClass; 3] = [EventClass::Read, EventClass::Write, EventClass::Except];

/// Waits for descriptors in up to three sets to become ready, like
/// `select(2)`.
///
/// Only descriptors below `nfds` are considered. On return each given set
/// holds exactly the descriptors that are ready for its class, and the
/// result counts set bits across all three sets, so a descriptor ready for
/// both reading and writing counts twice. `None` as `timeout` waits
/// indefinitely.
///
/// # Errors
///
/// `EINVAL` if `nfds` is negative or above [`FdSet::CAPACITY`], `EBADF` if
/// a set contains a descriptor that is not open.
pub async fn select(
    nfds: c_int,
    readfds: Option<&mut FdSet>,
    writefds: Option<&mut FdSet>,
    exceptfds: Option<&mut FdSet>,
    timeout: Option<Duration>,
) -> io::Result<usize> {
    if nfds < 0 || nfds as usize > FdSet::CAPACITY {
        return Err(io::Error::from_raw_os_error(libc::EINVAL));
    }

    if timeout == Some(Duration::ZERO) || !hand_off_enabled() {
        return sys_select(nfds, readfds, writefds, exceptfds, timeout);
    }

    let mut sets = [readfds, writefds, exceptfds];

    let mut fds = Vec::new();
    let mut classes = Vec::new();

    for (class, set) in CLASSES.into_iter().zip(&sets) {
        if let Some(set) = set {
            for fd in set.iter(nfds) {
                fds.push(PollFd::new(fd, class.mask()));
                classes.push(class);
            }
        }
    }

    let deadline = timeout.and_then(deadline_after);
    let mut muted = vec![false; fds.len()];

    sys_poll(&mut fds, 0)?;

    loop {
        if fds.iter().any(|fd| fd.revents() & libc::POLLNVAL != 0) {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }

        if matched(&fds, &classes) > 0 || deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        // poll(2) reports POLLHUP and POLLERR unasked. An entry that fired
        // outside its class would fire again on every turn, so it sits out
        // the rest of the call.
        for (fd, mute) in fds.iter_mut().zip(muted.iter_mut()) {
            if fd.revents() != 0 {
                *mute = true;
                fd.set_revents(0);
            }
        }

        let mut pending: Vec<PollFd> = fds
            .iter()
            .zip(&muted)
            .filter(|&(_, &mute)| !mute)
            .map(|(fd, _)| *fd)
            .collect();

        trace!(target: "weft::io", nfds, entries = pending.len(), "select: hand-off");
        wait_fd(&mut pending, deadline).await?;

        let live = fds.iter_mut().zip(&muted).filter(|&(_, &mute)| !mute);
        for ((fd, _), fired) in live.zip(&pending) {
            fd.set_revents(fired.revents());
        }
    }

    for set in sets.iter_mut().flatten() {
        set.clear();
    }

    let mut ready = 0;

    for (fd, &class) in fds.iter().zip(&classes) {
        if fd.revents() & class.mask() == 0 {
            continue;
        }

        if let Some(set) = sets[class as usize].as_deref_mut() {
            set.insert(fd.fd());
            ready += 1;
        }
    }

    Ok(ready)
}

/// Entries whose events intersect their own class.
fn matched(fds: &[PollFd], classes: &[EventClass]) -> usize {
    fds.iter()
        .zip(classes)
        .filter(|&(fd, class)| fd.revents() & class.mask() != 0)
        .count()
}
