use super::await_fd::AwaitFd;
use super::timer::TimerEntry;
use crate::io::sys::{PollFd, sys_poll};
use crate::utils::Slab;

use std::cell::Cell;
use std::collections::BinaryHeap;
use std::io;
use std::rc::Rc;
use std::task::Waker;
use std::time::{Duration, Instant};

use libc::c_int;
use tracing::{trace, warn};

/// Outcome of a waiter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Turn {
    /// Nothing was pending: the waiter has nothing that could ever wake a
    /// task.
    Idle,

    /// The waiter polled the OS and completed whatever was due.
    Progress,
}

/// Pending descriptor waits and timers of one runtime.
pub(crate) struct Waiter {
    /// Registered waits, keyed by the token handed back to the waiting future.
    waits: Slab<Rc<AwaitFd>>,

    /// Timers registered by [`sleep`](crate::time::sleep).
    timers: BinaryHeap<TimerEntry>,

    /// Scratch `pollfd` buffer, rebuilt every turn.
    pollfds: Vec<PollFd>,

    /// `(token, start, len)` of every wait flattened into `pollfds`.
    spans: Vec<(usize, usize, usize)>,
}

impl Waiter {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            waits: Slab::with_capacity(capacity),
            timers: BinaryHeap::new(),
            pollfds: Vec::with_capacity(capacity),
            spans: Vec::with_capacity(capacity),
        }
    }

    /// Adds a wait and returns its token.
    pub(crate) fn register(&mut self, wait: Rc<AwaitFd>) -> usize {
        let descriptors = wait.len();
        let token = self.waits.insert(wait);

        trace!(target: "weft::io", token, descriptors, "wait registered");
        token
    }

    /// Drops a wait that is still pending.
    ///
    /// The token is only honoured if it still refers to `wait`: a completed
    /// wait has already left the slab and its key may belong to someone
    /// else by now.
    pub(crate) fn cancel(&mut self, token: usize, wait: &Rc<AwaitFd>) {
        let owned = self
            .waits
            .get(token)
            .is_some_and(|pending| Rc::ptr_eq(pending, wait));

        if owned {
            self.waits.try_remove(token);
            trace!(target: "weft::io", token, "wait cancelled");
        }
    }

    pub(crate) fn add_timer(&mut self, deadline: Instant, waker: Waker, cancelled: Rc<Cell<bool>>) {
        self.timers.push(TimerEntry {
            deadline,
            waker,
            cancelled,
        });
    }

    /// Returns `true` if some descriptor or live timer could still wake a
    /// task.
    pub(crate) fn has_waits(&self) -> bool {
        !self.waits.is_empty() || self.timers.iter().any(|timer| !timer.is_cancelled())
    }

    /// Polls the OS once.
    ///
    /// With `block` set, the call sleeps until a descriptor fires or the
    /// nearest deadline passes. Otherwise it only collects what is ready
    /// right now.
    pub(crate) fn turn(&mut self, block: bool) -> Turn {
        self.timers.retain(|timer| !timer.is_cancelled());

        if self.waits.is_empty() && self.timers.is_empty() {
            return Turn::Idle;
        }

        let expired = self.expire(Instant::now());

        let timeout = if block && expired == 0 {
            self.next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
        } else {
            Some(Duration::ZERO)
        };

        self.flatten();

        match sys_poll(&mut self.pollfds, timeout_ms(timeout)) {
            Ok(0) => {}
            Ok(_) => self.dispatch(),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => self.fail_all(&err),
        }

        self.expire(Instant::now());

        Turn::Progress
    }

    /// Drops every wait and timer without waking anyone.
    pub(crate) fn clear(&mut self) {
        self.waits.drain();
        self.timers.clear();
        self.pollfds.clear();
        self.spans.clear();
    }

    fn next_deadline(&self) -> Option<Instant> {
        let timer = self.timers.peek().map(|timer| timer.deadline);
        let wait = self.waits.iter().filter_map(|(_, wait)| wait.deadline()).min();

        match (timer, wait) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires due timers and times out due waits. Returns how many tasks
    /// were woken.
    fn expire(&mut self, now: Instant) -> usize {
        let mut woken = 0;

        while self.timers.peek().is_some_and(|timer| timer.deadline <= now) {
            if let Some(timer) = self.timers.pop() {
                if !timer.is_cancelled() {
                    timer.waker.wake();
                    woken += 1;
                }
            }
        }

        let due: Vec<usize> = self
            .waits
            .iter()
            .filter(|(_, wait)| wait.deadline().is_some_and(|deadline| deadline <= now))
            .map(|(token, _)| token)
            .collect();

        for token in due {
            if let Some(wait) = self.waits.try_remove(token) {
                trace!(target: "weft::io", token, "wait timed out");

                wait.clear_revents();
                wait.complete(Ok(0));
                woken += 1;
            }
        }

        woken
    }

    fn flatten(&mut self) {
        self.pollfds.clear();
        self.spans.clear();

        for (token, wait) in self.waits.iter() {
            let start = self.pollfds.len();
            wait.copy_into(&mut self.pollfds);
            self.spans.push((token, start, self.pollfds.len() - start));
        }
    }

    /// Completes every wait with at least one fired descriptor.
    fn dispatch(&mut self) {
        for &(token, start, len) in &self.spans {
            let fired = &self.pollfds[start..start + len];
            let ready = fired.iter().filter(|fd| fd.revents() != 0).count();

            if ready == 0 {
                continue;
            }

            if let Some(wait) = self.waits.try_remove(token) {
                trace!(target: "weft::io", token, ready, "wait completed");

                wait.store_revents(fired);
                wait.complete(Ok(ready));
            }
        }
    }

    fn fail_all(&mut self, err: &io::Error) {
        warn!(target: "weft::io", error = %err, "poll failed, failing pending waits");

        for wait in self.waits.drain() {
            let failure = match err.raw_os_error() {
                Some(code) => io::Error::from_raw_os_error(code),
                None => io::Error::new(err.kind(), err.to_string()),
            };

            wait.complete(Err(failure));
        }
    }
}

/// Converts a timeout to `poll(2)` milliseconds, rounding up so the
/// deadline has passed when `poll` returns. `None` blocks indefinitely.
fn timeout_ms(timeout: Option<Duration>) -> c_int {
    match timeout {
        None => -1,
        Some(duration) => {
            let ms = duration.as_nanos().div_ceil(1_000_000);
            ms.min(c_int::MAX as u128) as c_int
        }
    }
}
