use crate::runtime::context;

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes after `duration`.
///
/// # Panics
///
/// Panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// weft::time::sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    // Deadlines past the end of `Instant` never fire.
    let deadline = Instant::now().checked_add(duration);

    Sleep {
        deadline,
        registered: false,
        cancelled: Rc::new(Cell::new(false)),
    }
}

/// Future returned by [`sleep`].
///
/// The timer is registered with the waiter on first poll and cancelled
/// when the future is dropped.
pub struct Sleep {
    deadline: Option<Instant>,
    registered: bool,
    cancelled: Rc<Cell<bool>>,
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        let Some(deadline) = this.deadline else {
            return Poll::Pending;
        };

        if Instant::now() >= deadline {
            return Poll::Ready(());
        }

        if !this.registered {
            let handle = context::current().expect("Sleep polled outside of runtime");

            handle
                .waiter
                .borrow_mut()
                .add_timer(deadline, cx.waker().clone(), this.cancelled.clone());

            this.registered = true;
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}
