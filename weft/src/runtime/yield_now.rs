use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that yields back to the scheduler exactly once.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    /// On the first poll the task wakes itself and returns `Pending`, which
    /// puts it at the back of the run queue. The second poll completes.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.0 {
            self.0 = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        Poll::Ready(())
    }
}

/// Yields execution back to the scheduler.
///
/// Every task that is ready when this is called runs before the caller
/// continues.
///
/// # Examples
///
/// ```rust,ignore
/// async fn task() {
///     // Allow other tasks to run
///     yield_now().await;
/// }
/// ```
pub async fn yield_now() {
    YieldOnce(false).await
}
