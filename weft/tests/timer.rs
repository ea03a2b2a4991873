use std::cell::RefCell;
use std::future::{Future, poll_fn};
use std::rc::Rc;
use std::task::Poll;
use std::time::{Duration, Instant};

use weft::sync::Signal;
use weft::time::sleep;
use weft::{RuntimeBuilder, RuntimeError, task};

#[weft::test]
async fn test_sleep_basic() {
    let start = Instant::now();
    sleep(Duration::from_millis(50)).await;

    assert!(
        start.elapsed() >= Duration::from_millis(50),
        "Sleep should wait at least the specified duration"
    );
}

#[weft::test]
async fn test_sleep_zero_duration() {
    let start = Instant::now();
    sleep(Duration::ZERO).await;

    assert!(
        start.elapsed() < Duration::from_millis(10),
        "Zero duration sleep should be fast"
    );
}

#[weft::test]
async fn test_sleepers_wake_in_deadline_order() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let handles: Vec<_> = [30u64, 10, 20]
        .into_iter()
        .map(|ms| {
            let order = order.clone();
            task::spawn(async move {
                sleep(Duration::from_millis(ms)).await;
                order.borrow_mut().push(ms);
            })
        })
        .collect();

    for handle in handles {
        handle.await;
    }

    assert_eq!(*order.borrow(), [10, 20, 30]);
}

#[test]
fn test_cancelled_timer_does_not_delay_deadlock_detection() {
    let rt = RuntimeBuilder::new().build();
    let start = Instant::now();

    let result = rt.try_block_on(async {
        let mut long = Box::pin(sleep(Duration::from_secs(60)));
        poll_fn(|cx| {
            let _ = long.as_mut().poll(cx);
            Poll::Ready(())
        })
        .await;
        drop(long);

        Signal::new().wait().await;
    });

    assert_eq!(result, Err(RuntimeError::Deadlock { tasks: 0 }));
    assert!(start.elapsed() < Duration::from_secs(1));
}
