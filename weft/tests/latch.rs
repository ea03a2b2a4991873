use std::rc::Rc;

use weft::sync::{Latch, SyncError};
use weft::{task, yield_now};

#[weft::test]
async fn test_waiters_before_and_after_set_see_the_value() {
    let latch: Rc<Latch<i32>> = Rc::new(Latch::new());

    let early: Vec<_> = (0..2)
        .map(|_| {
            let latch = latch.clone();
            task::spawn(async move {
                latch.wait().await;
                *latch.value().await
            })
        })
        .collect();

    yield_now().await;
    assert_eq!(latch.synchronizer().waiting(), 2);

    let setter = {
        let latch = latch.clone();
        task::spawn(async move { latch.set(42) })
    };

    assert_eq!(setter.await, Ok(()));
    for handle in early {
        assert_eq!(handle.await, 42);
    }

    let late = {
        let latch = latch.clone();
        task::spawn(async move { *latch.value().await })
    };

    yield_now().await;
    assert!(late.is_finished());
    assert_eq!(late.await, 42);
}

#[weft::test]
async fn test_second_set_is_rejected() {
    let latch = Latch::new();

    assert!(!latch.valid());
    assert_eq!(latch.try_get(), None);

    assert_eq!(latch.set("first"), Ok(()));
    assert_eq!(latch.set("second"), Err(SyncError::AlreadySet));

    assert!(latch.valid());
    assert_eq!(latch.try_get(), Some(&"first"));
    assert_eq!(*latch.value().await, "first");
}

#[weft::test]
async fn test_unit_latch_only_signals_readiness() {
    let ready: Rc<Latch> = Rc::new(Latch::new());

    let waiter = {
        let ready = ready.clone();
        task::spawn(async move { ready.wait().await })
    };

    yield_now().await;
    assert!(!waiter.is_finished());

    ready.set(()).unwrap();
    waiter.await;

    assert!(ready.valid());
    ready.wait().await;
}
