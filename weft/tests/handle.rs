use weft::sync::SyncError;
use weft::sync::handle::{CondHandle, LatchHandle, MutexHandle, SemaphoreHandle};
use weft::{task, yield_now};

#[weft::test]
async fn test_uninitialized_handles_are_invalid() {
    let mutex = MutexHandle::new();
    let sem = SemaphoreHandle::new();
    let cond = CondHandle::new();
    let latch = LatchHandle::new();

    assert_eq!(mutex.try_lock(), Err(SyncError::InvalidHandle));
    assert_eq!(mutex.lock().await, Err(SyncError::InvalidHandle));
    assert_eq!(sem.post(), Err(SyncError::InvalidHandle));
    assert_eq!(sem.wait().await, Err(SyncError::InvalidHandle));
    assert_eq!(cond.signal(), Err(SyncError::InvalidHandle));
    assert_eq!(cond.wait().await, Err(SyncError::InvalidHandle));
    assert_eq!(latch.valid(), Err(SyncError::InvalidHandle));
    assert_eq!(latch.get().await, Err(SyncError::InvalidHandle));

    assert_eq!(SyncError::InvalidHandle.errno(), libc::EINVAL);
}

#[weft::test]
async fn test_destroy_twice_is_harmless() {
    let mut mutex = MutexHandle::new();

    mutex.init().unwrap();
    assert_eq!(mutex.destroy(), Ok(()));
    assert_eq!(mutex.destroy(), Ok(()));
    assert_eq!(mutex.unlock(), Err(SyncError::InvalidHandle));
}

#[weft::test]
async fn test_mutex_handle_status_codes() {
    let mut mutex = MutexHandle::new();
    mutex.init().unwrap();

    assert_eq!(mutex.lock().await, Ok(()));

    let err = mutex.try_lock().unwrap_err();
    assert_eq!(err, SyncError::Busy);
    assert_eq!(err.errno(), libc::EBUSY);

    assert_eq!(mutex.unlock(), Ok(()));
    assert_eq!(mutex.try_lock(), Ok(()));
}

#[weft::test]
async fn test_semaphore_handle_refuses_overflow() {
    let mut sem = SemaphoreHandle::new();
    sem.init(usize::MAX).unwrap();

    let err = sem.post().unwrap_err();
    assert_eq!(err, SyncError::Overflow);
    assert_eq!(err.errno(), libc::EOVERFLOW);
    assert_eq!(sem.value(), Ok(usize::MAX));
}

#[weft::test]
async fn test_semaphore_handle_wait_and_post() {
    let mut sem = SemaphoreHandle::new();
    sem.init(0).unwrap();

    assert_eq!(sem.try_wait(), Err(SyncError::WouldBlock));
    assert_eq!(SyncError::WouldBlock.errno(), libc::EAGAIN);

    let waiter = task::spawn(sem.wait());
    yield_now().await;
    assert!(!waiter.is_finished());

    sem.post().unwrap();
    assert_eq!(waiter.await, Ok(()));
    assert_eq!(sem.value(), Ok(0));
}

#[weft::test]
async fn test_cond_handle_broadcast() {
    let mut cond = CondHandle::new();
    cond.init().unwrap();

    let first = task::spawn(cond.wait());
    let second = task::spawn(cond.wait());
    yield_now().await;

    cond.broadcast().unwrap();

    assert_eq!(first.await, Ok(()));
    assert_eq!(second.await, Ok(()));
}

#[weft::test]
async fn test_latch_handle_set_once() {
    let mut latch = LatchHandle::new();
    latch.init().unwrap();

    assert_eq!(latch.valid(), Err(SyncError::WouldBlock));

    let reader = task::spawn(latch.get());
    yield_now().await;

    assert_eq!(latch.set(0xdead), Ok(()));
    assert_eq!(latch.set(0xbeef), Err(SyncError::WouldBlock));
    assert_eq!(latch.valid(), Ok(()));

    assert_eq!(reader.await, Ok(0xdead));
    assert_eq!(latch.wait().await, Ok(()));
}

#[weft::test]
async fn test_pending_operation_outlives_destroy() {
    let mut sem = SemaphoreHandle::new();
    sem.init(1).unwrap();

    let wait = sem.wait();
    sem.destroy().unwrap();

    assert_eq!(sem.value(), Err(SyncError::InvalidHandle));
    assert_eq!(wait.await, Ok(()));
}
