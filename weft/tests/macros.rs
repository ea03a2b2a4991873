use std::fs::File;
use std::io::Write;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::rc::Rc;

use weft::io::{self, POLLIN_SET, PollFd};
use weft::sync::SyncError;
use weft::sync::handle::MutexHandle;
use weft::{join, task};

fn pipe() -> (OwnedFd, File) {
    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "pipe failed");

    unsafe { (OwnedFd::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
}

#[weft::test(wrap_io = false)]
async fn test_wrap_io_option_reaches_the_runtime() {
    let (reader, mut writer) = pipe();

    let producer = task::spawn(async move {
        writer.write_all(b"x").unwrap();
        writer
    });

    // Without the hand-off the thread sits in poll(2) and the writer
    // cannot run until it returns.
    let mut fds = [PollFd::new(reader.as_raw_fd(), POLLIN_SET)];
    assert_eq!(io::poll(&mut fds, 20).await.unwrap(), 0);

    drop(producer.await);
    assert_eq!(io::poll(&mut fds, 20).await.unwrap(), 1);
}

#[weft::test(wrap_io = true, event_capacity = 2)]
async fn test_waiter_outgrows_event_capacity() {
    let pipes: Vec<_> = (0..6).map(|_| pipe()).collect();

    let readers: Vec<_> = pipes
        .iter()
        .map(|(reader, _)| {
            let fd = reader.as_raw_fd();
            task::spawn(async move {
                let mut buf = [0u8; 1];
                io::read(fd, &mut buf).await.unwrap();
                buf[0]
            })
        })
        .collect();

    task::spawn(async {}).await;

    for (i, (_, writer)) in pipes.iter().enumerate() {
        (&*writer).write_all(&[i as u8]).unwrap();
    }

    for (i, handle) in readers.into_iter().enumerate() {
        assert_eq!(handle.await, i as u8);
    }
}

#[weft::test]
async fn test_entry_point_may_return_result() -> Result<(), SyncError> {
    let mut mutex = MutexHandle::new();
    mutex.init()?;

    let shared = Rc::new(mutex);
    let (first, second) = join!(shared.lock(), async { shared.try_lock() });

    first?;
    assert_eq!(second, Err(SyncError::Busy));
    shared.unlock()
}
