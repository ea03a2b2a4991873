use std::cell::Cell;
use std::fs::File;
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::net::UnixStream;
use std::rc::Rc;
use std::time::{Duration, Instant};

use weft::io::{self, FdSet, POLLIN_SET, POLLOUT_SET, PollFd};
use weft::time::sleep;
use weft::{RuntimeBuilder, task, yield_now};

fn pipe() -> (OwnedFd, File) {
    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "pipe failed");

    unsafe { (OwnedFd::from_raw_fd(fds[0]), File::from_raw_fd(fds[1])) }
}

#[weft::test]
async fn test_read_waits_for_data() {
    let (reader, mut writer) = pipe();

    let producer = task::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        writer.write_all(b"hello").unwrap();
    });

    let mut buf = [0u8; 16];
    let n = io::read(reader.as_raw_fd(), &mut buf).await.unwrap();

    assert_eq!(&buf[..n], b"hello");
    producer.await;
}

#[weft::test]
async fn test_read_does_not_block_other_tasks() {
    let (reader, mut writer) = pipe();
    let ticks = Rc::new(Cell::new(0));

    let ticker = {
        let ticks = ticks.clone();
        task::spawn(async move {
            for _ in 0..3 {
                sleep(Duration::from_millis(5)).await;
                ticks.set(ticks.get() + 1);
            }
            writer.write_all(b"done").unwrap();
        })
    };

    let mut buf = [0u8; 4];
    let n = io::read(reader.as_raw_fd(), &mut buf).await.unwrap();

    assert_eq!(&buf[..n], b"done");
    assert_eq!(ticks.get(), 3);
    ticker.await;
}

#[weft::test]
async fn test_read_matches_direct_read() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"the same bytes either way").unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut wrapped = [0u8; 64];
    let n = io::read(file.as_raw_fd(), &mut wrapped).await.unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut direct = [0u8; 64];
    let m = unsafe { libc::read(file.as_raw_fd(), direct.as_mut_ptr().cast(), direct.len()) };

    assert_eq!(n as isize, m);
    assert_eq!(wrapped[..n], direct[..n]);
}

#[weft::test]
async fn test_read_timeout_leaves_data_unread() {
    let (reader, mut writer) = pipe();
    let start = Instant::now();

    let mut buf = [0u8; 8];
    let err = io::read_timeout(reader.as_raw_fd(), &mut buf, Duration::from_millis(30))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TimedOut);
    assert!(start.elapsed() >= Duration::from_millis(30));

    writer.write_all(b"late").unwrap();
    let n = io::read_timeout(reader.as_raw_fd(), &mut buf, Duration::from_millis(30))
        .await
        .unwrap();

    assert_eq!(&buf[..n], b"late");
}

#[weft::test]
async fn test_read_nonblocking_descriptor_is_direct() {
    let (reader, _writer) = pipe();

    let fd = reader.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }

    let mut buf = [0u8; 8];
    let err = io::read(fd, &mut buf).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WouldBlock);
}

#[test]
fn test_read_without_hand_off() {
    let rt = RuntimeBuilder::new().wrap_io(false).build();
    let (reader, mut writer) = pipe();

    writer.write_all(b"direct").unwrap();

    let (n, buf) = rt.block_on(async {
        let mut buf = [0u8; 8];
        let n = io::read(reader.as_raw_fd(), &mut buf).await.unwrap();
        (n, buf)
    });

    assert_eq!(&buf[..n], b"direct");
}

#[weft::test]
async fn test_poll_times_out_with_cleared_results() {
    let (reader, _writer) = pipe();
    let mut fds = [PollFd::new(reader.as_raw_fd(), POLLIN_SET)];

    let start = Instant::now();
    let ready = io::poll(&mut fds, 30).await.unwrap();

    assert_eq!(ready, 0);
    assert_eq!(fds[0].revents(), 0);
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[weft::test]
async fn test_poll_reports_the_ready_entry() {
    let (idle, _idle_writer) = pipe();
    let (busy, mut busy_writer) = pipe();

    let producer = task::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        busy_writer.write_all(b"x").unwrap();
        busy_writer
    });

    let mut fds = [
        PollFd::new(idle.as_raw_fd(), POLLIN_SET),
        PollFd::new(busy.as_raw_fd(), POLLIN_SET),
    ];
    let ready = io::poll(&mut fds, -1).await.unwrap();

    assert_eq!(ready, 1);
    assert_eq!(fds[0].revents(), 0);
    assert_ne!(fds[1].revents() & libc::POLLIN, 0);
    drop(producer.await);
}

#[weft::test]
async fn test_select_times_out_with_empty_sets() {
    let (reader, _writer) = pipe();
    let fd = reader.as_raw_fd();

    let mut readfds = FdSet::new();
    readfds.insert(fd);

    let start = Instant::now();
    let ready = io::select(
        fd + 1,
        Some(&mut readfds),
        None,
        None,
        Some(Duration::from_millis(50)),
    )
    .await
    .unwrap();

    assert_eq!(ready, 0);
    assert!(!readfds.contains(fd));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[weft::test]
async fn test_select_counts_each_set_separately() {
    let (local, mut remote) = UnixStream::pair().unwrap();
    remote.write_all(b"ping").unwrap();

    let fd = local.as_raw_fd();
    let mut readfds = FdSet::new();
    let mut writefds = FdSet::new();
    let mut exceptfds = FdSet::new();
    readfds.insert(fd);
    writefds.insert(fd);
    exceptfds.insert(fd);

    let ready = io::select(
        fd + 1,
        Some(&mut readfds),
        Some(&mut writefds),
        Some(&mut exceptfds),
        None,
    )
    .await
    .unwrap();

    assert_eq!(ready, 2);
    assert!(readfds.contains(fd));
    assert!(writefds.contains(fd));
    assert!(!exceptfds.contains(fd));
}

#[weft::test]
async fn test_select_wakes_on_readiness() {
    let (reader, mut writer) = pipe();
    let fd = reader.as_raw_fd();

    let producer = task::spawn(async move {
        yield_now().await;
        writer.write_all(b"!").unwrap();
        writer
    });

    let mut readfds = FdSet::new();
    readfds.insert(fd);

    let ready = io::select(fd + 1, Some(&mut readfds), None, None, None)
        .await
        .unwrap();

    assert_eq!(ready, 1);
    assert!(readfds.contains(fd));
    drop(producer.await);
}

#[weft::test]
async fn test_select_rejects_bad_nfds() {
    let err = io::select(-1, None, None, None, None).await.unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EINVAL));

    let too_many = FdSet::CAPACITY as i32 + 1;
    let err = io::select(too_many, None, None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
}

#[weft::test]
async fn test_poll_write_readiness_is_immediate() {
    let (_reader, writer) = pipe();
    let mut fds = [PollFd::new(writer.as_raw_fd(), POLLOUT_SET)];

    let ready = io::poll(&mut fds, 1000).await.unwrap();

    assert_eq!(ready, 1);
    assert_ne!(fds[0].revents() & libc::POLLOUT, 0);
}

#[weft::test]
async fn test_select_hung_up_descriptor_is_not_exceptional() {
    let (reader, writer) = pipe();
    drop(writer);

    let fd = reader.as_raw_fd();
    let mut exceptfds = FdSet::new();
    exceptfds.insert(fd);

    let start = Instant::now();
    let ready = io::select(
        fd + 1,
        None,
        None,
        Some(&mut exceptfds),
        Some(Duration::from_millis(50)),
    )
    .await
    .unwrap();

    assert_eq!(ready, 0);
    assert!(!exceptfds.contains(fd));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[weft::test]
async fn test_select_hung_up_descriptor_is_readable() {
    let (reader, writer) = pipe();
    drop(writer);

    let fd = reader.as_raw_fd();
    let mut readfds = FdSet::new();
    let mut exceptfds = FdSet::new();
    readfds.insert(fd);
    exceptfds.insert(fd);

    let ready = io::select(fd + 1, Some(&mut readfds), None, Some(&mut exceptfds), None)
        .await
        .unwrap();

    assert_eq!(ready, 1);
    assert!(readfds.contains(fd));
    assert!(!exceptfds.contains(fd));
}

#[weft::test]
async fn test_select_without_timeout_waits_past_hang_up() {
    let (hung, hung_writer) = pipe();
    drop(hung_writer);
    let (live, mut live_writer) = pipe();

    let producer = task::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        live_writer.write_all(b"?").unwrap();
        live_writer
    });

    let (hung_fd, live_fd) = (hung.as_raw_fd(), live.as_raw_fd());
    let mut readfds = FdSet::new();
    let mut exceptfds = FdSet::new();
    readfds.insert(live_fd);
    exceptfds.insert(hung_fd);

    let start = Instant::now();
    let ready = io::select(
        hung_fd.max(live_fd) + 1,
        Some(&mut readfds),
        None,
        Some(&mut exceptfds),
        None,
    )
    .await
    .unwrap();

    assert_eq!(ready, 1);
    assert!(readfds.contains(live_fd));
    assert!(!exceptfds.contains(hung_fd));
    assert!(start.elapsed() >= Duration::from_millis(20));
    drop(producer.await);
}
