//! Handle-based access to the primitives.
//!
//! Each handle starts out empty, is brought to life with `init` and torn
//! down with `destroy`. Every operation reports its status as a
//! [`SyncError`], whose [`errno`](SyncError::errno) gives the conventional
//! OS code for callers that speak status codes. Operating on an empty
//! handle yields [`SyncError::InvalidHandle`]; destroying one twice is
//! harmless.
//!
//! Suspending operations hold their own reference to the primitive, so a
//! `destroy` issued while another task is still waiting only drops the
//! handle's reference.

use super::error::SyncError;
use super::latch::Latch;
use super::mutex::Mutex;
use super::refcount::{RefCounted, Shared};
use super::semaphore::Semaphore;
use super::signal::Signal;

use std::future::Future;

fn resolve<T: RefCounted>(shared: &Shared<T>) -> Result<&T, SyncError> {
    shared.get().ok_or(SyncError::InvalidHandle)
}

/// Handle to a [`Mutex`].
#[derive(Debug, Default)]
pub struct MutexHandle {
    inner: Shared<Mutex>,
}

impl MutexHandle {
    pub const fn new() -> Self {
        Self {
            inner: Shared::null(),
        }
    }

    pub fn init(&mut self) -> Result<(), SyncError> {
        self.inner = Shared::new(Mutex::new());
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), SyncError> {
        self.inner.reset(None);
        Ok(())
    }

    pub fn lock(&self) -> impl Future<Output = Result<(), SyncError>> + use<> {
        let inner = self.inner.clone();

        async move {
            resolve(&inner)?.lock().await;
            Ok(())
        }
    }

    /// # Errors
    ///
    /// [`SyncError::Busy`] if the mutex is locked.
    pub fn try_lock(&self) -> Result<(), SyncError> {
        if resolve(&self.inner)?.try_lock() {
            Ok(())
        } else {
            Err(SyncError::Busy)
        }
    }

    pub fn unlock(&self) -> Result<(), SyncError> {
        resolve(&self.inner)?.unlock()
    }
}

/// Handle to a [`Semaphore`].
#[derive(Debug, Default)]
pub struct SemaphoreHandle {
    inner: Shared<Semaphore>,
}

impl SemaphoreHandle {
    pub const fn new() -> Self {
        Self {
            inner: Shared::null(),
        }
    }

    pub fn init(&mut self, value: usize) -> Result<(), SyncError> {
        self.inner = Shared::new(Semaphore::new(value));
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), SyncError> {
        self.inner.reset(None);
        Ok(())
    }

    pub fn value(&self) -> Result<usize, SyncError> {
        Ok(resolve(&self.inner)?.value())
    }

    /// Releases one unit.
    ///
    /// # Errors
    ///
    /// [`SyncError::Overflow`] if the count is already at its maximum; the
    /// count is left unchanged.
    pub fn post(&self) -> Result<(), SyncError> {
        let sem = resolve(&self.inner)?;

        if sem.value() == usize::MAX {
            return Err(SyncError::Overflow);
        }

        sem.release(1)
    }

    pub fn wait(&self) -> impl Future<Output = Result<(), SyncError>> + use<> {
        let inner = self.inner.clone();

        async move {
            resolve(&inner)?.acquire(1).await;
            Ok(())
        }
    }

    /// # Errors
    ///
    /// [`SyncError::WouldBlock`] if the count is zero.
    pub fn try_wait(&self) -> Result<(), SyncError> {
        if resolve(&self.inner)?.try_acquire(1) {
            Ok(())
        } else {
            Err(SyncError::WouldBlock)
        }
    }
}

/// Handle to a [`Signal`], with condition-variable naming.
#[derive(Debug, Default)]
pub struct CondHandle {
    inner: Shared<Signal>,
}

impl CondHandle {
    pub const fn new() -> Self {
        Self {
            inner: Shared::null(),
        }
    }

    pub fn init(&mut self) -> Result<(), SyncError> {
        self.inner = Shared::new(Signal::new());
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), SyncError> {
        self.inner.reset(None);
        Ok(())
    }

    pub fn signal(&self) -> Result<(), SyncError> {
        resolve(&self.inner)?.signal();
        Ok(())
    }

    pub fn broadcast(&self) -> Result<(), SyncError> {
        resolve(&self.inner)?.signal_all();
        Ok(())
    }

    pub fn wait(&self) -> impl Future<Output = Result<(), SyncError>> + use<> {
        let inner = self.inner.clone();

        async move {
            resolve(&inner)?.wait().await;
            Ok(())
        }
    }
}

/// Handle to a [`Latch`] of a pointer-sized value.
#[derive(Debug, Default)]
pub struct LatchHandle {
    inner: Shared<Latch<usize>>,
}

impl LatchHandle {
    pub const fn new() -> Self {
        Self {
            inner: Shared::null(),
        }
    }

    pub fn init(&mut self) -> Result<(), SyncError> {
        self.inner = Shared::new(Latch::new());
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<(), SyncError> {
        self.inner.reset(None);
        Ok(())
    }

    /// # Errors
    ///
    /// [`SyncError::WouldBlock`] if no value has been set yet.
    pub fn valid(&self) -> Result<(), SyncError> {
        if resolve(&self.inner)?.valid() {
            Ok(())
        } else {
            Err(SyncError::WouldBlock)
        }
    }

    /// # Errors
    ///
    /// [`SyncError::WouldBlock`] if a value has already been set.
    pub fn set(&self, value: usize) -> Result<(), SyncError> {
        resolve(&self.inner)?
            .set(value)
            .map_err(|_| SyncError::WouldBlock)
    }

    pub fn get(&self) -> impl Future<Output = Result<usize, SyncError>> + use<> {
        let inner = self.inner.clone();

        async move { Ok(*resolve(&inner)?.value().await) }
    }

    pub fn wait(&self) -> impl Future<Output = Result<(), SyncError>> + use<> {
        let inner = self.inner.clone();

        async move {
            resolve(&inner)?.wait().await;
            Ok(())
        }
    }
}
