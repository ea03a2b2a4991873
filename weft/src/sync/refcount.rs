use super::error::SyncError;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::error;

/// An intrusive reference counter.
///
/// Counts the [`Shared`] handles that refer to an object. The object is
/// kept alive by the handles' `Rc`s; the counter makes the "one handle,
/// one unit" accounting observable and catches unbalanced releases.
#[derive(Debug, Default)]
pub struct RefCount {
    count: Cell<usize>,
}

impl RefCount {
    pub const fn new() -> Self {
        Self {
            count: Cell::new(0),
        }
    }

    /// Adds a reference and returns the new count.
    pub fn acquire(&self) -> Result<usize, SyncError> {
        let count = self
            .count
            .get()
            .checked_add(1)
            .ok_or(SyncError::RefCountOverflow)?;

        self.count.set(count);
        Ok(count)
    }

    /// Drops a reference. Returns `true` if it was the last one.
    pub fn release(&self) -> Result<bool, SyncError> {
        let count = self
            .count
            .get()
            .checked_sub(1)
            .ok_or(SyncError::DoubleRelease)?;

        self.count.set(count);
        Ok(count == 0)
    }

    pub fn get(&self) -> usize {
        self.count.get()
    }
}

/// An object whose lifetime is accounted by a [`RefCount`].
pub trait RefCounted {
    fn ref_count(&self) -> &RefCount;
}

/// A shared handle to a [`RefCounted`] object.
///
/// Every non-null handle holds exactly one unit of the object's count.
/// Cloning a handle acquires a unit, dropping or resetting it releases
/// one, and the object is dropped when the last unit goes away.
pub struct Shared<T: RefCounted> {
    object: Option<Rc<T>>,
}

impl<T: RefCounted> Shared<T> {
    /// A handle that refers to nothing.
    pub const fn null() -> Self {
        Self { object: None }
    }

    /// Moves `value` into a new shared object and returns its first
    /// handle.
    pub fn new(value: T) -> Self {
        let mut shared = Self::null();
        shared.reset(Some(Rc::new(value)));
        shared
    }

    /// Creates a handle that acquires a reference to `object`.
    ///
    /// # Panics
    ///
    /// Panics if the object's count is at capacity.
    pub fn from_rc(object: Rc<T>) -> Self {
        let mut shared = Self::null();
        shared.reset(Some(object));
        shared
    }

    /// Creates a handle that takes over a reference the caller already
    /// holds, typically one obtained from [`take`](Self::take).
    pub fn adopt(object: Rc<T>) -> Self {
        Self {
            object: Some(object),
        }
    }

    /// Points the handle at `object`.
    ///
    /// The new reference is acquired before the old one is released, so
    /// reassigning a handle to the object it already refers to never
    /// drops the count to zero. On error the handle is left unchanged.
    pub fn try_reset(&mut self, object: Option<Rc<T>>) -> Result<(), SyncError> {
        if let Some(object) = &object {
            object.ref_count().acquire()?;
        }

        match std::mem::replace(&mut self.object, object) {
            Some(previous) => release(previous),
            None => Ok(()),
        }
    }

    /// Like [`try_reset`](Self::try_reset).
    ///
    /// # Panics
    ///
    /// Panics if the new object's count is at capacity. An unbalanced
    /// release of the old object is logged instead.
    pub fn reset(&mut self, object: Option<Rc<T>>) {
        match self.try_reset(object) {
            Ok(()) => {}
            Err(SyncError::RefCountOverflow) => panic!("reference count overflow"),
            Err(err) => report(err),
        }
    }

    /// The referenced object, if any.
    pub fn get(&self) -> Option<&T> {
        self.object.as_deref()
    }

    /// The underlying `Rc`, without transferring the reference.
    pub fn as_rc(&self) -> Option<&Rc<T>> {
        self.object.as_ref()
    }

    /// Detaches the handle from its object without releasing the
    /// reference, which now belongs to the caller.
    pub fn take(&mut self) -> Option<Rc<T>> {
        self.object.take()
    }

    pub fn is_null(&self) -> bool {
        self.object.is_none()
    }

    /// Current reference count of the object, `0` for a null handle.
    pub fn use_count(&self) -> usize {
        self.get().map_or(0, |object| object.ref_count().get())
    }
}

fn release<T: RefCounted>(object: Rc<T>) -> Result<(), SyncError> {
    object.ref_count().release()?;
    Ok(())
}

fn report(err: SyncError) {
    error!(target: "weft::sync", error = %err, "unbalanced reference release");
    debug_assert!(false, "{err}");
}

impl<T: RefCounted> Clone for Shared<T> {
    fn clone(&self) -> Self {
        let mut shared = Self::null();
        shared.reset(self.object.clone());
        shared
    }
}

impl<T: RefCounted> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            if let Err(err) = release(object) {
                report(err);
            }
        }
    }
}

impl<T: RefCounted> Default for Shared<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: RefCounted> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("null", &self.is_null())
            .field("use_count", &self.use_count())
            .finish()
    }
}
