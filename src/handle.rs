//! Owned wrapper around a native resource.
//!
//! The wrapped value releases its native resource in `Drop`. `close` takes
//! the value out and drops it, so the release runs exactly once no matter how
//! many times `close` is called or whether the owner is dropped afterwards.

use crate::error::BackendError;

#[derive(Debug)]
pub enum NativeHandle<T> {
    Active(T),
    Closed,
}

impl<T> NativeHandle<T> {
    pub fn new(resource: T) -> Self {
        NativeHandle::Active(resource)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, NativeHandle::Active(_))
    }

    pub fn get(&self, operation: &'static str) -> Result<&T, BackendError> {
        match self {
            NativeHandle::Active(resource) => Ok(resource),
            NativeHandle::Closed => Err(BackendError::Closed { operation }),
        }
    }

    pub fn get_mut(&mut self, operation: &'static str) -> Result<&mut T, BackendError> {
        match self {
            NativeHandle::Active(resource) => Ok(resource),
            NativeHandle::Closed => Err(BackendError::Closed { operation }),
        }
    }

    /// Releases the resource. Returns `true` if this call did the release.
    pub fn close(&mut self) -> bool {
        match std::mem::replace(self, NativeHandle::Closed) {
            NativeHandle::Active(resource) => {
                drop(resource);
                true
            }
            NativeHandle::Closed => false,
        }
    }
}
