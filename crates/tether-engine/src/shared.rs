//! Descriptor shared across threads
//!
//! [`TypeDescriptor::materialize`] must not run concurrently on one
//! descriptor. Builder work is already serialized by the `&mut` borrow of the
//! host; [`SharedDescriptor`] additionally keeps the state and live type
//! consistent for threads that only read them, or that promote or invalidate
//! the descriptor while another thread materializes it.

use parking_lot::RwLock;
use tether_sdk::{ChangeKind, TypeBuilder, TypeHandle};

use crate::descriptor::{TypeDescriptor, TypeState};
use crate::error::ReflectResult;

/// Thread-safe wrapper around a [`TypeDescriptor`]
pub struct SharedDescriptor<B: TypeBuilder> {
    inner: RwLock<TypeDescriptor<B>>,
}

impl<B: TypeBuilder> SharedDescriptor<B> {
    /// Wrap a descriptor
    pub fn new(descriptor: TypeDescriptor<B>) -> Self {
        Self {
            inner: RwLock::new(descriptor),
        }
    }

    /// Materialize under the write lock.
    ///
    /// Up-to-date reads take the read lock only and never block each other.
    pub fn materialize(&self, host: &mut B::Host) -> ReflectResult<TypeHandle<B::Field>> {
        if let Some(handle) = self.inner.read().current(host) {
            return Ok(handle);
        }
        self.inner.write().materialize(host)
    }

    /// Current staleness
    pub fn state(&self) -> TypeState {
        self.inner.read().state()
    }

    /// Last materialized handle
    pub fn live_type(&self) -> Option<TypeHandle<B::Field>> {
        self.inner.read().live_type()
    }

    /// Consistent snapshot of state and live type
    pub fn snapshot(&self) -> (TypeState, Option<TypeHandle<B::Field>>) {
        let guard = self.inner.read();
        (guard.state(), guard.live_type())
    }

    /// Promote staleness
    pub fn promote(&self, change: ChangeKind) -> TypeState {
        self.inner.write().promote(change)
    }

    /// Forget the live type
    pub fn invalidate(&self) {
        self.inner.write().invalidate();
    }

    /// Run `f` with shared access to the descriptor
    pub fn with<R>(&self, f: impl FnOnce(&TypeDescriptor<B>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Unwrap the descriptor
    pub fn into_inner(self) -> TypeDescriptor<B> {
        self.inner.into_inner()
    }
}

impl<B: TypeBuilder> From<TypeDescriptor<B>> for SharedDescriptor<B> {
    fn from(descriptor: TypeDescriptor<B>) -> Self {
        Self::new(descriptor)
    }
}
