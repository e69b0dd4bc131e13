//! Non-owning handles to host reflection objects
//!
//! The host's reflection registry owns every reflection object. Everyone else
//! refers to them through a generational handle: a slot index plus the stamp
//! the slot had when the object was stored. Freeing a slot bumps its stamp,
//! so handles taken before the free are detectably dead instead of dangling.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Untyped generational handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle {
    /// Slot index in the owning registry
    pub index: u32,
    /// Slot stamp at the time the handle was issued
    pub stamp: u32,
}

impl RawHandle {
    /// Create a raw handle
    pub const fn new(index: u32, stamp: u32) -> Self {
        Self { index, stamp }
    }
}

/// Handle to a reflection object of kind `T`
pub struct TypeHandle<T> {
    raw: RawHandle,
    _kind: PhantomData<fn() -> T>,
}

impl<T> TypeHandle<T> {
    /// Wrap a raw handle issued by a registry holding `T`s
    pub const fn from_raw(raw: RawHandle) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    /// Untyped form
    pub const fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Slot index
    pub const fn index(&self) -> u32 {
        self.raw.index
    }
}

impl<T> Clone for TypeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypeHandle<T> {}

impl<T> PartialEq for TypeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for TypeHandle<T> {}

impl<T> Hash for TypeHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for TypeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({}v{})", self.raw.index, self.raw.stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    #[test]
    fn test_handle_identity() {
        let a: TypeHandle<Opaque> = TypeHandle::from_raw(RawHandle::new(3, 1));
        let b = a;
        let c: TypeHandle<Opaque> = TypeHandle::from_raw(RawHandle::new(3, 2));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.index(), c.index());
        assert_eq!(format!("{:?}", a), "TypeHandle(3v1)");
    }
}
