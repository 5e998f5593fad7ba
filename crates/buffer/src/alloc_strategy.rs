// Chunk: docs/chunks/alloc_strategy - Pluggable block allocation for the gap container

//! Allocation strategies for [`GapBuffer`](crate::GapBuffer).
//!
//! A strategy hands out raw blocks and places/destroys elements inside them.
//! The container is the only caller: it never requests a zero-sized block and
//! always releases a block with the layout it was allocated with.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::error::{BufferError, Result};

/// Acquires and releases raw memory blocks for a gap container.
///
/// `construct` and `destroy` default to a plain write and an in-place drop.
/// Strategies that track element lifetimes (for instance in tests) can
/// override them.
pub trait AllocStrategy {
    /// Allocates a block for `layout`. `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// Releases a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this strategy with the same `layout`,
    /// and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves `value` into the uninitialised `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes, aligned, and not hold a live value.
    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        ptr::write(slot, value);
    }

    /// Drops the value held in `slot`, leaving it uninitialised.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that nothing else will drop.
    unsafe fn destroy<T>(&self, slot: *mut T) {
        ptr::drop_in_place(slot);
    }
}

/// The platform allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

impl AllocStrategy for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: the container never requests zero-sized layouts.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).ok_or(BufferError::AllocFailed {
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout);
    }
}

impl<S: AllocStrategy> AllocStrategy for &S {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout);
    }

    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        (**self).construct(slot, value);
    }

    unsafe fn destroy<T>(&self, slot: *mut T) {
        (**self).destroy(slot);
    }
}
