// Chunk: docs/chunks/alloc_strategy - Pluggable block allocation for the gap container

//! Raw element blocks and the transactional builder used during growth.
//!
//! A block is `capacity` slots of `T`. The builder fills a fresh block from
//! both ends (head slots `[0, head)`, tail slots `[capacity - tail, capacity)`)
//! and owns everything it constructed until [`BlockBuilder::commit`]. If it is
//! dropped first (early return or unwinding out of an element clone) it
//! destroys exactly the constructed slots and releases the block.

use std::alloc::Layout;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use crate::alloc_strategy::AllocStrategy;
use crate::error::{BufferError, Result};

/// Layout of a block holding `capacity` elements.
pub(crate) fn block_layout<T>(capacity: usize) -> Result<Layout> {
    Layout::array::<T>(capacity).map_err(|_| BufferError::CapacityOverflow)
}

/// Whether a block of this capacity needs memory from the strategy.
fn needs_memory<T>(capacity: usize) -> bool {
    capacity != 0 && mem::size_of::<T>() != 0
}

/// Allocates a block, or returns a dangling pointer when no memory is needed.
pub(crate) fn allocate_block<T, A: AllocStrategy>(alloc: &A, capacity: usize) -> Result<NonNull<T>> {
    let layout = block_layout::<T>(capacity)?;
    if !needs_memory::<T>(capacity) {
        return Ok(NonNull::dangling());
    }
    Ok(alloc.allocate(layout)?.cast())
}

/// Releases a block without touching its slots.
///
/// # Safety
///
/// `ptr` must come from [`allocate_block`] with the same strategy and
/// capacity, and every live element in it must already be dropped or moved out.
pub(crate) unsafe fn release_block<T, A: AllocStrategy>(alloc: &A, ptr: NonNull<T>, capacity: usize) {
    if !needs_memory::<T>(capacity) {
        return;
    }
    // The layout was valid when the block was allocated.
    if let Ok(layout) = block_layout::<T>(capacity) {
        alloc.deallocate(ptr.cast(), layout);
    }
}

/// A block handed over by a committed [`BlockBuilder`].
#[derive(Debug)]
pub(crate) struct BuiltBlock<T> {
    pub ptr: NonNull<T>,
    pub capacity: usize,
    pub head: usize,
    pub tail: usize,
}

/// Guard that owns a partially built block.
pub(crate) struct BlockBuilder<'a, T, A: AllocStrategy> {
    alloc: &'a A,
    ptr: NonNull<T>,
    capacity: usize,
    head: usize,
    tail: usize,
}

impl<'a, T, A: AllocStrategy> BlockBuilder<'a, T, A> {
    /// Allocates an empty block of `capacity` slots.
    pub fn new(alloc: &'a A, capacity: usize) -> Result<Self> {
        let ptr = allocate_block::<T, A>(alloc, capacity)?;
        Ok(Self {
            alloc,
            ptr,
            capacity,
            head: 0,
            tail: 0,
        })
    }

    fn free_slots(&self) -> usize {
        self.capacity - self.head - self.tail
    }

    /// Constructs `value` in the next head slot.
    pub fn push_head(&mut self, value: T) {
        assert!(self.free_slots() > 0, "block builder is full");
        // SAFETY: the slot lies in the unconstructed middle of the block.
        unsafe { self.alloc.construct(self.ptr.as_ptr().add(self.head), value) };
        self.head += 1;
    }

    /// Moves `count` elements from `src` into the next head slots.
    ///
    /// # Safety
    ///
    /// `src..src + count` must hold live elements that the caller treats as
    /// moved out afterwards, and must not overlap this block.
    pub unsafe fn adopt_head(&mut self, src: *const T, count: usize) {
        assert!(count <= self.free_slots(), "block builder overflow");
        ptr::copy_nonoverlapping(src, self.ptr.as_ptr().add(self.head), count);
        self.head += count;
    }

    /// Moves `count` elements from `src` in front of the current tail.
    ///
    /// # Safety
    ///
    /// Same contract as [`adopt_head`](Self::adopt_head).
    pub unsafe fn adopt_tail(&mut self, src: *const T, count: usize) {
        assert!(count <= self.free_slots(), "block builder overflow");
        let dst = self.capacity - self.tail - count;
        ptr::copy_nonoverlapping(src, self.ptr.as_ptr().add(dst), count);
        self.tail += count;
    }

    /// Disarms the guard and hands the block to the caller.
    pub fn commit(self) -> BuiltBlock<T> {
        let this = ManuallyDrop::new(self);
        BuiltBlock {
            ptr: this.ptr,
            capacity: this.capacity,
            head: this.head,
            tail: this.tail,
        }
    }
}

impl<T, A: AllocStrategy> Drop for BlockBuilder<'_, T, A> {
    fn drop(&mut self) {
        let base = self.ptr.as_ptr();
        // SAFETY: exactly these slots were constructed by this builder.
        unsafe {
            for i in 0..self.head {
                self.alloc.destroy(base.add(i));
            }
            for i in self.capacity - self.tail..self.capacity {
                self.alloc.destroy(base.add(i));
            }
            release_block(self.alloc, self.ptr, self.capacity);
        }
    }
}
