// Chunk: docs/chunks/gap_container - Generic gap container foundation

//! Gap buffer implementation for efficient localized editing.
//!
//! A gap buffer is an element array with a movable gap of unused slots.
//! Insertions and deletions at the gap are O(1); moving the gap is
//! O(distance) but amortizes well for typical editing patterns (locality of
//! edits).
//!
//! The block is obtained from an [`AllocStrategy`]. Growth moves every
//! element into a fresh block through a [`BlockBuilder`], so a failed
//! allocation leaves the container exactly as it was.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Chain;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice;

use crate::alloc_strategy::{AllocStrategy, Global};
use crate::block::{release_block, BlockBuilder};
use crate::error::{BufferError, Result};
use crate::gap_cursor::{GapCursor, GapGeometry};
use crate::types::GrowthPolicy;

/// Borrowing iterator over the logical elements.
pub type Iter<'a, T> = Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>;

/// Mutable borrowing iterator over the logical elements.
pub type IterMut<'a, T> = Chain<slice::IterMut<'a, T>, slice::IterMut<'a, T>>;

/// A generic sequence container with one relocatable gap.
///
/// The block is `[pre-gap elements | gap | post-gap elements]`. Logical index
/// `i` lives in slot `i` when `i < gap_start`, otherwise in slot
/// `i + (gap_end - gap_start)`.
pub struct GapBuffer<T, A: AllocStrategy = Global> {
    alloc: A,
    ptr: NonNull<T>,
    gap_start: usize,
    gap_end: usize,
    buffer_size: usize,
    policy: GrowthPolicy,
    /// Elements shifted by gap relocation since construction.
    moved: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer owns its elements like a `Vec<T>` does.
unsafe impl<T: Send, A: AllocStrategy + Send> Send for GapBuffer<T, A> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, A: AllocStrategy + Sync> Sync for GapBuffer<T, A> {}

fn expect_alloc<R>(result: Result<R>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("gap buffer allocation failed: {err}"),
    }
}

impl<T> GapBuffer<T> {
    /// Creates an empty buffer. No memory is allocated until the first insert.
    pub fn new() -> Self {
        Self::with_strategy_and_policy(Global, GrowthPolicy::default())
    }

    /// Creates an empty buffer whose gap holds at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.reserve(capacity)?;
        Ok(buffer)
    }

    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self::with_strategy_and_policy(Global, policy)
    }

    /// Creates a buffer holding clones of `items`.
    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        let mut buffer = Self::new();
        buffer.insert_slice(0, items)?;
        Ok(buffer)
    }
}

impl<T, A: AllocStrategy> GapBuffer<T, A> {
    pub fn with_strategy(alloc: A) -> Self {
        Self::with_strategy_and_policy(alloc, GrowthPolicy::default())
    }

    pub fn with_strategy_and_policy(alloc: A, policy: GrowthPolicy) -> Self {
        Self {
            alloc,
            ptr: NonNull::dangling(),
            gap_start: 0,
            gap_end: 0,
            buffer_size: 0,
            policy,
            moved: 0,
            _marker: PhantomData,
        }
    }

    pub fn strategy(&self) -> &A {
        &self.alloc
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    // ==================== Size & Geometry ====================

    /// Returns the logical length of the buffer (excluding the gap).
    pub fn len(&self) -> usize {
        self.buffer_size - self.gap_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of slots in the block, gap included.
    pub fn capacity(&self) -> usize {
        self.buffer_size
    }

    pub fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    pub fn geometry(&self) -> GapGeometry {
        GapGeometry {
            gap_start: self.gap_start,
            gap_end: self.gap_end,
            buffer_size: self.buffer_size,
        }
    }

    /// Cumulative number of elements shifted across the gap by relocation.
    ///
    /// Growth and shrinking are not counted.
    pub fn elements_moved(&self) -> usize {
        self.moved
    }

    fn physical(&self, index: usize) -> usize {
        if index < self.gap_start {
            index
        } else {
            index + self.gap_len()
        }
    }

    // ==================== Element Access ====================

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: in-range logical indices map to live slots.
        Some(unsafe { &*self.ptr.as_ptr().add(self.physical(index)) })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        // SAFETY: in-range logical indices map to live slots.
        Some(unsafe { &mut *self.ptr.as_ptr().add(self.physical(index)) })
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        &*self.ptr.as_ptr().add(self.physical(index))
    }

    /// Bounds-checked access that reports [`BufferError::OutOfRange`].
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.get(index)
            .ok_or_else(|| BufferError::out_of_range(index, len))
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.get_mut(index)
            .ok_or_else(|| BufferError::out_of_range(index, len))
    }

    pub fn front(&self) -> Result<&T> {
        self.at(0)
    }

    pub fn back(&self) -> Result<&T> {
        self.at(self.len().wrapping_sub(1))
    }

    pub(crate) fn live_slot(&self, physical: usize) -> Option<&T> {
        if !self.geometry().is_live(physical) {
            return None;
        }
        // SAFETY: live slots hold initialised elements.
        Some(unsafe { &*self.ptr.as_ptr().add(physical) })
    }

    pub(crate) fn live_slot_mut(&mut self, physical: usize) -> Option<&mut T> {
        if !self.geometry().is_live(physical) {
            return None;
        }
        // SAFETY: live slots hold initialised elements.
        Some(unsafe { &mut *self.ptr.as_ptr().add(physical) })
    }

    /// The pre-gap and post-gap elements, in logical order.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let base = self.ptr.as_ptr();
        // SAFETY: both zones hold initialised elements and do not overlap.
        unsafe {
            (
                slice::from_raw_parts(base, self.gap_start),
                slice::from_raw_parts(base.add(self.gap_end), self.buffer_size - self.gap_end),
            )
        }
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let base = self.ptr.as_ptr();
        // SAFETY: both zones hold initialised elements and do not overlap.
        unsafe {
            (
                slice::from_raw_parts_mut(base, self.gap_start),
                slice::from_raw_parts_mut(base.add(self.gap_end), self.buffer_size - self.gap_end),
            )
        }
    }

    /// Moves the gap to the end and returns all elements as one slice.
    pub fn make_contiguous(&mut self) -> &mut [T] {
        self.move_gap_to(self.len());
        self.as_mut_slices().0
    }

    /// All elements as one slice, copied only when the gap sits in the middle.
    pub fn contiguous(&self) -> Cow<'_, [T]>
    where
        T: Clone,
    {
        match self.as_slices() {
            (front, []) => Cow::Borrowed(front),
            ([], back) => Cow::Borrowed(back),
            (front, back) => Cow::Owned([front, back].concat()),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slices();
        front.iter().chain(back.iter())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (front, back) = self.as_mut_slices();
        front.iter_mut().chain(back.iter_mut())
    }

    // ==================== Cursors ====================

    pub fn cursor_at(&self, pos: usize) -> GapCursor {
        GapCursor::new(pos, self.geometry())
    }

    pub fn begin(&self) -> GapCursor {
        self.cursor_at(0)
    }

    pub fn end(&self) -> GapCursor {
        self.cursor_at(self.len())
    }

    // ==================== Gap Management ====================

    /// Moves the gap so that it starts at logical position `pos`.
    ///
    /// Only the elements between the old and new gap positions are shifted,
    /// in one block move across the gap.
    fn move_gap_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.len());
        let base = self.ptr.as_ptr();

        match pos.cmp(&self.gap_start) {
            Ordering::Equal => {}
            Ordering::Less => {
                // Move gap left: [pos..gap_start] slides to the end of the gap
                let shift = self.gap_start - pos;
                // SAFETY: source and destination lie inside the block; `copy` handles overlap.
                unsafe { ptr::copy(base.add(pos), base.add(self.gap_end - shift), shift) };
                self.gap_start = pos;
                self.gap_end -= shift;
                self.moved += shift;
            }
            Ordering::Greater => {
                // Move gap right: [gap_end..gap_end + shift] slides to gap_start
                let shift = pos - self.gap_start;
                // SAFETY: as above.
                unsafe { ptr::copy(base.add(self.gap_end), base.add(self.gap_start), shift) };
                self.gap_start += shift;
                self.gap_end += shift;
                self.moved += shift;
            }
        }
    }

    /// Moves every element into a fresh block of `new_capacity` slots,
    /// keeping the gap at the same logical position.
    fn relocate(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len());
        let tail_len = self.buffer_size - self.gap_end;
        let base = self.ptr.as_ptr();

        let mut builder = BlockBuilder::new(&self.alloc, new_capacity)?;
        // SAFETY: both zones hold live elements; the old block is released
        // below without dropping them, so ownership passes to the builder.
        unsafe {
            builder.adopt_head(base, self.gap_start);
            builder.adopt_tail(base.add(self.gap_end), tail_len);
        }
        let block = builder.commit();
        debug_assert_eq!(block.head, self.gap_start);

        // SAFETY: every element was moved out above.
        unsafe { release_block(&self.alloc, self.ptr, self.buffer_size) };
        self.ptr = block.ptr;
        self.gap_end = block.capacity - block.tail;
        self.buffer_size = block.capacity;
        Ok(())
    }

    /// Grows the block so that the gap holds at least `additional` elements.
    ///
    /// On failure nothing changes.
    fn ensure_gap(&mut self, additional: usize) -> Result<()> {
        if self.gap_len() >= additional {
            return Ok(());
        }
        let required = self
            .len()
            .checked_add(additional)
            .ok_or(BufferError::CapacityOverflow)?;
        let new_capacity = self
            .policy
            .next_capacity(self.buffer_size, required)
            .ok_or(BufferError::CapacityOverflow)?;

        tracing::trace!(
            old_capacity = self.buffer_size,
            new_capacity,
            "growing gap buffer"
        );
        self.relocate(new_capacity)
    }

    /// Ensures room for `additional` more elements without a reallocation.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.ensure_gap(additional)
    }

    /// Reallocates the block to exactly fit the current elements.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.buffer_size == self.len() {
            return Ok(());
        }
        tracing::trace!(
            old_capacity = self.buffer_size,
            new_capacity = self.len(),
            "shrinking gap buffer"
        );
        self.relocate(self.len())
    }

    // ==================== Mutations ====================

    /// Inserts `value` at logical position `pos`.
    ///
    /// Returns a cursor to the inserted element.
    pub fn insert(&mut self, pos: usize, value: T) -> Result<GapCursor> {
        let len = self.len();
        if pos > len {
            return Err(BufferError::out_of_range(pos, len));
        }
        self.move_gap_to(pos);
        self.ensure_gap(1)?;
        // SAFETY: the gap holds at least one free slot at gap_start.
        unsafe {
            self.alloc
                .construct(self.ptr.as_ptr().add(self.gap_start), value)
        };
        self.gap_start += 1;
        Ok(self.cursor_at(pos))
    }

    /// Inserts every item of `items` starting at `pos`, in order.
    ///
    /// The gap is sized once from the iterator's length. Returns a cursor to
    /// the first inserted element.
    pub fn insert_iter<I>(&mut self, pos: usize, items: I) -> Result<GapCursor>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let len = self.len();
        if pos > len {
            return Err(BufferError::out_of_range(pos, len));
        }
        let items = items.into_iter();
        self.move_gap_to(pos);
        self.ensure_gap(items.len())?;

        for item in items {
            // An iterator that under-reports its length still gets room.
            self.ensure_gap(1)?;
            // SAFETY: the gap holds at least one free slot at gap_start.
            unsafe {
                self.alloc
                    .construct(self.ptr.as_ptr().add(self.gap_start), item)
            };
            self.gap_start += 1;
        }
        Ok(self.cursor_at(pos))
    }

    pub fn insert_slice(&mut self, pos: usize, items: &[T]) -> Result<GapCursor>
    where
        T: Clone,
    {
        self.insert_iter(pos, items.iter().cloned())
    }

    /// Removes `count` elements starting at `pos`.
    ///
    /// Returns a cursor to `pos`.
    pub fn erase(&mut self, pos: usize, count: usize) -> Result<GapCursor> {
        let len = self.len();
        match pos.checked_add(count) {
            Some(end) if end <= len => {}
            _ => return Err(BufferError::out_of_range(pos.saturating_add(count), len)),
        }
        self.move_gap_to(pos);
        self.destroy_after_gap(count);
        Ok(self.cursor_at(pos))
    }

    /// Drops the `count` elements that follow the gap, widening it.
    fn destroy_after_gap(&mut self, count: usize) {
        debug_assert!(count <= self.buffer_size - self.gap_end);
        for _ in 0..count {
            let slot = self.gap_end;
            // Widen first so a panicking drop leaks instead of double-dropping.
            self.gap_end += 1;
            // SAFETY: the slot held a live element that is now outside the live zones.
            unsafe { self.alloc.destroy(self.ptr.as_ptr().add(slot)) };
        }
    }

    /// Removes and returns the element at `pos`.
    pub fn remove(&mut self, pos: usize) -> Result<T> {
        let len = self.len();
        if pos >= len {
            return Err(BufferError::out_of_range(pos, len));
        }
        self.move_gap_to(pos);
        let slot = self.gap_end;
        self.gap_end += 1;
        // SAFETY: the slot held a live element that is now part of the gap.
        Ok(unsafe { ptr::read(self.ptr.as_ptr().add(slot)) })
    }

    /// Appends `value` at the logical end.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.insert(self.len(), value).map(|_| ())
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.remove(len - 1).ok()
    }

    /// Drops every element past `len`.
    pub fn truncate(&mut self, len: usize) {
        let current = self.len();
        if len >= current {
            return;
        }
        self.move_gap_to(len);
        self.destroy_after_gap(current - len);
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        let current = self.len();
        if new_len <= current {
            self.truncate(new_len);
            return Ok(());
        }
        let extra = new_len - current;
        self.move_gap_to(current);
        self.ensure_gap(extra)?;
        for _ in 0..extra {
            // SAFETY: `ensure_gap` reserved `extra` free slots.
            unsafe {
                self.alloc
                    .construct(self.ptr.as_ptr().add(self.gap_start), value.clone())
            };
            self.gap_start += 1;
        }
        Ok(())
    }

    /// Replaces the whole content with `items`.
    pub fn assign<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.clear();
        self.insert_iter(0, items).map(|_| ())
    }

    /// Drops every element; the gap then covers the whole block.
    pub fn clear(&mut self) {
        let (head, tail_start) = (self.gap_start, self.gap_end);
        // Collapse first so a panicking drop leaks the rest instead of double-dropping.
        self.gap_start = 0;
        self.gap_end = self.buffer_size;

        let base = self.ptr.as_ptr();
        // SAFETY: these were exactly the live slots before the collapse.
        unsafe {
            for i in 0..head {
                self.alloc.destroy(base.add(i));
            }
            for i in tail_start..self.buffer_size {
                self.alloc.destroy(base.add(i));
            }
        }
    }

    /// Clones into a block sized to the current length.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let alloc = self.alloc.clone();
        let len = self.len();
        let block = {
            let mut builder = BlockBuilder::new(&alloc, len)?;
            for item in self.iter() {
                builder.push_head(item.clone());
            }
            builder.commit()
        };
        Ok(Self {
            alloc,
            ptr: block.ptr,
            gap_start: len,
            gap_end: len,
            buffer_size: len,
            policy: self.policy,
            moved: 0,
            _marker: PhantomData,
        })
    }
}

impl<T, A: AllocStrategy> Drop for GapBuffer<T, A> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: `clear` dropped every element.
        unsafe { release_block(&self.alloc, self.ptr, self.buffer_size) };
    }
}

impl<T> Default for GapBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: AllocStrategy + Clone> Clone for GapBuffer<T, A> {
    fn clone(&self) -> Self {
        expect_alloc(self.try_clone())
    }
}

impl<T: fmt::Debug, A: AllocStrategy> fmt::Debug for GapBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for GapBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let mut buffer = Self::new();
        expect_alloc(buffer.insert_iter(0, items));
        buffer
    }
}

impl<T> From<Vec<T>> for GapBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T, A: AllocStrategy> Extend<T> for GapBuffer<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            expect_alloc(self.push(item));
        }
    }
}

impl<'a, T, A: AllocStrategy> IntoIterator for &'a GapBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, A: AllocStrategy> Index<usize> for GapBuffer<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!("index {index} out of range for length {}", self.len()),
        }
    }
}

impl<T, A: AllocStrategy> IndexMut<usize> for GapBuffer<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("index {index} out of range for length {len}"),
        }
    }
}

impl<T: PartialEq, A: AllocStrategy, B: AllocStrategy> PartialEq<GapBuffer<T, B>> for GapBuffer<T, A> {
    fn eq(&self, other: &GapBuffer<T, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: AllocStrategy> Eq for GapBuffer<T, A> {}

impl<T: PartialOrd, A: AllocStrategy> PartialOrd for GapBuffer<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: AllocStrategy> Ord for GapBuffer<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: AllocStrategy> Hash for GapBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self.iter() {
            item.hash(state);
        }
    }
}
