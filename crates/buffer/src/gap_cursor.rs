// Chunk: docs/chunks/cursor_iterator - Logical-position handle over the gap container

//! Cursor iterators over a [`GapBuffer`].
//!
//! A [`GapCursor`] is a plain value: a logical position plus a snapshot of the
//! gap geometry taken when it was created. It does not borrow the container,
//! so reads go through an explicit `&GapBuffer` argument. Physical slots are
//! computed directly from the snapshot, which makes every movement O(1).
//!
//! Any operation that moves the gap, grows the block or destroys elements
//! leaves previously obtained cursors stale. Using a stale cursor is a caller
//! error that is not detected; the only guarantee is that a read which would
//! land outside the container's live elements reports
//! [`BufferError::OutOfRange`] instead of touching uninitialised memory.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::alloc_strategy::AllocStrategy;
use crate::error::{BufferError, Result};
use crate::gap_buffer::GapBuffer;

/// The three zones of a gap container's block.
///
/// `[0, gap_start)` and `[gap_end, buffer_size)` hold elements; the slots in
/// between are the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct GapGeometry {
    pub gap_start: usize,
    pub gap_end: usize,
    pub buffer_size: usize,
}

impl GapGeometry {
    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.buffer_size - self.gap_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Maps a logical index to its slot in the block.
    pub fn physical(&self, logical: usize) -> usize {
        if logical < self.gap_start {
            logical
        } else {
            logical + self.gap_len()
        }
    }

    /// Whether `physical` names a slot that holds an element.
    pub fn is_live(&self, physical: usize) -> bool {
        physical < self.gap_start || (self.gap_end..self.buffer_size).contains(&physical)
    }
}

/// A logical position inside a gap container.
///
/// Equality and ordering compare positions only. Comparing cursors taken from
/// different containers is meaningless and not detected.
#[derive(Debug, Clone, Copy)]
pub struct GapCursor {
    pos: usize,
    geometry: GapGeometry,
}

impl GapCursor {
    pub(crate) fn new(pos: usize, geometry: GapGeometry) -> Self {
        Self { pos, geometry }
    }

    /// The logical position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The geometry captured when the cursor was created.
    pub fn geometry(&self) -> GapGeometry {
        self.geometry
    }

    /// Whether the cursor sits one past the last element of its snapshot.
    pub fn is_end(&self) -> bool {
        self.pos == self.geometry.len()
    }

    fn resolve(&self) -> Result<usize> {
        let len = self.geometry.len();
        if self.pos >= len {
            return Err(BufferError::out_of_range(self.pos, len));
        }
        Ok(self.geometry.physical(self.pos))
    }

    /// Reads the element under the cursor.
    pub fn get<'a, T, A: AllocStrategy>(&self, buffer: &'a GapBuffer<T, A>) -> Result<&'a T> {
        let physical = self.resolve()?;
        buffer
            .live_slot(physical)
            .ok_or_else(|| BufferError::out_of_range(self.pos, buffer.len()))
    }

    /// Mutable access to the element under the cursor.
    pub fn get_mut<'a, T, A: AllocStrategy>(
        &self,
        buffer: &'a mut GapBuffer<T, A>,
    ) -> Result<&'a mut T> {
        let physical = self.resolve()?;
        let len = buffer.len();
        buffer
            .live_slot_mut(physical)
            .ok_or_else(|| BufferError::out_of_range(self.pos, len))
    }

    /// Reads the element `offset` positions away without moving the cursor.
    pub fn peek<'a, T, A: AllocStrategy>(
        &self,
        offset: isize,
        buffer: &'a GapBuffer<T, A>,
    ) -> Result<&'a T> {
        (*self + offset).get(buffer)
    }

    pub fn increment(&mut self) -> &mut Self {
        self.advance(1)
    }

    pub fn decrement(&mut self) -> &mut Self {
        self.advance(-1)
    }

    /// Moves the cursor by `offset` positions. Moving before the start wraps
    /// to a position that every read rejects.
    pub fn advance(&mut self, offset: isize) -> &mut Self {
        self.pos = self.pos.wrapping_add_signed(offset);
        self
    }

    /// Signed distance from `other` to `self`.
    pub fn distance(&self, other: &GapCursor) -> isize {
        (self.pos as isize).wrapping_sub(other.pos as isize)
    }
}

impl PartialEq for GapCursor {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for GapCursor {}

impl PartialOrd for GapCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GapCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pos.cmp(&other.pos)
    }
}

impl Add<isize> for GapCursor {
    type Output = GapCursor;

    fn add(mut self, offset: isize) -> GapCursor {
        self.advance(offset);
        self
    }
}

impl AddAssign<isize> for GapCursor {
    fn add_assign(&mut self, offset: isize) {
        self.advance(offset);
    }
}

impl Sub<isize> for GapCursor {
    type Output = GapCursor;

    fn sub(mut self, offset: isize) -> GapCursor {
        self.advance(offset.wrapping_neg());
        self
    }
}

impl SubAssign<isize> for GapCursor {
    fn sub_assign(&mut self, offset: isize) {
        self.advance(offset.wrapping_neg());
    }
}

impl Sub<GapCursor> for GapCursor {
    type Output = isize;

    fn sub(self, other: GapCursor) -> isize {
        self.distance(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GapBuffer<char> {
        // "abcdef" with the gap between 'c' and 'd'
        let mut buf: GapBuffer<char> = "abcdef".chars().collect();
        buf.insert(3, 'x').unwrap();
        buf.erase(3, 1).unwrap();
        buf
    }

    #[test]
    fn test_geometry_mapping() {
        let geometry = GapGeometry {
            gap_start: 2,
            gap_end: 5,
            buffer_size: 8,
        };
        assert_eq!(geometry.len(), 5);
        assert_eq!(geometry.physical(1), 1);
        assert_eq!(geometry.physical(2), 5);
        assert_eq!(geometry.physical(4), 7);
        assert!(geometry.is_live(1));
        assert!(!geometry.is_live(3));
        assert!(geometry.is_live(5));
        assert!(!geometry.is_live(8));
    }

    #[test]
    fn test_walk_across_gap() {
        let buf = sample();
        assert_eq!(buf.geometry().gap_start, 3);

        let mut cursor = buf.begin();
        let mut seen = String::new();
        while cursor != buf.end() {
            seen.push(*cursor.get(&buf).unwrap());
            cursor.increment();
        }
        assert_eq!(seen, "abcdef");
    }

    #[test]
    fn test_random_access_and_distance() {
        let buf = sample();
        let begin = buf.begin();
        let fifth = begin + 4;
        assert_eq!(*fifth.get(&buf).unwrap(), 'e');
        assert_eq!(*fifth.peek(-2, &buf).unwrap(), 'c');
        assert_eq!(fifth - begin, 4);
        assert_eq!(begin.distance(&fifth), -4);
        assert_eq!(buf.end() - buf.begin(), 6);
        assert!(begin < fifth);
    }

    #[test]
    fn test_decrement_from_end() {
        let buf = sample();
        let mut cursor = buf.end();
        cursor.decrement();
        assert_eq!(*cursor.get(&buf).unwrap(), 'f');
        cursor -= 5;
        assert_eq!(*cursor.get(&buf).unwrap(), 'a');
    }

    #[test]
    fn test_end_is_out_of_range() {
        let buf = sample();
        let end = buf.end();
        assert!(end.is_end());
        assert!(matches!(
            end.get(&buf),
            Err(BufferError::OutOfRange { index: 6, len: 6 })
        ));
    }

    #[test]
    fn test_before_start_is_out_of_range() {
        let buf = sample();
        let cursor = buf.begin() - 1;
        assert!(cursor.get(&buf).is_err());
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut buf = sample();
        let cursor = buf.cursor_at(4);
        *cursor.get_mut(&mut buf).unwrap() = 'E';
        assert_eq!(buf.to_vec().into_iter().collect::<String>(), "abcdEf");
    }

    #[test]
    fn test_stale_cursor_never_reads_gap() {
        let mut buf = sample();
        let stale = buf.cursor_at(1);
        // Relocating the gap to the front turns slot 1 into gap space.
        buf.erase(0, 4).unwrap();
        assert!(stale.get(&buf).is_err());
    }
}
