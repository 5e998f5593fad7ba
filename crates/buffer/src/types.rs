// Chunk: docs/chunks/text_buffer - Text buffer layered on the byte gap container

use std::fmt;

/// Position in the buffer as (line, column) where both are 0-indexed.
///
/// Columns count bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Compare by line first, then by column
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.col.cmp(&other.col),
            ord => ord,
        }
    }
}

/// Projection of the cursor offset through the line cache.
///
/// Recomputed on every call to
/// [`TextBuffer::cursor_position`](crate::TextBuffer::cursor_position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
    /// Byte offset of the cursor from the start of the buffer.
    pub absolute: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize, absolute: usize) -> Self {
        Self {
            line,
            column,
            absolute,
        }
    }

    /// Drops the absolute offset.
    pub fn to_position(self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Growth policy for a gap container.
///
/// The first block holds `min_capacity` elements; each later growth
/// multiplies the capacity by `growth_factor`, unless a bulk insert needs
/// more, in which case the block is sized to fit exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    pub min_capacity: usize,
    pub growth_factor: usize,
}

impl GrowthPolicy {
    pub const DEFAULT_MIN_CAPACITY: usize = 16;
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    pub fn new(min_capacity: usize, growth_factor: usize) -> Self {
        Self {
            min_capacity: min_capacity.max(1),
            growth_factor: growth_factor.max(2),
        }
    }

    /// Capacity of the next block given the current one and the minimum the
    /// caller needs. Returns `None` on overflow.
    pub fn next_capacity(&self, current: usize, required: usize) -> Option<usize> {
        let geometric = if current == 0 {
            self.min_capacity
        } else {
            current.checked_mul(self.growth_factor)?
        };
        Some(geometric.max(required))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_CAPACITY, Self::DEFAULT_GROWTH_FACTOR)
    }
}

/// Snapshot of a text buffer's storage and cache state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStats {
    pub total_size: usize,
    pub gap_size: usize,
    pub capacity: usize,
    /// `gap_size / capacity`, or 0.0 for an unallocated buffer.
    pub gap_ratio: f64,
    pub line_count: usize,
    pub line_cache_valid: bool,
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={} gap={} capacity={} gap_ratio={:.2} lines={} line_cache={}",
            self.total_size,
            self.gap_size,
            self.capacity,
            self.gap_ratio,
            self.line_count,
            if self.line_cache_valid { "valid" } else { "stale" },
        )
    }
}
