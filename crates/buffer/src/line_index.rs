// Chunk: docs/chunks/line_cache - Lazily rebuilt line-start cache

//! Line index for tracking line boundaries in the text buffer.
//!
//! Holds the byte offset where each line starts. The text buffer does not
//! update it incrementally: every mutation throws the index away and the
//! next line/column query rebuilds it with one linear scan.

/// Tracks line boundaries in a byte sequence.
///
/// Enables O(1) access to line count and line starts, and O(log n) lookup of
/// the line containing a given offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offsets where each line starts. line_starts[0] = 0 always.
    /// Every other entry is the offset immediately after a `\n` byte.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new line index with a single empty line.
    pub fn new() -> Self {
        Self {
            line_starts: vec![0],
        }
    }

    /// Builds the index for `content` in one pass.
    pub fn build<I>(content: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut index = Self::new();
        index.rebuild(content);
        index
    }

    /// Rebuilds the index from the given content.
    ///
    /// This is O(n) where n is the content length.
    pub fn rebuild<I>(&mut self, content: I)
    where
        I: IntoIterator<Item = u8>,
    {
        self.line_starts.clear();
        self.line_starts.push(0);

        let mut offset = 0;
        for byte in content {
            offset += 1;
            if byte == b'\n' {
                self.line_starts.push(offset);
            }
        }
    }

    /// Returns the number of lines.
    ///
    /// Always at least one, even for empty content.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the byte offset where the given line starts.
    ///
    /// Returns None if the line index is out of bounds.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Returns the byte offset of the end of the given line.
    ///
    /// For all lines except the last, this points to the `\n` byte.
    /// For the last line, this equals `total_len`.
    pub fn line_end(&self, line: usize, total_len: usize) -> Option<usize> {
        if line >= self.line_count() {
            return None;
        }

        if line + 1 < self.line_count() {
            // Not the last line: end is the start of the next line minus 1 (the newline)
            Some(self.line_starts[line + 1] - 1)
        } else {
            // Last line: end is the buffer length
            Some(total_len)
        }
    }

    /// Returns the length of the given line (excluding the `\n` byte).
    pub fn line_len(&self, line: usize, total_len: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let end = self.line_end(line, total_len)?;
        Some(end - start)
    }

    /// Returns the line number containing the given byte offset.
    ///
    /// Binary search for the greatest line start not after `offset`.
    pub fn line_at_offset(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Returns the raw line starts.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
