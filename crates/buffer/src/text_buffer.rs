// Chunk: docs/chunks/text_buffer - Text buffer layered on the byte gap container

//! TextBuffer is the main public API for text editing operations.
//!
//! It owns a byte [`GapBuffer`] and adds a cursor offset plus a lazily built
//! [`LineIndex`]. Mutations discard the line index; the next line/column query
//! rebuilds it with one scan. The rebuild happens behind `&self` through a
//! [`OnceCell`], so a read-only query may fill the cache but never changes
//! content.
//!
//! Offsets and columns count bytes. Content is not required to be valid UTF-8;
//! see [`TextBuffer::is_valid_encoding`].

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::encoding::{self, LineEnding};
use crate::error::{BufferError, Result};
use crate::gap_buffer::GapBuffer;
use crate::line_index::LineIndex;
use crate::types::{BufferStats, CursorPosition, GrowthPolicy, Position};

/// Number of lines included by [`TextBuffer::log_debug_info`].
const DEBUG_PREVIEW_LINES: usize = 5;

/// Bytes that delimit words for word-wise cursor motion.
fn is_word_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0B
}

fn write_slices<W: Write>(writer: &mut W, front: &[u8], back: &[u8]) -> std::io::Result<()> {
    writer.write_all(front)?;
    writer.write_all(back)?;
    writer.flush()
}

/// A byte buffer with a cursor and line/column addressing.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    bytes: GapBuffer<u8>,
    /// Logical offset, always within `0..=len`.
    cursor: usize,
    /// Line starts of the current content, or empty when stale.
    line_cache: OnceCell<LineIndex>,
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            bytes: GapBuffer::with_policy(policy),
            cursor: 0,
            line_cache: OnceCell::new(),
        }
    }

    /// Creates a text buffer initialized with the given content.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Self::from_bytes(content.as_bytes())
    }

    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Ok(Self {
            bytes: GapBuffer::from_slice(content)?,
            cursor: 0,
            line_cache: OnceCell::new(),
        })
    }

    // ==================== Accessors ====================

    /// Returns the total byte count in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Total slots in the backing block, gap included.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Returns the entire buffer content as a String.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn content(&self) -> String {
        String::from_utf8_lossy(&self.linear()).into_owned()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// The bytes before and after the gap.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        self.bytes.as_slices()
    }

    /// The bytes in `start..end`, or an empty string unless
    /// `start < end <= len`.
    pub fn selection(&self, start: usize, end: usize) -> String {
        if start >= end || end > self.len() {
            return String::new();
        }
        let bytes: Vec<u8> = self.bytes.iter().skip(start).take(end - start).copied().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The content as one slice, copied only when the gap is in the middle.
    pub(crate) fn linear(&self) -> Cow<'_, [u8]> {
        self.bytes.contiguous()
    }

    // ==================== Line Cache ====================

    fn lines(&self) -> &LineIndex {
        self.line_cache
            .get_or_init(|| LineIndex::build(self.bytes.iter().copied()))
    }

    fn invalidate_lines(&mut self) {
        self.line_cache.take();
    }

    /// Whether the line index reflects the current content.
    pub fn is_line_cache_valid(&self) -> bool {
        self.line_cache.get().is_some()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// Always at least 1 (even for an empty buffer).
    pub fn line_count(&self) -> usize {
        self.lines().line_count()
    }

    /// Returns the offset where `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.lines().line_start(line)
    }

    /// Returns the length of the specified line (excluding newline).
    ///
    /// Out-of-range lines have length 0.
    pub fn line_len(&self, line: usize) -> usize {
        self.lines().line_len(line, self.len()).unwrap_or(0)
    }

    /// Returns the bytes of the specified line without its trailing `\n`.
    ///
    /// Returns an empty vector if the line index is out of bounds.
    pub fn line_bytes(&self, line: usize) -> Vec<u8> {
        let lines = self.lines();
        let (Some(start), Some(end)) = (lines.line_start(line), lines.line_end(line, self.len()))
        else {
            return Vec::new();
        };
        self.bytes.iter().skip(start).take(end - start).copied().collect()
    }

    /// Returns the content of the specified line as a String.
    ///
    /// The returned string does not include the trailing newline (if any).
    /// Returns an empty string if the line index is out of bounds.
    pub fn line_content(&self, line: usize) -> String {
        String::from_utf8_lossy(&self.line_bytes(line)).into_owned()
    }

    /// Converts an offset to a (line, column) position.
    ///
    /// Offsets past the end are treated as the end of the buffer.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len());
        let lines = self.lines();
        let line = lines.line_at_offset(offset);
        let start = lines.line_start(line).unwrap_or(0);
        Position::new(line, offset - start)
    }

    /// Converts a (line, column) position to an offset.
    ///
    /// The line is clamped to the last line and the column to the end of
    /// that line.
    pub fn position_to_offset(&self, pos: Position) -> usize {
        let lines = self.lines();
        let line = pos.line.min(lines.line_count() - 1);
        let start = lines.line_start(line).unwrap_or(0);
        let end = lines.line_end(line, self.len()).unwrap_or(start);
        start.saturating_add(pos.col).min(end)
    }

    // ==================== Cursor ====================

    /// Returns the cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Places the cursor at `offset`, clamped to the buffer length.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.len());
    }

    /// Returns the cursor as line, column and offset.
    pub fn cursor_position(&self) -> CursorPosition {
        let pos = self.offset_to_position(self.cursor);
        CursorPosition::new(pos.line, pos.col, self.cursor)
    }

    /// Places the cursor at (`line`, `column`), clamped to valid bounds.
    pub fn set_cursor_line_column(&mut self, line: usize, column: usize) {
        self.cursor = self.position_to_offset(Position::new(line, column));
    }

    /// Moves the cursor left by one byte.
    ///
    /// If at the beginning of the buffer, does nothing.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right by one byte.
    ///
    /// If at the end of the buffer, does nothing.
    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor up by one line.
    ///
    /// The column is clamped to the length of the target line.
    /// If at the first line, does nothing.
    pub fn move_up(&mut self) {
        let pos = self.cursor_position();
        if pos.line > 0 {
            self.set_cursor_line_column(pos.line - 1, pos.column);
        }
    }

    /// Moves the cursor down by one line.
    ///
    /// The column is clamped to the length of the target line.
    /// If at the last line, does nothing.
    pub fn move_down(&mut self) {
        let pos = self.cursor_position();
        if pos.line + 1 < self.line_count() {
            self.set_cursor_line_column(pos.line + 1, pos.column);
        }
    }

    pub fn move_to_line_start(&mut self) {
        let line = self.cursor_position().line;
        self.set_cursor_line_column(line, 0);
    }

    pub fn move_to_line_end(&mut self) {
        let line = self.cursor_position().line;
        self.set_cursor_line_column(line, self.line_len(line));
    }

    pub fn move_to_buffer_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_buffer_end(&mut self) {
        self.cursor = self.len();
    }

    /// Moves the cursor to the start of the previous word.
    ///
    /// Skips separators to the left of the cursor, then the word before them.
    pub fn move_word_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = |i: usize| self.bytes[i];
        let mut pos = self.cursor - 1;
        while pos > 0 && is_word_separator(at(pos)) {
            pos -= 1;
        }
        while pos > 0 && !is_word_separator(at(pos - 1)) {
            pos -= 1;
        }
        self.cursor = pos;
    }

    /// Moves the cursor past the current word and the separators after it.
    pub fn move_word_right(&mut self) {
        let len = self.len();
        let at = |i: usize| self.bytes[i];
        let mut pos = self.cursor;
        while pos < len && !is_word_separator(at(pos)) {
            pos += 1;
        }
        while pos < len && is_word_separator(at(pos)) {
            pos += 1;
        }
        self.cursor = pos;
    }

    // ==================== Mutations ====================

    /// Inserts `text` at the cursor and moves the cursor past it.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.insert_text_at(self.cursor, text)
    }

    /// Inserts `text` at `pos`.
    ///
    /// A cursor at or after `pos` shifts right by the inserted length.
    pub fn insert_text_at(&mut self, pos: usize, text: &str) -> Result<()> {
        self.insert_bytes_at(pos, text.as_bytes())
    }

    pub fn insert_bytes_at(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        if pos > self.len() {
            return Err(BufferError::out_of_range(pos, self.len()));
        }
        if bytes.is_empty() {
            return Ok(());
        }
        self.bytes.insert_slice(pos, bytes)?;
        if pos <= self.cursor {
            self.cursor += bytes.len();
        }
        self.invalidate_lines();
        Ok(())
    }

    /// Deletes up to `count` bytes starting at `pos` and returns how many
    /// were removed.
    ///
    /// The count is clamped to the end of the buffer; a `pos` at or past the
    /// end deletes nothing. A cursor inside the deleted range moves to `pos`,
    /// one after it moves left by the deleted length.
    pub fn delete_text(&mut self, pos: usize, count: usize) -> usize {
        let len = self.len();
        if pos >= len || count == 0 {
            return 0;
        }
        let count = count.min(len - pos);
        // The range was clamped above, so erase cannot fail.
        if self.bytes.erase(pos, count).is_err() {
            return 0;
        }
        if pos < self.cursor {
            self.cursor = if self.cursor >= pos + count {
                self.cursor - count
            } else {
                pos
            };
        }
        self.invalidate_lines();
        count
    }

    /// Replaces `count` bytes at `pos` with `replacement`.
    pub fn replace(&mut self, pos: usize, count: usize, replacement: &str) -> Result<()> {
        if pos > self.len() {
            return Err(BufferError::out_of_range(pos, self.len()));
        }
        self.delete_text(pos, count);
        self.insert_text_at(pos, replacement)
    }

    /// Removes all content and resets the cursor.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = 0;
        self.invalidate_lines();
    }

    /// Replaces the whole content, keeping the cursor where it fits.
    pub fn set_content(&mut self, content: &str) -> Result<()> {
        self.rewrite(content.as_bytes())
    }

    /// Replaces the whole content with `content`.
    ///
    /// Either the new content is fully in place or the buffer is unchanged.
    /// The cursor is clamped to the new length.
    pub(crate) fn rewrite(&mut self, content: &[u8]) -> Result<()> {
        if content.len() > self.bytes.capacity() {
            let mut fresh = GapBuffer::with_policy(self.bytes.policy());
            fresh.insert_slice(0, content)?;
            self.bytes = fresh;
        } else {
            self.bytes.assign(content.iter().copied())?;
        }
        self.cursor = self.cursor.min(self.len());
        self.invalidate_lines();
        Ok(())
    }

    // ==================== Encoding ====================

    /// Whether the content is well-formed UTF-8.
    pub fn is_valid_encoding(&self) -> bool {
        encoding::is_valid_utf8(self.bytes.iter().copied())
    }

    /// Classifies the content's line terminators.
    pub fn detect_line_ending(&self) -> LineEnding {
        encoding::detect_line_ending(self.bytes.iter().copied())
    }

    /// Rewrites every line terminator to `target` and returns how many
    /// terminators were found.
    pub fn convert_line_endings(&mut self, target: LineEnding) -> Result<usize> {
        let (converted, terminators) =
            encoding::convert_line_endings(self.bytes.iter().copied(), target);
        self.rewrite(&converted)?;
        tracing::debug!(%target, terminators, "converted line endings");
        Ok(terminators)
    }

    // ==================== Persistence ====================

    /// Replaces the content with everything `reader` yields.
    ///
    /// The cursor moves to the start. If reading fails the buffer is left
    /// untouched. Returns the number of bytes loaded.
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        let mut content = Vec::new();
        if let Err(err) = reader.read_to_end(&mut content) {
            tracing::warn!(error = %err, "failed to read buffer content");
            return Err(err.into());
        }
        self.rewrite(&content)?;
        self.cursor = 0;
        tracing::debug!(bytes = content.len(), "loaded buffer content");
        Ok(content.len())
    }

    /// Writes the content to `writer` in logical order.
    ///
    /// Bytes already written when a failure occurs stay written.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<usize> {
        let (front, back) = self.as_slices();
        if let Err(err) = write_slices(&mut writer, front, back) {
            tracing::warn!(error = %err, "failed to write buffer content");
            return Err(err.into());
        }
        tracing::debug!(bytes = self.len(), "saved buffer content");
        Ok(self.len())
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "failed to open file");
            err
        })?;
        self.load(file)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| {
            tracing::warn!(path = %path.display(), error = %err, "failed to create file");
            err
        })?;
        self.save(file)
    }

    // ==================== Diagnostics ====================

    pub fn stats(&self) -> BufferStats {
        let line_cache_valid = self.is_line_cache_valid();
        let capacity = self.capacity();
        let gap_size = self.bytes.gap_len();
        BufferStats {
            total_size: self.len(),
            gap_size,
            capacity,
            gap_ratio: if capacity == 0 {
                0.0
            } else {
                gap_size as f64 / capacity as f64
            },
            line_count: self.line_count(),
            line_cache_valid,
        }
    }

    /// Emits a summary of the buffer state as `debug` events.
    pub fn log_debug_info(&self) {
        let stats = self.stats();
        let cursor = self.cursor_position();
        tracing::debug!(
            %stats,
            cursor = cursor.absolute,
            line = cursor.line,
            column = cursor.column,
            line_ending = %self.detect_line_ending(),
            valid_utf8 = self.is_valid_encoding(),
            "text buffer state"
        );
        for line in 0..stats.line_count.min(DEBUG_PREVIEW_LINES) {
            tracing::debug!(line, content = %self.line_content(line), "text buffer line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_str(text).unwrap()
    }

    // ==================== Basic Tests ====================

    #[test]
    fn test_new_empty() {
        let buf = TextBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.cursor_position(), CursorPosition::new(0, 0, 0));
    }

    #[test]
    fn test_from_str() {
        let buf = buffer("hello\nworld");
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_content(0), "hello");
        assert_eq!(buf.line_content(1), "world");
    }

    #[test]
    fn test_line_content_empty_buffer() {
        let buf = TextBuffer::new();
        assert_eq!(buf.line_content(0), "");
    }

    #[test]
    fn test_line_content_out_of_bounds() {
        let buf = buffer("hello");
        assert_eq!(buf.line_content(99), "");
        assert_eq!(buf.line_len(99), 0);
        assert_eq!(buf.line_start(99), None);
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let buf = buffer("a\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_content(1), "");
    }

    #[test]
    fn test_crlf_line_keeps_carriage_return() {
        let buf = buffer("one\r\ntwo");
        assert_eq!(buf.line_bytes(0), b"one\r");
        assert_eq!(buf.line_len(0), 4);
    }

    #[test]
    fn test_selection() {
        let buf = buffer("hello world");
        assert_eq!(buf.selection(6, 11), "world");
        assert_eq!(buf.selection(3, 3), "");
        assert_eq!(buf.selection(5, 2), "");
        assert_eq!(buf.selection(0, 12), "");
    }

    // ==================== Line Cache Tests ====================

    #[test]
    fn test_cache_is_lazy() {
        let mut buf = buffer("a\nb");
        assert!(!buf.is_line_cache_valid());
        assert_eq!(buf.line_count(), 2);
        assert!(buf.is_line_cache_valid());

        buf.insert_text_at(1, "\nc").unwrap();
        assert!(!buf.is_line_cache_valid());
        assert_eq!(buf.line_count(), 3);
        assert!(buf.is_line_cache_valid());
    }

    #[test]
    fn test_position_offset_round_trip() {
        let buf = buffer("ab\n\ncde\nf");
        for offset in 0..=buf.len() {
            let pos = buf.offset_to_position(offset);
            assert_eq!(buf.position_to_offset(pos), offset, "offset {offset}");
        }
    }

    #[test]
    fn test_position_to_offset_clamps() {
        let buf = buffer("ab\ncde");
        assert_eq!(buf.position_to_offset(Position::new(0, 10)), 2);
        assert_eq!(buf.position_to_offset(Position::new(9, 1)), 4);
        assert_eq!(buf.position_to_offset(Position::new(9, 99)), 6);
    }

    // ==================== Cursor Tests ====================

    #[test]
    fn test_cursor_position_after_newline() {
        let mut buf = buffer("line1\nline2\nline3");
        buf.set_cursor(6);
        assert_eq!(buf.cursor_position(), CursorPosition::new(1, 0, 6));
        buf.set_cursor(5);
        assert_eq!(buf.cursor_position(), CursorPosition::new(0, 5, 5));
    }

    #[test]
    fn test_set_cursor_clamps_to_len() {
        let mut buf = buffer("abc");
        buf.set_cursor(10);
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_set_cursor_line_column_clamps_column() {
        let mut buf = buffer("hello\nhi\nworld");
        buf.set_cursor_line_column(1, 10);
        assert_eq!(buf.cursor_position(), CursorPosition::new(1, 2, 8));
    }

    #[test]
    fn test_set_cursor_line_column_clamps_line() {
        let mut buf = buffer("hello\nworld");
        buf.set_cursor_line_column(7, 2);
        assert_eq!(buf.cursor_position(), CursorPosition::new(1, 2, 8));
    }

    #[test]
    fn test_move_left_at_buffer_start() {
        let mut buf = buffer("hello");
        buf.move_left();
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_move_left_crosses_lines() {
        let mut buf = buffer("hello\nworld");
        buf.set_cursor(6);
        buf.move_left();
        assert_eq!(buf.cursor_position().to_position(), Position::new(0, 5));
    }

    #[test]
    fn test_move_right_at_buffer_end() {
        let mut buf = buffer("hello");
        buf.move_to_buffer_end();
        buf.move_right();
        assert_eq!(buf.cursor(), 5);
    }

    #[test]
    fn test_move_up_clamps_column() {
        let mut buf = buffer("hi\nhello");
        buf.set_cursor_line_column(1, 4);
        buf.move_up();
        assert_eq!(buf.cursor_position().to_position(), Position::new(0, 2));
    }

    #[test]
    fn test_move_up_on_first_line() {
        let mut buf = buffer("hello\nworld");
        buf.set_cursor(3);
        buf.move_up();
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_move_down_clamps_column() {
        let mut buf = buffer("hello\nhi");
        buf.set_cursor(4);
        buf.move_down();
        assert_eq!(buf.cursor_position().to_position(), Position::new(1, 2));
    }

    #[test]
    fn test_move_down_on_last_line() {
        let mut buf = buffer("hello\nworld");
        buf.set_cursor(8);
        buf.move_down();
        assert_eq!(buf.cursor(), 8);
    }

    #[test]
    fn test_move_to_line_start_and_end() {
        let mut buf = buffer("hello\nworld\n!");
        buf.set_cursor(8);
        buf.move_to_line_start();
        assert_eq!(buf.cursor(), 6);
        buf.move_to_line_end();
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_move_to_buffer_start_and_end() {
        let mut buf = buffer("hello\nworld");
        buf.move_to_buffer_end();
        assert_eq!(buf.cursor(), 11);
        buf.move_to_buffer_start();
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_move_word_right() {
        let mut buf = buffer("foo  bar\tbaz");
        buf.move_word_right();
        assert_eq!(buf.cursor(), 5);
        buf.move_word_right();
        assert_eq!(buf.cursor(), 9);
        buf.move_word_right();
        assert_eq!(buf.cursor(), 12);
        buf.move_word_right();
        assert_eq!(buf.cursor(), 12);
    }

    #[test]
    fn test_move_word_left() {
        let mut buf = buffer("foo  bar\x0Bbaz");
        buf.move_to_buffer_end();
        buf.move_word_left();
        assert_eq!(buf.cursor(), 9);
        buf.move_word_left();
        assert_eq!(buf.cursor(), 5);
        buf.move_word_left();
        assert_eq!(buf.cursor(), 0);
        buf.move_word_left();
        assert_eq!(buf.cursor(), 0);
    }

    // ==================== Insert Tests ====================

    #[test]
    fn test_insert_text_at_cursor() {
        let mut buf = TextBuffer::new();
        buf.insert_text("Hello").unwrap();
        assert_eq!(buf.cursor(), 5);
        buf.insert_text(", world").unwrap();
        assert_eq!(buf.content(), "Hello, world");
        assert_eq!(buf.cursor(), 12);
    }

    #[test]
    fn test_insert_before_cursor_shifts_it() {
        let mut buf = buffer("Hello");
        buf.set_cursor(2);
        buf.insert_text_at(0, "W").unwrap();
        assert_eq!(buf.content(), "WHello");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_insert_after_cursor_keeps_it() {
        let mut buf = buffer("Hello");
        buf.set_cursor(2);
        buf.insert_text_at(4, "XY").unwrap();
        assert_eq!(buf.content(), "HellXYo");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_insert_past_end_is_out_of_range() {
        let mut buf = buffer("abc");
        let err = buf.insert_text_at(4, "x").unwrap_err();
        assert!(matches!(err, BufferError::OutOfRange { index: 4, len: 3 }));
        assert_eq!(buf.content(), "abc");
    }

    #[test]
    fn test_insert_empty_is_noop() {
        let mut buf = buffer("abc");
        buf.line_count();
        buf.insert_text_at(1, "").unwrap();
        assert!(buf.is_line_cache_valid());
    }

    // ==================== Delete Tests ====================

    #[test]
    fn test_delete_before_cursor_pulls_it_back() {
        let mut buf = buffer("abcdef");
        buf.set_cursor(5);
        assert_eq!(buf.delete_text(1, 2), 2);
        assert_eq!(buf.content(), "adef");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_delete_around_cursor_clamps_to_start() {
        let mut buf = buffer("abcdef");
        buf.set_cursor(3);
        buf.delete_text(1, 4);
        assert_eq!(buf.content(), "af");
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_delete_clamps_count() {
        let mut buf = buffer("abcdef");
        assert_eq!(buf.delete_text(4, 100), 2);
        assert_eq!(buf.content(), "abcd");
    }

    #[test]
    fn test_delete_past_end_is_noop() {
        let mut buf = buffer("abc");
        assert_eq!(buf.delete_text(3, 1), 0);
        assert_eq!(buf.delete_text(0, 0), 0);
        assert_eq!(buf.content(), "abc");
    }

    #[test]
    fn test_replace() {
        let mut buf = buffer("hello world");
        buf.replace(6, 5, "there").unwrap();
        assert_eq!(buf.content(), "hello there");
        assert!(buf.replace(20, 1, "x").is_err());
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut buf = buffer("abc\ndef");
        buf.move_to_buffer_end();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn test_set_content_clamps_cursor() {
        let mut buf = buffer("a long line of text");
        buf.move_to_buffer_end();
        buf.set_content("short").unwrap();
        assert_eq!(buf.content(), "short");
        assert_eq!(buf.cursor(), 5);
    }

    #[test]
    fn test_set_content_larger_than_capacity() {
        let mut buf = buffer("tiny");
        let big = "x".repeat(1000);
        buf.set_content(&big).unwrap();
        assert_eq!(buf.len(), 1000);
        assert!(buf.capacity() >= 1000);
    }

    // ==================== Encoding Tests ====================

    #[test]
    fn test_invalid_bytes_are_lossy_in_content() {
        let buf = TextBuffer::from_bytes(&[b'a', 0xC0, 0x80, b'b']).unwrap();
        assert!(!buf.is_valid_encoding());
        assert_eq!(buf.to_bytes(), vec![b'a', 0xC0, 0x80, b'b']);
        assert!(buf.content().contains('\u{FFFD}'));
    }

    #[test]
    fn test_convert_line_endings() {
        let mut buf = buffer("a\r\nb\rc\nd");
        buf.move_to_buffer_end();
        let count = buf.convert_line_endings(LineEnding::Lf).unwrap();
        assert_eq!(count, 3);
        assert_eq!(buf.content(), "a\nb\nc\nd");
        assert_eq!(buf.cursor(), buf.len());
        assert_eq!(buf.line_count(), 4);
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_load_replaces_content_and_resets_cursor() {
        let mut buf = buffer("old");
        buf.move_to_buffer_end();
        let loaded = buf.load(&b"new\ncontent"[..]).unwrap();
        assert_eq!(loaded, 11);
        assert_eq!(buf.content(), "new\ncontent");
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.line_count(), 2);
    }

    #[test]
    fn test_failed_load_keeps_content() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }

        let mut buf = buffer("keep me");
        buf.set_cursor(4);
        assert!(matches!(buf.load(Broken), Err(BufferError::Io(_))));
        assert_eq!(buf.content(), "keep me");
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn test_save_writes_logical_order() {
        let mut buf = buffer("hello world");
        buf.insert_text_at(5, ",").unwrap();
        let mut out = Vec::new();
        assert_eq!(buf.save(&mut out).unwrap(), 12);
        assert_eq!(out, b"hello, world");
    }

    // ==================== Diagnostics Tests ====================

    #[test]
    fn test_stats() {
        let buf = buffer("ab\ncd");
        let stats = buf.stats();
        assert_eq!(stats.total_size, 5);
        assert_eq!(stats.capacity, buf.capacity());
        assert_eq!(stats.gap_size, buf.capacity() - 5);
        assert_eq!(stats.line_count, 2);
        assert!(!stats.line_cache_valid);
        assert!(buf.stats().line_cache_valid);
    }

    #[test]
    fn test_stats_of_unallocated_buffer() {
        let stats = TextBuffer::new().stats();
        assert_eq!(stats.capacity, 0);
        assert_eq!(stats.gap_ratio, 0.0);
    }
}
