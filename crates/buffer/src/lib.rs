// Chunk: docs/chunks/gap_container - Generic gap container foundation
// Chunk: docs/chunks/text_buffer - Text buffer layered on the byte gap container

//! gaptext-buffer: a gap buffer container and a text buffer built on it.
//!
//! # Overview
//!
//! [`GapBuffer`] is a generic sequence with one movable gap of free slots.
//! Editing at the gap is O(1); moving the gap costs only the elements between
//! its old and new position. Memory comes from a pluggable
//! [`AllocStrategy`], and growth is all-or-nothing: if allocating or filling
//! the new block fails, the buffer is left as it was.
//!
//! [`GapCursor`] addresses logical positions in a [`GapBuffer`] without
//! borrowing it.
//!
//! [`TextBuffer`] specializes the container to bytes and adds:
//! - A cursor offset with character, word and line motions
//! - Line/column addressing through a lazily rebuilt line index
//! - Literal and regular-expression search and replace
//! - UTF-8 validation and line-ending detection/conversion
//! - Loading from readers and saving to writers
//!
//! # Example
//!
//! ```
//! use gaptext_buffer::{LineEnding, TextBuffer};
//!
//! let mut buffer = TextBuffer::from_str("foo bar\r\nfoo").unwrap();
//! assert_eq!(buffer.line_count(), 2);
//! assert_eq!(buffer.detect_line_ending(), LineEnding::CrLf);
//!
//! assert_eq!(buffer.replace_all("foo", "baz").unwrap(), 2);
//! buffer.convert_line_endings(LineEnding::Lf).unwrap();
//! assert_eq!(buffer.content(), "baz bar\nbaz");
//!
//! buffer.set_cursor_line_column(1, 1);
//! buffer.insert_text("!").unwrap();
//! assert_eq!(buffer.line_content(1), "b!az");
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (gap growth at `trace`, persistence and
//! bulk rewrites at `debug`, I/O failures at `warn`) and leaves installing a
//! subscriber to the application.

mod alloc_strategy;
mod block;
mod encoding;
mod error;
mod gap_buffer;
mod gap_cursor;
mod line_index;
mod search;
mod text_buffer;
mod types;

pub use alloc_strategy::{AllocStrategy, Global};
pub use encoding::{convert_line_endings, detect_line_ending, is_valid_utf8, LineEnding};
pub use error::{BufferError, Result};
pub use gap_buffer::{GapBuffer, Iter, IterMut};
pub use gap_cursor::{GapCursor, GapGeometry};
pub use line_index::LineIndex;
pub use search::FindResult;
pub use text_buffer::TextBuffer;
pub use types::{BufferStats, CursorPosition, GrowthPolicy, Position};
