// Chunk: docs/chunks/search_replace - Literal and pattern search over the text buffer

//! Search and replace on [`TextBuffer`].
//!
//! Every search works on a linear view of the content, which costs a copy
//! when the gap sits in the middle of the buffer. Positions and lengths are
//! byte offsets.
//!
//! Patterns use the [`regex`] crate syntax and run over raw bytes, so content
//! that is not valid UTF-8 can still be searched. A pattern that fails to
//! compile is logged and treated as matching nothing.

use std::ops::Range;

use regex::bytes::Regex;

use crate::error::Result;
use crate::text_buffer::TextBuffer;

/// The location of a match.
///
/// When `found` is false, `position` and `length` carry no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindResult {
    pub position: usize,
    pub length: usize,
    pub found: bool,
}

impl FindResult {
    pub const NOT_FOUND: FindResult = FindResult {
        position: 0,
        length: 0,
        found: false,
    };

    /// A match of `length` bytes at `position`.
    pub fn at(position: usize, length: usize) -> Self {
        Self {
            position,
            length,
            found: true,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    /// The matched byte range, if there is a match.
    pub fn range(&self) -> Option<Range<usize>> {
        self.found.then(|| self.position..self.position + self.length)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

/// Compiles `pattern`, logging and discarding the error on failure.
fn pattern_or_log(pattern: &str) -> Option<Regex> {
    match compile_pattern(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "ignoring invalid search pattern");
            None
        }
    }
}

/// Last start offset `<= limit` at which `needle` occurs in `haystack`.
fn rfind_at_or_before(haystack: &[u8], needle: &[u8], limit: usize) -> Option<usize> {
    let last_start = haystack.len().checked_sub(needle.len())?.min(limit);
    (0..=last_start)
        .rev()
        .find(|&start| haystack[start..].starts_with(needle))
}

impl TextBuffer {
    /// Finds the first occurrence of `needle` starting at or after `from`.
    ///
    /// Not found if `needle` is empty or `from` is not inside the buffer.
    pub fn find(&self, needle: &str, from: usize) -> FindResult {
        let needle = needle.as_bytes();
        if needle.is_empty() || from >= self.len() {
            return FindResult::NOT_FOUND;
        }
        let text = self.linear();
        text[from..]
            .windows(needle.len())
            .position(|window| window == needle)
            .map_or(FindResult::NOT_FOUND, |offset| {
                FindResult::at(from + offset, needle.len())
            })
    }

    /// Finds the last occurrence of `needle` that starts at or before `from`.
    ///
    /// A `from` past the end searches from the last byte.
    pub fn find_reverse(&self, needle: &str, from: usize) -> FindResult {
        let needle = needle.as_bytes();
        if needle.is_empty() || self.is_empty() {
            return FindResult::NOT_FOUND;
        }
        let limit = from.min(self.len() - 1);
        let text = self.linear();
        rfind_at_or_before(&text, needle, limit).map_or(FindResult::NOT_FOUND, |position| {
            FindResult::at(position, needle.len())
        })
    }

    /// Finds the first match of `pattern` in the content from `from` onward.
    ///
    /// The pattern sees the content starting at `from`, so `^` anchors there.
    /// Not found for an empty or invalid pattern, or when `from` is not
    /// inside the buffer.
    pub fn find_pattern(&self, pattern: &str, from: usize) -> FindResult {
        if pattern.is_empty() || from >= self.len() {
            return FindResult::NOT_FOUND;
        }
        let Some(regex) = pattern_or_log(pattern) else {
            return FindResult::NOT_FOUND;
        };
        let text = self.linear();
        regex
            .find(&text[from..])
            .map_or(FindResult::NOT_FOUND, |m| {
                FindResult::at(from + m.start(), m.len())
            })
    }

    /// Finds the last match of `pattern` in the content before `from`.
    ///
    /// `regex` has no reverse search, so this rescans forward from the start,
    /// restarting one byte past every match and keeping the last one. Each
    /// restart still sees the bytes before it, so `\b` and `^` behave as in
    /// a single scan. That makes it O(n·m) in the worst case, far slower
    /// than [`find_pattern`](Self::find_pattern).
    pub fn find_pattern_reverse(&self, pattern: &str, from: usize) -> FindResult {
        if pattern.is_empty() {
            return FindResult::NOT_FOUND;
        }
        let Some(regex) = pattern_or_log(pattern) else {
            return FindResult::NOT_FOUND;
        };
        let text = self.linear();
        let haystack = &text[..from.min(text.len())];

        let mut last = FindResult::NOT_FOUND;
        let mut start = 0;
        while start < haystack.len() {
            let Some(m) = regex.find_at(haystack, start) else {
                break;
            };
            last = FindResult::at(m.start(), m.len());
            start = last.position + 1;
        }
        last
    }

    /// Replaces every occurrence of `needle` with `replacement`, left to
    /// right, and returns how many were replaced.
    ///
    /// Searching resumes after the inserted replacement, so a replacement
    /// that contains `needle` is not rescanned. With an empty replacement it
    /// resumes one byte past the match, so an occurrence that slides into
    /// the match position is kept.
    pub fn replace_all(&mut self, needle: &str, replacement: &str) -> Result<usize> {
        if needle.is_empty() {
            return Ok(0);
        }
        let mut count = 0;
        let mut from = 0;
        loop {
            let hit = self.find(needle, from);
            if !hit.found {
                break;
            }
            self.replace(hit.position, hit.length, replacement)?;
            count += 1;
            from = hit.position + replacement.len();
            // An empty replacement still steps past the match position.
            if replacement.is_empty() {
                from += 1;
            }
            if from >= self.len() {
                break;
            }
        }
        Ok(count)
    }

    /// Replaces every non-overlapping match of `pattern` in one pass.
    ///
    /// `replacement` may refer to capture groups as `$1` or `${name}`. The
    /// buffer is rewritten only if the result differs from the current
    /// content. Returns the number of matches in the original content, or 0
    /// when nothing changed or the pattern is invalid.
    pub fn replace_all_pattern(&mut self, pattern: &str, replacement: &str) -> Result<usize> {
        if pattern.is_empty() {
            return Ok(0);
        }
        let Some(regex) = pattern_or_log(pattern) else {
            return Ok(0);
        };

        let (replaced, count) = {
            let text = self.linear();
            let replaced = regex.replace_all(&text, replacement.as_bytes());
            if replaced.as_ref() == text.as_ref() {
                return Ok(0);
            }
            let count = regex.find_iter(&text).count();
            (replaced.into_owned(), count)
        };

        self.rewrite(&replaced)?;
        tracing::debug!(pattern, count, "replaced pattern matches");
        Ok(count)
    }
}
