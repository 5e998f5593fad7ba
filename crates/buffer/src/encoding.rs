// Chunk: docs/chunks/encoding_line_endings - UTF-8 validation and line-ending normalization

//! Byte-level encoding checks and line-ending handling.
//!
//! Everything here works on a byte iterator so the text buffer can feed its
//! two gap zones straight in without linearizing them first.

use std::fmt;

/// A line terminator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n` (Unix, Linux, macOS)
    Lf,
    /// `\r\n` (Windows)
    CrLf,
    /// `\r` (classic Mac OS)
    Cr,
}

impl LineEnding {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
            LineEnding::Cr => b"\r",
        }
    }

    /// The convention of the platform this crate was compiled for.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineEnding::Lf => "LF (Unix)",
            LineEnding::CrLf => "CRLF (Windows)",
            LineEnding::Cr => "CR (Classic Mac)",
        })
    }
}

// ==================== UTF-8 ====================

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Sequence length announced by a leading byte, or 0 if it cannot lead.
fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        _ if lead & 0xE0 == 0xC0 => 2,
        _ if lead & 0xF0 == 0xE0 => 3,
        _ if lead & 0xF8 == 0xF0 => 4,
        _ => 0,
    }
}

/// Smallest codepoint each sequence length may encode.
const MIN_CODEPOINT: [u32; 5] = [0, 0, 0x80, 0x800, 0x1_0000];
/// Payload bits of the leading byte for each sequence length.
const LEAD_MASK: [u8; 5] = [0, 0x7F, 0x1F, 0x0F, 0x07];

const SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;
const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// Checks that `bytes` is well-formed UTF-8.
///
/// Rejects invalid leading bytes, missing or untagged continuation bytes,
/// sequences cut off by the end of input, overlong encodings, surrogate
/// codepoints and codepoints beyond U+10FFFF. One violation anywhere makes
/// the whole input invalid.
pub fn is_valid_utf8<I>(bytes: I) -> bool
where
    I: IntoIterator<Item = u8>,
{
    let mut bytes = bytes.into_iter();
    while let Some(lead) = bytes.next() {
        let len = sequence_len(lead);
        match len {
            0 => return false,
            1 => continue,
            _ => {}
        }

        let mut codepoint = u32::from(lead & LEAD_MASK[len]);
        for _ in 1..len {
            match bytes.next() {
                Some(byte) if is_continuation(byte) => {
                    codepoint = (codepoint << 6) | u32::from(byte & 0x3F);
                }
                _ => return false,
            }
        }

        if codepoint < MIN_CODEPOINT[len] {
            return false; // overlong
        }
        if len == 3 && SURROGATES.contains(&codepoint) {
            return false;
        }
        if codepoint > MAX_CODEPOINT {
            return false;
        }
    }
    true
}

// ==================== Line endings ====================

/// Classifies the line terminators in `bytes`.
///
/// CRLF wins if any `\r\n` pair occurs, then LF for a lone `\n`, then CR for
/// a lone `\r`, regardless of how often each appears. Input without any
/// terminator yields [`LineEnding::platform_default`].
pub fn detect_line_ending<I>(bytes: I) -> LineEnding
where
    I: IntoIterator<Item = u8>,
{
    let (mut has_crlf, mut has_lf, mut has_cr) = (false, false, false);
    let mut pending_cr = false;

    for byte in bytes {
        match byte {
            b'\n' if pending_cr => has_crlf = true,
            b'\n' => has_lf = true,
            _ if pending_cr => has_cr = true,
            _ => {}
        }
        pending_cr = byte == b'\r';
    }
    if pending_cr {
        has_cr = true;
    }

    if has_crlf {
        LineEnding::CrLf
    } else if has_lf {
        LineEnding::Lf
    } else if has_cr {
        LineEnding::Cr
    } else {
        LineEnding::platform_default()
    }
}

/// Rewrites every terminator in `bytes` to `target`.
///
/// `\r\n` counts as one terminator. Returns the new content and the number of
/// terminators rewritten.
pub fn convert_line_endings<I>(bytes: I, target: LineEnding) -> (Vec<u8>, usize)
where
    I: IntoIterator<Item = u8>,
{
    let bytes = bytes.into_iter();
    let ending = target.as_bytes();
    let mut out = Vec::with_capacity(bytes.size_hint().0);
    let mut terminators = 0;
    let mut pending_cr = false;

    for byte in bytes {
        if pending_cr {
            pending_cr = false;
            if byte == b'\n' {
                // Second half of a CRLF pair, already emitted.
                continue;
            }
        }
        match byte {
            b'\r' => {
                out.extend_from_slice(ending);
                terminators += 1;
                pending_cr = true;
            }
            b'\n' => {
                out.extend_from_slice(ending);
                terminators += 1;
            }
            _ => out.push(byte),
        }
    }
    (out, terminators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn valid(bytes: &[u8]) -> bool {
        is_valid_utf8(bytes.iter().copied())
    }

    #[test_case(b"" ; "empty")]
    #[test_case(b"plain ascii" ; "ascii")]
    #[test_case("héllo".as_bytes() ; "two byte")]
    #[test_case("日本語".as_bytes() ; "three byte")]
    #[test_case("🦀".as_bytes() ; "four byte")]
    #[test_case(&[0xEF, 0xBF, 0xBF] ; "last bmp codepoint")]
    #[test_case(&[0xF4, 0x8F, 0xBF, 0xBF] ; "max codepoint")]
    fn test_accepts_well_formed(bytes: &[u8]) {
        assert!(valid(bytes));
        assert!(std::str::from_utf8(bytes).is_ok());
    }

    #[test_case(&[0xC0, 0x80] ; "overlong nul")]
    #[test_case(&[0xE0, 0x80, 0xAF] ; "overlong three byte")]
    #[test_case(&[0xF0, 0x80, 0x80, 0xAF] ; "overlong four byte")]
    #[test_case(&[0xED, 0xA0, 0x80] ; "high surrogate")]
    #[test_case(&[0xED, 0xBF, 0xBF] ; "low surrogate")]
    #[test_case(&[0xF4, 0x90, 0x80, 0x80] ; "beyond unicode")]
    #[test_case(&[0xF8, 0x88, 0x80, 0x80, 0x80] ; "five byte lead")]
    #[test_case(&[0x80] ; "lone continuation")]
    #[test_case(&[0xFF] ; "invalid lead")]
    #[test_case(&[b'a', 0xE6, 0x97] ; "truncated at end")]
    #[test_case(&[0xC3, b'a'] ; "untagged continuation")]
    fn test_rejects_malformed(bytes: &[u8]) {
        assert!(!valid(bytes));
        assert!(std::str::from_utf8(bytes).is_err());
    }

    #[test]
    fn test_single_violation_invalidates_everything() {
        let mut bytes = "valid text ".repeat(100).into_bytes();
        bytes.push(0xC0);
        bytes.extend_from_slice(b" more valid text");
        assert!(!valid(&bytes));
    }

    #[test_case(b"a\r\nb\nc\rd", LineEnding::CrLf ; "crlf beats others")]
    #[test_case(b"a\nb\rc\rd", LineEnding::Lf ; "lf beats cr")]
    #[test_case(b"a\rb", LineEnding::Cr ; "cr only")]
    #[test_case(b"trailing\r", LineEnding::Cr ; "trailing cr")]
    #[test_case(b"\r\r\n", LineEnding::CrLf ; "cr then crlf")]
    fn test_detects_line_ending(bytes: &[u8], expected: LineEnding) {
        assert_eq!(detect_line_ending(bytes.iter().copied()), expected);
    }

    #[test]
    fn test_detect_without_terminators_uses_platform_default() {
        assert_eq!(
            detect_line_ending(b"no newline".iter().copied()),
            LineEnding::platform_default()
        );
    }

    #[test_case(LineEnding::Lf, b"a\nb\nc\nd" ; "to lf")]
    #[test_case(LineEnding::CrLf, b"a\r\nb\r\nc\r\nd" ; "to crlf")]
    #[test_case(LineEnding::Cr, b"a\rb\rc\rd" ; "to cr")]
    fn test_converts_mixed(target: LineEnding, expected: &[u8]) {
        let (out, count) = convert_line_endings(b"a\r\nb\nc\rd".iter().copied(), target);
        assert_eq!(out, expected);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_convert_keeps_consecutive_terminators_apart() {
        let (out, count) = convert_line_endings(b"\r\r\n\n".iter().copied(), LineEnding::Lf);
        assert_eq!(out, b"\n\n\n");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_convert_is_idempotent() {
        for target in [LineEnding::Lf, LineEnding::CrLf, LineEnding::Cr] {
            let (once, _) = convert_line_endings(b"x\r\ny\rz\n".iter().copied(), target);
            let (twice, _) = convert_line_endings(once.iter().copied(), target);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(LineEnding::CrLf.to_string(), "CRLF (Windows)");
    }
}
