//! Source buffer and offset ↔ line/column mapping.
//!
//! The [`Scanner`] is a resizable character window over any [`Read`] source. It decodes UTF-8 incrementally,
//! tracks the absolute byte offset of the next character and records the offset of every line start it moves
//! past, so a [`LineOffsetTable`] is available for the text scanned so far without a second pass.
//!
//! ## Notes
//! - Offsets are **byte** offsets into the original input (plus the configured start index). Columns are
//!   1-based byte columns.
//! - Invalid UTF-8 decodes to `U+FFFD` but keeps its original byte length, so spans stay aligned with the input.
//! - Read errors other than `Interrupted` end the stream; the error is kept and can be taken afterwards.

use std::io::{self, Read};

/// Default number of bytes pulled from the reader per fill.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// A position in the input: absolute byte index plus 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub index: usize,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const START: SourceLocation = SourceLocation {
        index: 0,
        line: 1,
        column: 1,
    };

    pub fn new(index: usize, line: u32, column: u32) -> Self {
        Self { index, line, column }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::START
    }
}

/// Sorted line-start offsets with binary-search lookup.
///
/// ## Examples
/// ```rust
/// use bdl_syntax::source::LineOffsetTable;
///
/// let table = LineOffsetTable::from_source("MAIN\n  CALL f()\nEND MAIN\n");
/// assert_eq!(table.location_of(7), (2, 3));
/// assert_eq!(table.offset_of(2, 3), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsetTable {
    first_line: u32,
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    /// Table whose first line is `first_line` and starts at byte `first_line_start`.
    pub fn new(first_line: u32, first_line_start: usize) -> Self {
        Self {
            first_line: first_line.max(1),
            line_starts: vec![first_line_start],
        }
    }

    /// Table for a complete in-memory source starting at line 1, offset 0.
    pub fn from_source(source: &str) -> Self {
        let mut table = Self::new(1, 0);
        for (index, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                table.push_line_start(index + 1);
            }
        }
        table
    }

    /// Record the start of a new line. Offsets must be pushed in ascending order.
    pub fn push_line_start(&mut self, offset: usize) {
        if self.line_starts.last().is_none_or(|&last| offset > last) {
            self.line_starts.push(offset);
        }
    }

    /// Number of lines seen so far.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn first_line(&self) -> u32 {
        self.first_line
    }

    /// Byte offset at which `line` starts.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let index = line.checked_sub(self.first_line)? as usize;
        self.line_starts.get(index).copied()
    }

    /// 1-based `(line, column)` of a byte offset.
    ///
    /// Offsets before the first line clamp to its first column.
    pub fn location_of(&self, offset: usize) -> (u32, u32) {
        let index = self.line_starts.partition_point(|&start| start <= offset);
        if index == 0 {
            return (self.first_line, 1);
        }
        let start = self.line_starts[index - 1];
        (self.first_line + (index - 1) as u32, (offset - start) as u32 + 1)
    }

    /// Byte offset of a 1-based `(line, column)`.
    ///
    /// ## Returns
    /// - `None` if the line is unknown, the column is `0`, or the column runs past the start of the next line.
    pub fn offset_of(&self, line: u32, column: u32) -> Option<usize> {
        if column == 0 {
            return None;
        }
        let start = self.line_start(line)?;
        let offset = start + (column as usize - 1);
        match self.line_start(line + 1) {
            Some(next) if offset >= next => None,
            _ => Some(offset),
        }
    }
}

impl Default for LineOffsetTable {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Decoded {
    ch: char,
    len: u8,
}

/// Character window over a reader.
pub struct Scanner<R> {
    reader: R,
    window: Vec<Decoded>,
    head: usize,
    /// Undecoded bytes left over from the previous fill (a split multi-byte sequence).
    carry: Vec<u8>,
    chunk: Vec<u8>,
    offset: usize,
    consumed_chars: usize,
    exhausted: bool,
    io_error: Option<io::Error>,
    lines: LineOffsetTable,
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_CAPACITY, SourceLocation::START)
    }

    /// Create a scanner that reports offsets relative to `start` and reads `capacity` bytes at a time.
    pub fn with_capacity(reader: R, capacity: usize, start: SourceLocation) -> Self {
        let capacity = capacity.max(16);
        let first_line_start = start.index.saturating_sub(start.column.saturating_sub(1) as usize);
        Self {
            reader,
            window: Vec::with_capacity(capacity),
            head: 0,
            carry: Vec::new(),
            chunk: vec![0; capacity],
            offset: start.index,
            consumed_chars: 0,
            exhausted: false,
            io_error: None,
            lines: LineOffsetTable::new(start.line, first_line_start),
        }
    }

    /// Absolute byte offset of the next character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of characters consumed so far.
    pub fn consumed_chars(&self) -> usize {
        self.consumed_chars
    }

    pub fn line_table(&self) -> &LineOffsetTable {
        &self.lines
    }

    pub fn into_line_table(self) -> LineOffsetTable {
        self.lines
    }

    /// Take the read error that ended the stream, if any.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    pub fn peek(&mut self) -> Option<char> {
        self.peek_at(0)
    }

    /// Character `n` positions ahead of the cursor without consuming anything.
    pub fn peek_at(&mut self, n: usize) -> Option<char> {
        while self.head + n >= self.window.len() {
            if !self.fill() {
                return None;
            }
        }
        Some(self.window[self.head + n].ch)
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consume one character.
    pub fn advance(&mut self) -> Option<char> {
        self.peek()?;
        let decoded = self.window[self.head];
        self.head += 1;
        self.offset += decoded.len as usize;
        self.consumed_chars += 1;
        if decoded.ch == '\n' {
            self.lines.push_line_start(self.offset);
        }
        Some(decoded.ch)
    }

    /// Consume characters while `pred` holds, appending them to `out`.
    pub fn advance_while(&mut self, out: &mut String, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
    }

    /// Pull another chunk from the reader. Returns `false` once nothing more can be decoded.
    fn fill(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.compact();
        let before = self.window.len();
        while self.window.len() == before {
            let read = loop {
                match self.reader.read(&mut self.chunk) {
                    Ok(n) => break n,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        tracing::debug!(error = %err, "source read failed; treating as end of input");
                        self.io_error = Some(err);
                        break 0;
                    }
                }
            };
            if read == 0 {
                self.exhausted = true;
                self.decode_carry(true);
                break;
            }
            self.carry.extend_from_slice(&self.chunk[..read]);
            self.decode_carry(false);
        }
        self.window.len() > before
    }

    /// Decode as much of `carry` as possible. At end of input, trailing partial sequences become `U+FFFD`.
    fn decode_carry(&mut self, at_end: bool) {
        let mut consumed = 0;
        loop {
            let rest = &self.carry[consumed..];
            if rest.is_empty() {
                break;
            }
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    push_chars(&mut self.window, text);
                    consumed = self.carry.len();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        push_chars(&mut self.window, text);
                    }
                    consumed += valid;
                    match err.error_len() {
                        Some(bad) => {
                            self.window.push(Decoded {
                                ch: char::REPLACEMENT_CHARACTER,
                                len: bad as u8,
                            });
                            consumed += bad;
                        }
                        None if at_end => {
                            let bad = self.carry.len() - consumed;
                            self.window.push(Decoded {
                                ch: char::REPLACEMENT_CHARACTER,
                                len: bad as u8,
                            });
                            consumed = self.carry.len();
                            break;
                        }
                        // Incomplete sequence split across reads: keep it for the next fill.
                        None => break,
                    }
                }
            }
        }
        self.carry.drain(..consumed);
    }

    /// Drop consumed characters once they dominate the window.
    fn compact(&mut self) {
        if self.head > 0 && self.head * 2 >= self.window.len() {
            self.window.drain(..self.head);
            self.head = 0;
        }
    }
}

fn push_chars(window: &mut Vec<Decoded>, text: &str) {
    window.extend(text.chars().map(|ch| Decoded {
        ch,
        len: ch.len_utf8() as u8,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn drain<R: Read>(scanner: &mut Scanner<R>) -> String {
        let mut out = String::new();
        while let Some(c) = scanner.advance() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_offsets_count_bytes() {
        let mut scanner = Scanner::new("aé\nb".as_bytes());
        assert_eq!(scanner.advance(), Some('a'));
        assert_eq!(scanner.advance(), Some('é'));
        assert_eq!(scanner.offset(), 3);
        assert_eq!(scanner.consumed_chars(), 2);
        drain(&mut scanner);
        assert_eq!(scanner.line_table().location_of(4), (2, 1));
    }

    #[test]
    fn test_multibyte_sequence_split_across_reads() {
        let text = "DISPLAY \"héllo wörld\"";
        let mut scanner = Scanner::with_capacity(
            Trickle {
                data: text.as_bytes(),
                step: 1,
            },
            16,
            SourceLocation::START,
        );
        assert_eq!(drain(&mut scanner), text);
        assert_eq!(scanner.offset(), text.len());
    }

    #[test]
    fn test_invalid_utf8_keeps_byte_length() {
        let bytes = [b'a', 0xFF, b'b'];
        let mut scanner = Scanner::new(&bytes[..]);
        assert_eq!(drain(&mut scanner), "a\u{FFFD}b");
        assert_eq!(scanner.offset(), 3);
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        let bytes = [b'a', 0xC3];
        let mut scanner = Scanner::new(&bytes[..]);
        assert_eq!(drain(&mut scanner), "a\u{FFFD}");
        assert_eq!(scanner.offset(), 2);
    }

    #[test]
    fn test_peek_far_ahead_across_fills() {
        let text = "x".repeat(100) + "y";
        let mut scanner = Scanner::with_capacity(text.as_bytes(), 16, SourceLocation::START);
        assert_eq!(scanner.peek_at(100), Some('y'));
        assert_eq!(scanner.peek_at(101), None);
        assert_eq!(scanner.advance(), Some('x'));
    }

    #[test]
    fn test_start_location_shifts_offsets_and_lines() {
        let start = SourceLocation::new(100, 10, 5);
        let mut scanner = Scanner::with_capacity("ab\ncd".as_bytes(), 64, start);
        drain(&mut scanner);
        let lines = scanner.line_table();
        assert_eq!(lines.location_of(100), (10, 5));
        assert_eq!(lines.location_of(103), (11, 1));
        assert_eq!(scanner.offset(), 105);
    }

    #[test]
    fn test_offset_of_rejects_columns_past_line_end() {
        let table = LineOffsetTable::from_source("ab\ncd\n");
        assert_eq!(table.offset_of(1, 3), Some(2));
        assert_eq!(table.offset_of(1, 4), None);
        assert_eq!(table.offset_of(0, 1), None);
        assert_eq!(table.offset_of(2, 0), None);
        assert_eq!(table.offset_of(5, 1), None);
    }
}
