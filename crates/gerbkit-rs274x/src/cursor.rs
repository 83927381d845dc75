//! Line buffer and read position over a stack of input streams
//!
//! Gerber files are consumed one physical line at a time. The cursor
//! owns the current line, a byte position inside it and the stream it
//! was read from. Include files push a new stream on top; when that
//! stream runs dry the cursor drops back to the one that included it.

use std::fmt;
use std::io::{BufRead, Cursor, Read};

use crate::error::{Rs274xError, Rs274xResult};

/// Default line buffer size in bytes
pub const DEFAULT_LINE_CAPACITY: usize = 4000;

/// Read position within the current line of a Gerber stream
pub struct LineCursor {
    line: Vec<u8>,
    pos: usize,
    capacity: usize,
    current: Box<dyn BufRead>,
    suspended: Vec<Box<dyn BufRead>>,
    lines_read: usize,
}

impl fmt::Debug for LineCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineCursor")
            .field("line", &String::from_utf8_lossy(&self.line))
            .field("pos", &self.pos)
            .field("capacity", &self.capacity)
            .field("include_depth", &self.suspended.len())
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

impl LineCursor {
    /// Create a cursor over `reader` with an empty line buffer.
    ///
    /// Nothing is read until the first [`refill`](Self::refill).
    pub fn new(reader: impl BufRead + 'static) -> Self {
        Self::with_capacity(reader, DEFAULT_LINE_CAPACITY)
    }

    pub fn with_capacity(reader: impl BufRead + 'static, capacity: usize) -> Self {
        Self {
            line: Vec::new(),
            pos: 0,
            capacity,
            current: Box::new(reader),
            suspended: Vec::new(),
            lines_read: 0,
        }
    }

    /// Cursor over in-memory text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Cursor::new(text.into().into_bytes()))
    }

    /// Byte under the cursor, `None` once the line is used up
    pub fn peek(&self) -> Option<u8> {
        self.line.get(self.pos).copied()
    }

    /// Byte `offset` positions past the cursor
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.line.get(self.pos + offset).copied()
    }

    /// Move forward one byte. No-op at the end of the line.
    pub fn advance(&mut self) {
        if self.pos < self.line.len() {
            self.pos += 1;
        }
    }

    /// Move forward `n` bytes, clamped to the end of the line
    pub fn advance_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.line.len());
    }

    /// Unread part of the current line
    pub fn remaining(&self) -> &[u8] {
        &self.line[self.pos..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.line.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Physical lines read so far across all streams
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Skip spaces, tabs and line breaks in the current line
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Replace the line buffer with the next physical line.
    ///
    /// At most `capacity + 1` bytes are pulled from the stream, so an
    /// overlong line fails without being buffered in full. Returns
    /// `Ok(false)` when the base stream is exhausted. An included
    /// stream that hits end of file is dropped and reading resumes in
    /// the stream that included it.
    pub fn refill(&mut self) -> Rs274xResult<bool> {
        loop {
            self.line.clear();
            self.pos = 0;
            let limit = self.capacity as u64 + 1;
            let n = (&mut self.current)
                .take(limit)
                .read_until(b'\n', &mut self.line)?;
            if n == 0 {
                match self.suspended.pop() {
                    Some(parent) => {
                        tracing::debug!(depth = self.suspended.len(), "include file finished");
                        self.current = parent;
                        continue;
                    }
                    None => return Ok(false),
                }
            }
            if self.line.len() > self.capacity {
                self.line.clear();
                return Err(Rs274xError::LineTooLong {
                    capacity: self.capacity,
                });
            }
            self.lines_read += 1;
            return Ok(true);
        }
    }

    /// Continue reading from `reader`; the current stream is resumed at
    /// its end. The unread part of the current line is still consumed
    /// before the new stream.
    pub fn push_stream(&mut self, reader: Box<dyn BufRead>) {
        let parent = std::mem::replace(&mut self.current, reader);
        self.suspended.push(parent);
    }

    /// Number of include streams stacked above the base stream
    pub fn include_depth(&self) -> usize {
        self.suspended.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_reads_lines_in_order() {
        let mut cursor = LineCursor::from_text("G04 one*\nG04 two*\n");
        assert!(cursor.is_exhausted());
        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"G04 one*\n");
        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"G04 two*\n");
        assert!(!cursor.refill().unwrap());
        assert_eq!(cursor.lines_read(), 2);
    }

    #[test]
    fn test_line_too_long_is_an_error() {
        let mut cursor = LineCursor::with_capacity(Cursor::new(b"0123456789\n".to_vec()), 4);
        assert!(matches!(
            cursor.refill(),
            Err(Rs274xError::LineTooLong { capacity: 4 })
        ));
    }

    #[test]
    fn test_endless_line_stops_at_capacity() {
        let endless = std::io::BufReader::new(std::io::repeat(b'x'));
        let mut cursor = LineCursor::with_capacity(endless, 64);
        assert!(matches!(
            cursor.refill(),
            Err(Rs274xError::LineTooLong { capacity: 64 })
        ));
    }

    #[test]
    fn test_line_at_capacity_is_accepted() {
        let mut cursor = LineCursor::with_capacity(Cursor::new(b"abc\nde".to_vec()), 4);
        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"abc\n");
        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"de");
    }

    #[test]
    fn test_included_stream_returns_to_parent() {
        let mut cursor = LineCursor::from_text("parent 1\nparent 2\n");
        assert!(cursor.refill().unwrap());
        cursor.push_stream(Box::new(Cursor::new(b"child\n".to_vec())));
        assert_eq!(cursor.include_depth(), 1);

        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"child\n");
        assert!(cursor.refill().unwrap());
        assert_eq!(cursor.remaining(), b"parent 2\n");
        assert_eq!(cursor.include_depth(), 0);
    }

    #[test]
    fn test_advance_never_passes_end() {
        let mut cursor = LineCursor::from_text("ab");
        cursor.refill().unwrap();
        cursor.advance_by(10);
        assert!(cursor.is_exhausted());
        cursor.advance();
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.peek(), None);
    }
}
