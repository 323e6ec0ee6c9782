///
/// Source Buffer and Location Module
///
/// This module owns raw source text and maps byte offsets to human-facing
/// (line, column) locations. Every token and AST node carries a SourceRange
/// derived from these locations.
///
/// Key types:
/// - SourceLocation: 1-based line and column of a single position
/// - SourceRange: start and end locations, end is exclusive
/// - SourceBuffer: the text, its file name, and a line-start index
/// - SourceIter: forward iterator over characters with locations attached
///
/// Design decisions:
/// - Offsets are byte-based, columns count characters
/// - `\r\n`, `\r` and `\n` are each a single line break
/// - The zero/zero range is the sentinel for synthetic nodes
///

use std::fmt;

use memchr::memchr2;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub const fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub const fn unknown() -> Self {
        Self {
            start: SourceLocation::new(0, 0),
            end: SourceLocation::new(0, 0),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.start.is_unknown() && self.end.is_unknown()
    }

    /// Smallest range covering both. Unknown ranges are ignored.
    pub fn merge(self, other: SourceRange) -> SourceRange {
        if self.is_unknown() {
            return other;
        }
        if other.is_unknown() {
            return self;
        }
        SourceRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, location: SourceLocation) -> bool {
        location >= self.start && location < self.end
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

pub trait Spanned {
    fn range(&self) -> SourceRange;
}

impl Spanned for SourceRange {
    fn range(&self) -> SourceRange {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("offset {offset} is out of range for a buffer of {size} bytes")]
    OutOfRange { offset: usize, size: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

#[derive(Debug, Clone)]
pub struct SourceBuffer {
    pub name: String,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = index_line_starts(text.as_bytes());
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn anonymous(text: impl Into<String>) -> Self {
        Self::new("<input>", text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Bounds-checked character at a byte offset.
    pub fn at(&self, offset: usize) -> Result<char, SourceError> {
        if offset >= self.text.len() {
            return Err(SourceError::OutOfRange {
                offset,
                size: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(SourceError::NotCharBoundary { offset });
        }
        Ok(self.text[offset..].chars().next().unwrap_or('\0'))
    }

    /// Unchecked byte access for cursors: `0` past the end.
    #[inline(always)]
    pub fn byte(&self, offset: usize) -> u8 {
        self.text.as_bytes().get(offset).copied().unwrap_or(0)
    }

    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self.text[start..offset].chars().count() + 1;
        SourceLocation::new(line as u32 + 1, column as u32)
    }

    pub fn range(&self, start: usize, end: usize) -> SourceRange {
        SourceRange::new(self.location(start), self.location(end))
    }

    /// Inverse of `location`. Columns past the end of a line clamp to it.
    pub fn offset(&self, location: SourceLocation) -> Option<usize> {
        if location.line == 0 || location.column == 0 {
            return None;
        }
        let line = location.line as usize - 1;
        let start = *self.line_starts.get(line)?;
        let skip = location.column as usize - 1;
        let mut offset = start;
        for (taken, c) in self.text[start..].chars().enumerate() {
            if taken == skip {
                return Some(offset);
            }
            offset += c.len_utf8();
        }
        Some(offset)
    }

    pub fn slice(&self, range: SourceRange) -> Option<&str> {
        let start = self.offset(range.start)?;
        let end = self.offset(range.end)?;
        self.text.get(start..end)
    }

    pub fn iter(&self) -> SourceIter<'_> {
        SourceIter {
            buffer: self,
            offset: 0,
            location: SourceLocation::new(1, 1),
        }
    }
}

fn index_line_starts(bytes: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    let mut pos = 0;
    while let Some(found) = memchr2(b'\n', b'\r', &bytes[pos..]) {
        let at = pos + found;
        let next = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
            at + 2
        } else {
            at + 1
        };
        starts.push(next);
        pos = next;
    }
    starts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceChar {
    pub ch: char,
    pub offset: usize,
    pub location: SourceLocation,
}

/// Character cursor that tracks its location incrementally.
#[derive(Debug, Clone)]
pub struct SourceIter<'src> {
    buffer: &'src SourceBuffer,
    offset: usize,
    location: SourceLocation,
}

impl<'src> SourceIter<'src> {
    pub fn buffer(&self) -> &'src SourceBuffer {
        self.buffer
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.buffer.size()
    }

    pub fn peek(&self) -> Option<char> {
        self.buffer.text[self.offset..].chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.buffer.text[self.offset..].chars().nth(n)
    }

    pub fn rest(&self) -> &'src str {
        &self.buffer.text[self.offset..]
    }

    /// Jumps forward to `offset`, recomputing the location from the index.
    pub fn seek(&mut self, offset: usize) {
        debug_assert!(offset >= self.offset, "SourceIter only moves forward");
        self.offset = offset.min(self.buffer.size());
        self.location = self.buffer.location(self.offset);
    }
}

impl<'src> Iterator for SourceIter<'src> {
    type Item = SourceChar;

    fn next(&mut self) -> Option<SourceChar> {
        let ch = self.peek()?;
        let item = SourceChar {
            ch,
            offset: self.offset,
            location: self.location,
        };
        self.offset += ch.len_utf8();
        match ch {
            '\n' => self.location = SourceLocation::new(self.location.line + 1, 1),
            '\r' if self.buffer.byte(self.offset) != b'\n' => {
                self.location = SourceLocation::new(self.location.line + 1, 1)
            }
            _ => self.location.column += 1,
        }
        Some(item)
    }
}
