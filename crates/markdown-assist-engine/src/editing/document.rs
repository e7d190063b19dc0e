use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use xi_rope::Rope;

/// A zero-based line/character position.
///
/// `character` counts UTF-16 code units, matching the convention of the
/// editors that host the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    /// Same line, different character.
    pub fn with_character(self, character: usize) -> Self {
        Self {
            line: self.line,
            character,
        }
    }

    /// Moves the character by a signed delta, saturating at the line start.
    pub fn offset_by(self, delta: isize) -> Self {
        self.with_character(self.character.saturating_add_signed(delta))
    }
}

/// A `[start, end)` span between two positions. `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range, ordering the two positions.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

/// An anchor/active pair. Empty when both ends coincide (a bare cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn cursor(at: Position) -> Self {
        Self {
            anchor: at,
            active: at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// True when the active end precedes the anchor.
    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }

    /// Builds a selection over `start..end` keeping the orientation of `self`.
    pub fn with_bounds(&self, start: Position, end: Position) -> Self {
        if self.is_reversed() {
            Self::new(end, start)
        } else {
            Self::new(start, end)
        }
    }
}

/// Byte span and text of one line, without its terminator.
#[derive(Debug, Clone)]
pub(crate) struct LineRef {
    pub(crate) start: usize,
    pub(crate) text: String,
}

/// Word pattern used for "word under cursor" lookups.
///
/// `*`, `_`, `~` and `$` count as word characters so that a cursor inside an
/// already styled word such as `**bold**` picks up its delimiters too.
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(-?\d*\.\d\w*)|([^`!@#%^&()\-=+\[{\]}\\|;:'",.<>/?\s，。《》？；：‘“’”（）【】、]+)"#,
    )
    .unwrap()
});

/// Immutable snapshot of a text document.
///
/// The host owns the live buffer; the engine only ever reads a snapshot and
/// describes edits against it. Text lives in an `xi_rope::Rope` so batches
/// can be compiled to a single `Delta` (see [`crate::editing::EditBatch`]).
#[derive(Debug, Clone)]
pub struct TextDocument {
    pub(crate) buffer: Rope,
    lines: Vec<LineRef>,
}

impl TextDocument {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_rope(Rope::from(text)))
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_rope(Rope::from(text))
    }

    pub(crate) fn from_rope(buffer: Rope) -> Self {
        let lines = split_lines(&buffer);
        Self { buffer, lines }
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Buffer length in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Number of lines. A trailing newline opens one more (empty) line.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of a line without its terminator. Empty past the last line.
    pub fn line_text(&self, line: usize) -> &str {
        self.lines.get(line).map(|l| l.text.as_str()).unwrap_or("")
    }

    /// Line length in UTF-16 code units.
    pub fn line_len(&self, line: usize) -> usize {
        utf16_len(self.line_text(line))
    }

    /// Iterates `(line index, text)` pairs.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, l)| (i, l.text.as_str()))
    }

    /// Slice of one line between two UTF-16 character offsets, clamped to the
    /// line bounds.
    pub fn slice_line(&self, line: usize, start: usize, end: usize) -> &str {
        let text = self.line_text(line);
        let from = utf16_to_byte(text, start);
        let to = utf16_to_byte(text, end).max(from);
        &text[from..to]
    }

    /// Clamps a position to an existing line and character.
    pub fn clamp(&self, pos: Position) -> Position {
        let last = self.line_count().saturating_sub(1);
        let line = pos.line.min(last);
        Position::new(line, pos.character.min(self.line_len(line)))
    }

    /// Byte offset in the buffer for a position (clamped).
    pub fn offset_at(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        match self.lines.get(pos.line) {
            Some(line) => line.start + utf16_to_byte(&line.text, pos.character),
            None => 0,
        }
    }

    /// Position of a byte offset (clamped to the buffer).
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.len());
        let line = match self.lines.binary_search_by(|l| l.start.cmp(&offset)) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let Some(line_ref) = self.lines.get(line) else {
            return Position::default();
        };
        let local = (offset - line_ref.start).min(line_ref.text.len());
        Position::new(line, byte_to_utf16(&line_ref.text, local))
    }

    /// Text covered by a range. May span lines.
    pub fn text_in(&self, range: Range) -> Cow<'_, str> {
        self.slice_to_cow(self.offset_at(range.start)..self.offset_at(range.end))
    }

    /// Slice the buffer to a cow string
    pub(crate) fn slice_to_cow(&self, range: std::ops::Range<usize>) -> Cow<'_, str> {
        let doc_len = self.buffer.len();

        // Clamp range to document bounds to prevent xi-rope panic
        let start = range.start.min(doc_len);
        let end = range.end.min(doc_len).max(start);

        self.buffer.slice_to_cow(start..end)
    }

    /// Range of the word touching `pos`, if any.
    ///
    /// A word "touches" the position when the position lies at its start, its
    /// end or anywhere inside it.
    pub fn word_range_at(&self, pos: Position) -> Option<Range> {
        let text = self.line_text(pos.line);
        let byte = utf16_to_byte(text, pos.character);
        WORD_PATTERN
            .find_iter(text)
            .find(|m| m.start() <= byte && byte <= m.end())
            .map(|m| {
                Range::new(
                    Position::new(pos.line, byte_to_utf16(text, m.start())),
                    Position::new(pos.line, byte_to_utf16(text, m.end())),
                )
            })
    }
}

fn split_lines(buffer: &Rope) -> Vec<LineRef> {
    let mut offset = 0usize;
    let mut ends_open = true;
    let mut lines: Vec<LineRef> = buffer
        .lines_raw(..)
        .map(|raw| {
            let start = offset;
            offset += raw.len();
            ends_open = raw.ends_with('\n');
            let text = raw.trim_end_matches('\n').trim_end_matches('\r');
            LineRef {
                start,
                text: text.to_string(),
            }
        })
        .collect();

    // A buffer that ends with a newline (or is empty) has one more, empty line.
    if ends_open && lines.last().is_none_or(|l| l.start != buffer.len()) {
        lines.push(LineRef {
            start: buffer.len(),
            text: String::new(),
        });
    }
    lines
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index for a UTF-16 offset, clamped to `s.len()`.
///
/// An offset falling inside a surrogate pair rounds up to the next char
/// boundary.
pub fn utf16_to_byte(s: &str, units: usize) -> usize {
    let mut seen = 0;
    for (idx, ch) in s.char_indices() {
        if seen >= units {
            return idx;
        }
        seen += ch.len_utf16();
    }
    s.len()
}

/// UTF-16 offset for a byte index.
pub fn byte_to_utf16(s: &str, byte: usize) -> usize {
    let byte = byte.min(s.len());
    s.char_indices()
        .take_while(|(idx, _)| *idx < byte)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}
