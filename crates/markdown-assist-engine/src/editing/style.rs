//! Inline style toggling (`**bold**`, `~~strike~~`, `` `code` ``, ...).
//!
//! For every selection the engine decides which text to act on, whether that
//! text is already wrapped in the delimiter pair, and where the selection goes
//! afterwards. All edits are computed against the same snapshot, so a
//! per-line [`ShiftLedger`] tracks how earlier edits move later positions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::editing::document::utf16_len;
use crate::editing::{EditBatch, Position, Range, Selection, TextDocument, TextEdit};

/// Start/end delimiters of an inline style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterPair {
    start: String,
    end: String,
}

impl DelimiterPair {
    /// A symmetric pair: the end delimiter equals the start one.
    pub fn new(start: impl Into<String>) -> Self {
        let start = start.into();
        Self {
            end: start.clone(),
            start,
        }
    }

    pub fn with_end(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn bold() -> Self {
        Self::new("**")
    }

    /// Italic uses a configurable indicator, `*` or `_`.
    pub fn italic(indicator: &str) -> Self {
        Self::new(indicator)
    }

    pub fn strikethrough() -> Self {
        Self::new("~~")
    }

    pub fn code_span() -> Self {
        Self::new("`")
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    fn start_len(&self) -> isize {
        utf16_len(&self.start) as isize
    }

    fn end_len(&self) -> isize {
        utf16_len(&self.end) as isize
    }

    fn pattern_len(&self) -> isize {
        self.start_len() + self.end_len()
    }

    fn is_strikethrough(&self) -> bool {
        self.start == "~~"
    }

    /// True when `text` begins with the start delimiter and ends with the end
    /// delimiter without the two overlapping.
    pub fn wraps(&self, text: &str) -> bool {
        text.len() >= self.start.len() + self.end.len()
            && text.starts_with(&self.start)
            && text.ends_with(&self.end)
    }
}

/// What surrounds an empty cursor, relative to a delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapContext {
    /// `start|end`
    WrappedEmpty,
    /// `starttext|end`
    WrappedWithText,
    Unknown,
}

/// Classify the text immediately around `cursor`, clamped to its line.
pub fn classify(doc: &TextDocument, cursor: Position, pair: &DelimiterPair) -> WrapContext {
    let ch = cursor.character;
    let before = doc.slice_line(
        cursor.line,
        ch.saturating_sub(pair.start_len() as usize),
        ch,
    );
    let after = doc.slice_line(cursor.line, ch, ch + pair.end_len() as usize);

    if after != pair.end {
        WrapContext::Unknown
    } else if before == pair.start {
        WrapContext::WrappedEmpty
    } else {
        WrapContext::WrappedWithText
    }
}

/// Net character deltas left behind by earlier edits of a batch.
#[derive(Debug, Default)]
struct ShiftLedger {
    marks: Vec<(Position, isize)>,
}

impl ShiftLedger {
    fn record(&mut self, boundary: Position, delta: isize) {
        self.marks.push((boundary, delta));
    }

    /// Sum of deltas recorded on `pos.line` at or before `pos.character`.
    fn shift_at(&self, pos: Position) -> isize {
        self.marks
            .iter()
            .filter(|(at, _)| at.line == pos.line && pos.character >= at.character)
            .map(|(_, delta)| delta)
            .sum()
    }
}

static LIST_ITEM_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[*+\-] (\[[ x]\] )? *").unwrap());

/// Length (UTF-16) of a bullet/task list marker at the start of `line`.
fn list_marker_len(line: &str) -> Option<usize> {
    LIST_ITEM_PREFIX.find(line).map(|m| utf16_len(m.as_str()))
}

/// Toggle `pair` around every selection.
///
/// Returns one entry per selection, in input order. Nothing is mutated: the
/// caller applies the batch atomically and then installs the new selections.
pub fn toggle_style(
    doc: &TextDocument,
    selections: &[Selection],
    pair: &DelimiterPair,
) -> EditBatch {
    let mut ledger = ShiftLedger::default();
    let mut batch = EditBatch::default();
    let mut applied: Vec<AppliedEdit> = Vec::new();

    for selection in selections {
        let shift = ledger.shift_at(selection.start());

        if !selection.is_empty() {
            let range = selection.range();
            if let Some(earlier) = applied.iter().find(|e| e.overlaps(range)) {
                log::debug!("selection {range:?} overlaps edit {:?}", earlier.range);
                let end = selection.end().offset_by(ledger.shift_at(selection.end()));
                batch.push(None, selection.with_bounds(selection.start().offset_by(shift), end));
                continue;
            }
            let (edit, moved) = wrap_range(doc, &mut ledger, selection, shift, range, true, pair);
            applied.push(AppliedEdit::new(doc, &edit, shift, pair));
            batch.push(Some(edit), moved);
            continue;
        }

        let cursor = selection.active;
        let context = classify(doc, cursor, pair);
        log::debug!("toggle {:?} at {cursor:?}: {context:?}", pair.start);

        let range = match context {
            WrapContext::WrappedWithText => {
                // `**text|**` -> `**text**|`
                let moved = Selection::cursor(cursor.offset_by(shift + pair.end_len()));
                batch.push(None, moved);
                continue;
            }
            WrapContext::WrappedEmpty => Range::new(
                cursor.offset_by(-pair.start_len()),
                cursor.offset_by(pair.end_len()),
            ),
            WrapContext::Unknown => target_range(doc, cursor, pair),
        };

        // Another cursor already toggles this word: ride along with its edit
        if let Some(earlier) = applied.iter().find(|e| e.overlaps(range)) {
            let delta = cursor_delta(cursor, earlier.range, earlier.sign, pair);
            batch.push(None, Selection::cursor(cursor.offset_by(earlier.shift + delta)));
            continue;
        }

        let (edit, moved) = wrap_range(doc, &mut ledger, selection, shift, range, false, pair);
        applied.push(AppliedEdit::new(doc, &edit, shift, pair));
        batch.push(Some(edit), moved);
    }

    batch
}

/// An edit already in the batch, kept so later selections in the same range
/// move with it instead of editing the text twice.
struct AppliedEdit {
    range: Range,
    sign: isize,
    shift: isize,
}

impl AppliedEdit {
    fn new(doc: &TextDocument, edit: &TextEdit, shift: isize, pair: &DelimiterPair) -> Self {
        let unwrapped = pair.wraps(&doc.text_in(edit.range));
        Self {
            range: edit.range,
            sign: if unwrapped { -1 } else { 1 },
            shift,
        }
    }

    fn overlaps(&self, range: Range) -> bool {
        self.range == range || (range.start < self.range.end && self.range.start < range.end)
    }
}

/// The range a bare cursor acts on: the word under it, or nothing.
fn target_range(doc: &TextDocument, cursor: Position, pair: &DelimiterPair) -> Range {
    let word = doc.word_range_at(cursor);

    if pair.is_strikethrough()
        && let Some(marker_len) = list_marker_len(doc.line_text(cursor.line))
    {
        return match word {
            Some(word) if word.start.character >= marker_len => word,
            // Cursor on the marker or between words: strike the whole item text
            _ => Range::new(
                Position::new(cursor.line, marker_len),
                Position::new(cursor.line, doc.line_len(cursor.line)),
            ),
        };
    }

    word.unwrap_or(Range::empty(cursor))
}

/// Add or remove the delimiters around `range` and work out the new selection.
fn wrap_range(
    doc: &TextDocument,
    ledger: &mut ShiftLedger,
    selection: &Selection,
    shift: isize,
    range: Range,
    is_selected: bool,
    pair: &DelimiterPair,
) -> (TextEdit, Selection) {
    let text = doc.text_in(range);
    let unwrap = pair.wraps(&text);
    let sign: isize = if unwrap { -1 } else { 1 };

    // On a multi-line range only the end delimiter lands on the end line
    let end_line_shift = ledger.shift_at(range.end);
    let end_line_delta = if range.is_single_line() {
        sign * pair.pattern_len()
    } else {
        sign * pair.end_len()
    };

    let new_text = if unwrap {
        text[pair.start.len()..text.len() - pair.end.len()].to_string()
    } else {
        format!("{}{}{}", pair.start, text, pair.end)
    };
    ledger.record(range.end, end_line_delta);

    let moved = if is_selected {
        let start = selection.start().offset_by(shift);
        let end = if selection.range().is_single_line() {
            selection.end().offset_by(shift + end_line_delta)
        } else {
            selection.end().offset_by(end_line_shift + end_line_delta)
        };
        selection.with_bounds(start, end)
    } else {
        let cursor = selection.active;
        Selection::cursor(cursor.offset_by(shift + cursor_delta(cursor, range, sign, pair)))
    };

    (TextEdit::replace(range, new_text), moved)
}

/// How far a bare cursor moves when `range` is wrapped (`sign` 1) or
/// unwrapped (`sign` -1).
fn cursor_delta(cursor: Position, range: Range, sign: isize, pair: &DelimiterPair) -> isize {
    if cursor < range.start {
        0
    } else if !range.is_empty() && cursor == range.end {
        sign * pair.pattern_len()
    } else {
        // `**|**` -> `|` lands where the delimiters began; `|` -> `**|**`
        // and quick styling keep the cursor on the same content character.
        sign * pair.start_len()
    }
}
