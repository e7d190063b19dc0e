//! Cycling an empty cursor through the math block shapes.

use crate::editing::{
    DelimiterPair, EditBatch, Position, Range, Selection, TextDocument, TextEdit, WrapContext,
    classify,
};

/// Math block surrounding a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathState {
    None,
    /// `$|$`
    Inline,
    /// `$$ | $$`
    SingleDisplayed,
    /// An empty line between two `$$` lines.
    MultiDisplayed,
}

const CYCLE: [MathState; 4] = [
    MathState::None,
    MathState::Inline,
    MathState::MultiDisplayed,
    MathState::SingleDisplayed,
];

impl MathState {
    pub fn detect(doc: &TextDocument, cursor: Position) -> Self {
        if classify(doc, cursor, &DelimiterPair::new("$")) == WrapContext::WrappedEmpty {
            return MathState::Inline;
        }
        if classify(doc, cursor, &DelimiterPair::with_end("$$ ", " $$"))
            == WrapContext::WrappedEmpty
        {
            return MathState::SingleDisplayed;
        }
        let line = cursor.line;
        if doc.line_text(line).is_empty()
            && line > 0
            && line + 1 < doc.line_count()
            && doc.line_text(line - 1) == "$$"
            && doc.line_text(line + 1) == "$$"
        {
            return MathState::MultiDisplayed;
        }
        MathState::None
    }

    /// Next state in the cycle `None -> Inline -> MultiDisplayed -> SingleDisplayed`,
    /// walked backwards when `reverse` is set.
    pub fn next(self, reverse: bool) -> Self {
        let idx = CYCLE.iter().position(|s| *s == self).unwrap_or(0);
        let step = if reverse { CYCLE.len() - 1 } else { 1 };
        CYCLE[(idx + step) % CYCLE.len()]
    }

    /// Range occupied by this block around `cursor`.
    fn span(self, cursor: Position) -> Range {
        let at = |delta: isize| cursor.offset_by(delta);
        match self {
            MathState::None => Range::empty(cursor),
            MathState::Inline => Range::new(at(-1), at(1)),
            MathState::SingleDisplayed => Range::new(at(-3), at(3)),
            MathState::MultiDisplayed => Range::new(
                Position::new(cursor.line - 1, 0),
                Position::new(cursor.line + 1, 2),
            ),
        }
    }

    fn template(self) -> &'static str {
        match self {
            MathState::None => "",
            MathState::Inline => "$$",
            MathState::SingleDisplayed => "$$  $$",
            MathState::MultiDisplayed => "$$\n\n$$",
        }
    }

    /// Where the cursor goes once the template is inserted at `start`.
    fn cursor_inside(self, start: Position) -> Position {
        match self {
            MathState::None => start,
            MathState::Inline => start.offset_by(1),
            MathState::SingleDisplayed => start.offset_by(3),
            MathState::MultiDisplayed => Position::new(start.line + 1, 0),
        }
    }
}

/// Replace the math block at the primary cursor with the next one in the
/// cycle. Returns `None` when the primary selection is not empty.
pub fn toggle_math(
    doc: &TextDocument,
    selections: &[Selection],
    reverse: bool,
) -> Option<EditBatch> {
    let primary = selections.first()?;
    if !primary.is_empty() {
        return None;
    }
    let cursor = doc.clamp(primary.active);
    let old = MathState::detect(doc, cursor);
    let new = old.next(reverse);
    log::debug!("math block {old:?} -> {new:?} at {cursor:?}");

    let span = old.span(cursor);
    let edit = TextEdit::replace(span, new.template());
    let mut batch = EditBatch::default();
    batch.push(
        Some(edit),
        Selection::cursor(new.cursor_inside(span.start)),
    );
    Some(batch)
}
