use serde::Serialize;
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::editing::{Position, Range, Selection, TextDocument};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("edit at line {line} is outside the document ({line_count} lines)")]
    OutOfRange { line: usize, line_count: usize },
    #[error("edits overlap at line {}, character {}", .at.line, .at.character)]
    Overlapping { at: Position },
}

/// Replace `range` (pre-edit coordinates) with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: Position, new_text: impl Into<String>) -> Self {
        Self::replace(Range::empty(at), new_text)
    }

    pub fn delete(range: Range) -> Self {
        Self::replace(range, String::new())
    }
}

/// Outcome for one input selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEdit {
    /// `None` when the selection only moves (e.g. stepping over a closing delimiter).
    pub edit: Option<TextEdit>,
    /// Where the selection ends up once the whole batch is applied.
    pub selection: Selection,
}

/// Result of compiling a command against a snapshot.
///
/// Every edit is expressed against the snapshot the batch was computed from,
/// and the batch is meant to be applied atomically. The selections are already
/// expressed in post-edit coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditBatch {
    pub entries: Vec<SelectionEdit>,
}

impl EditBatch {
    pub fn push(&mut self, edit: Option<TextEdit>, selection: Selection) {
        self.entries.push(SelectionEdit { edit, selection });
    }

    pub fn edits(&self) -> impl Iterator<Item = &TextEdit> {
        self.entries.iter().filter_map(|e| e.edit.as_ref())
    }

    pub fn selections(&self) -> Vec<Selection> {
        self.entries.iter().map(|e| e.selection).collect()
    }

    /// True when nothing in the document changes (selections may still move).
    pub fn is_noop(&self) -> bool {
        self.edits().next().is_none()
    }

    /// Apply every edit of the batch to `doc` as one delta.
    pub fn apply(&self, doc: &TextDocument) -> Result<TextDocument, EditError> {
        let edits: Vec<TextEdit> = self.edits().cloned().collect();
        apply_edits(doc, &edits)
    }
}

/// Compile a set of non-overlapping edits into a single delta and apply it.
pub fn apply_edits(doc: &TextDocument, edits: &[TextEdit]) -> Result<TextDocument, EditError> {
    let line_count = doc.line_count();
    let mut spans = Vec::with_capacity(edits.len());
    for edit in edits {
        for pos in [edit.range.start, edit.range.end] {
            if pos.line >= line_count {
                return Err(EditError::OutOfRange {
                    line: pos.line,
                    line_count,
                });
            }
        }
        let start = doc.offset_at(edit.range.start);
        let end = doc.offset_at(edit.range.end);
        spans.push((start..end, edit.range.start, edit.new_text.as_str()));
    }
    // Stable sort keeps insertions at the same offset in input order
    spans.sort_by_key(|(span, _, _)| span.start);

    let mut builder = Builder::new(doc.len());
    let mut last_end = 0;
    for (span, at, text) in spans {
        if span.start < last_end {
            return Err(EditError::Overlapping { at });
        }
        last_end = span.end;
        builder.replace(span, Rope::from(text));
    }
    let delta = builder.build();
    log::debug!("applying {} edits as one delta", edits.len());

    Ok(TextDocument::from_rope(delta.apply(&doc.buffer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(line: usize, character: usize) -> Position {
        Position::new(line, character)
    }

    #[test]
    fn edits_are_applied_in_original_coordinates() {
        let doc = TextDocument::from_text("one two\nthree");
        let edits = vec![
            TextEdit::replace(Range::new(pos(0, 4), pos(0, 7)), "**two**"),
            TextEdit::replace(Range::new(pos(0, 0), pos(0, 3)), "**one**"),
            TextEdit::insert(pos(1, 5), "!"),
        ];

        let result = apply_edits(&doc, &edits).unwrap();
        assert_eq!(result.text(), "**one** **two**\nthree!");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let doc = TextDocument::from_text("abcdef");
        let edits = vec![
            TextEdit::delete(Range::new(pos(0, 0), pos(0, 4))),
            TextEdit::delete(Range::new(pos(0, 2), pos(0, 5))),
        ];

        assert_eq!(
            apply_edits(&doc, &edits).unwrap_err(),
            EditError::Overlapping { at: pos(0, 2) }
        );
    }

    #[test]
    fn edits_past_the_last_line_are_rejected() {
        let doc = TextDocument::from_text("abc");
        let edits = vec![TextEdit::insert(pos(3, 0), "x")];

        assert!(matches!(
            apply_edits(&doc, &edits),
            Err(EditError::OutOfRange { line: 3, .. })
        ));
    }

    #[test]
    fn empty_batch_leaves_text_untouched() {
        let doc = TextDocument::from_text("unchanged");
        let mut batch = EditBatch::default();
        batch.push(None, Selection::cursor(pos(0, 2)));

        assert!(batch.is_noop());
        assert_eq!(batch.apply(&doc).unwrap().text(), "unchanged");
    }
}
