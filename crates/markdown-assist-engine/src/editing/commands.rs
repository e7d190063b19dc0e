use crate::editing::document::{byte_to_utf16, utf16_len};
use crate::editing::{
    DelimiterPair, EditBatch, Position, Range, Selection, TextDocument, TextEdit, links, math,
    toggle_style,
};

/// Formatting commands a host can bind to keys or menu entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    ToggleBold,
    ToggleItalic { indicator: String },
    ToggleCodeSpan,
    ToggleStrikethrough,
    ToggleMath { reverse: bool },
    ToggleHeadingUp,
    ToggleHeadingDown,
    ToggleUnorderedList,
    PasteLink { clipboard: String },
}

/// Compile a command against a snapshot.
///
/// `None` means the command does not apply here and the host should do
/// whatever it would have done without it (plain paste, nothing at all).
pub fn compile_command(doc: &TextDocument, selections: &[Selection], cmd: &Cmd) -> Option<EditBatch> {
    log::debug!("compiling {cmd:?} for {} selections", selections.len());
    match cmd {
        Cmd::ToggleBold => Some(toggle_style(doc, selections, &DelimiterPair::bold())),
        Cmd::ToggleItalic { indicator } => Some(toggle_style(
            doc,
            selections,
            &DelimiterPair::italic(indicator),
        )),
        Cmd::ToggleCodeSpan => Some(toggle_style(doc, selections, &DelimiterPair::code_span())),
        Cmd::ToggleStrikethrough => Some(toggle_style(
            doc,
            selections,
            &DelimiterPair::strikethrough(),
        )),
        Cmd::ToggleMath { reverse } => math::toggle_math(doc, selections, *reverse),
        Cmd::ToggleHeadingUp => heading_up(doc, selections),
        Cmd::ToggleHeadingDown => heading_down(doc, selections),
        Cmd::ToggleUnorderedList => cycle_list_marker(doc, selections),
        Cmd::PasteLink { clipboard } => links::paste_link(doc, selections, clipboard),
    }
}

fn heading_up(doc: &TextDocument, selections: &[Selection]) -> Option<EditBatch> {
    let line = doc.clamp(selections.first()?.active).line;
    let text = doc.line_text(line);
    let insert = if !text.starts_with('#') {
        "# "
    } else if !text.starts_with("######") {
        "#"
    } else {
        return None;
    };
    let edit = TextEdit::insert(Position::new(line, 0), insert);
    Some(shift_line(selections, edit, utf16_len(insert) as isize))
}

fn heading_down(doc: &TextDocument, selections: &[Selection]) -> Option<EditBatch> {
    let line = doc.clamp(selections.first()?.active).line;
    let text = doc.line_text(line);
    let width = if text.starts_with("# ") {
        2
    } else if text.starts_with('#') {
        1
    } else {
        return None;
    };
    let edit = TextEdit::delete(Range::new(
        Position::new(line, 0),
        Position::new(line, width),
    ));
    Some(shift_line(selections, edit, -(width as isize)))
}

/// One edit at the start of a line; every selection endpoint on that line moves
/// with it, the others stay where they are.
fn shift_line(selections: &[Selection], edit: TextEdit, delta: isize) -> EditBatch {
    let line = edit.range.start.line;
    let mv = |p: Position| {
        if p.line == line {
            p.offset_by(delta)
        } else {
            p
        }
    };
    let mut batch = EditBatch::default();
    let mut edit = Some(edit);
    for sel in selections {
        batch.push(edit.take(), Selection::new(mv(sel.anchor), mv(sel.active)));
    }
    batch
}

/// `-` becomes `*`, `*` becomes `+`, `+` is removed, and a bare cursor gets `- `.
fn cycle_list_marker(doc: &TextDocument, selections: &[Selection]) -> Option<EditBatch> {
    let primary = selections.first()?;
    if !primary.is_empty() {
        return None;
    }
    let cursor = doc.clamp(primary.active);
    let before = doc.slice_line(cursor.line, 0, cursor.character);
    let trimmed = before.trim();

    let (edit, new_cursor) = match trimmed {
        "" => (TextEdit::insert(cursor, "- "), cursor.offset_by(2)),
        "-" | "*" | "+" => {
            let byte = before.find(trimmed).unwrap_or(0);
            let marker_at = cursor.with_character(byte_to_utf16(before, byte));
            let range = Range::new(marker_at, cursor);
            if trimmed == "+" {
                (TextEdit::delete(range), marker_at)
            } else {
                let next = if trimmed == "-" { "*" } else { "+" };
                let pad = cursor.character - marker_at.character - 1;
                (
                    TextEdit::replace(range, format!("{next}{}", " ".repeat(pad))),
                    cursor,
                )
            }
        }
        _ => return None,
    };

    let mut batch = EditBatch::default();
    batch.push(Some(edit), Selection::cursor(new_cursor));
    Some(batch)
}
