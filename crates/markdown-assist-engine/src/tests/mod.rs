use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::editing::{Position, Selection, TextDocument};

/// Create a temporary directory for test files
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content, creating parent directories as needed
pub fn create_test_file(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Parse text with selection markers into a document and its selections.
///
/// `|` marks a cursor, `«` and `»` mark the start and end of a selection.
pub fn marked(src: &str) -> (TextDocument, Vec<Selection>) {
    let mut text = String::new();
    let mut selections = Vec::new();
    let mut open = None;
    let (mut line, mut character) = (0, 0);

    for ch in src.chars() {
        let here = Position::new(line, character);
        match ch {
            '|' => selections.push(Selection::cursor(here)),
            '«' => open = Some(here),
            '»' => {
                let start = open.take().expect("unbalanced selection markers");
                selections.push(Selection::new(start, here));
            }
            '\n' => {
                text.push(ch);
                line += 1;
                character = 0;
            }
            _ => {
                text.push(ch);
                character += ch.len_utf16();
            }
        }
    }

    (TextDocument::from_text(&text), selections)
}

/// Inverse of [`marked`]: render a document with its selections.
pub fn render(doc: &TextDocument, selections: &[Selection]) -> String {
    let mut marks: Vec<(usize, char)> = Vec::new();
    for selection in selections {
        if selection.is_empty() {
            marks.push((doc.offset_at(selection.active), '|'));
        } else {
            marks.push((doc.offset_at(selection.start()), '«'));
            marks.push((doc.offset_at(selection.end()), '»'));
        }
    }
    marks.sort_by(|a, b| b.0.cmp(&a.0));

    let mut text = doc.text();
    for (offset, mark) in marks {
        text.insert(offset, mark);
    }
    text
}
