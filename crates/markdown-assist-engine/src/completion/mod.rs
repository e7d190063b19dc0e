//! Context-sensitive completion: image paths, KaTeX commands, reference
//! link labels and heading anchors.
//!
//! The context is decided from the line text before the cursor, checked in
//! that order; the first matching context wins even when it yields nothing.

mod math;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::editing::document::{byte_to_utf16, utf16_len};
use crate::editing::{Position, Range, TextDocument};
use crate::io::scan_files;
use crate::toc::build_toc;

pub use math::math_completions;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "gif"];
const SKIPPED_DIRS: &[&str] = &["node_modules"];

static IMAGE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*?\]\([^)]*$").unwrap());
static IMAGE_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*?\]\(([^)]*?)[\\/]?[^\\/)]*$").unwrap());
static TRAILING_BACKSLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+$").unwrap());
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^$])\$(|[^ $].*)\\\w*$").unwrap());
static REFERENCE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*?\]\[[^\]]*$").unwrap());
static REFERENCE_USAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]\[([^\]]*?)\]").unwrap());
static REFERENCE_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]*?)\]: (\S*)( .*)?").unwrap());
static ANCHOR_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\(#[^)]*$").unwrap());
static CLOSING_PAREN_AHEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^) ]+\s*|\s*)\)").unwrap());

/// What the provider knows about the document beyond its text.
#[derive(Debug, Clone, Default)]
pub struct CompletionContext {
    /// Directory of the document on disk; image completion needs it.
    pub doc_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Function,
    Snippet,
    File,
    Reference,
}

/// Text inserted when an item is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "value", rename_all = "lowercase")]
pub enum InsertText {
    Plain(String),
    /// Editor snippet syntax (`$1`, `${1|a,b|}`).
    Snippet(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    /// `None` inserts the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<InsertText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Text replaced on accept; `None` lets the host use the word range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            insert_text: None,
            sort_text: None,
            detail: None,
            documentation: None,
            range: None,
        }
    }

    pub fn with_insert_text(mut self, insert_text: InsertText) -> Self {
        self.insert_text = Some(insert_text);
        self
    }
}

/// Completion items for `position` in `doc`.
pub fn complete(
    doc: &TextDocument,
    position: Position,
    context: &CompletionContext,
) -> Vec<CompletionItem> {
    let position = doc.clamp(position);
    let line = doc.line_text(position.line);
    let split = doc.offset_at(position) - doc.offset_at(Position::new(position.line, 0));
    let (before, after) = line.split_at(split);

    if IMAGE_LINK.is_match(before) {
        log::debug!("completing image paths");
        return match &context.doc_dir {
            Some(doc_dir) => image_completions(doc_dir, before),
            None => Vec::new(),
        };
    }

    if let Some(m) = TRAILING_BACKSLASHES.find(before)
        && m.as_str().len() % 2 == 1
    {
        log::debug!("completing math commands");
        return if in_math(doc, position, before, after) {
            math_completions().to_vec()
        } else {
            Vec::new()
        };
    }

    if REFERENCE_LINK.is_match(before) {
        log::debug!("completing reference labels");
        return reference_completions(doc, position, before);
    }

    if ANCHOR_LINK.is_match(before) {
        log::debug!("completing heading anchors");
        return anchor_completions(doc, position, before, after);
    }

    Vec::new()
}

/// Inline `$...\` with a closing `$` later on the line, or inside a `$$` block.
fn in_math(doc: &TextDocument, position: Position, before: &str, after: &str) -> bool {
    if INLINE_MATH.is_match(before) && after.contains('$') {
        return true;
    }
    let text = doc.text();
    let (text_before, text_after) = text.split_at(doc.offset_at(position));
    text_before.matches("$$").count() % 2 == 1 && text_after.contains("$$")
}

fn image_completions(doc_dir: &Path, before: &str) -> Vec<CompletionItem> {
    let typed_dir = IMAGE_DIR
        .captures(before)
        .and_then(|caps| caps.get(1))
        .map_or(String::new(), |m| m.as_str().replace('\\', "/"));
    let base = doc_dir.join(&typed_dir);

    let files = match scan_files(&base, IMAGE_EXTENSIONS, SKIPPED_DIRS) {
        Ok(files) => files,
        Err(err) => {
            log::debug!("no image completions below {}: {err}", base.display());
            return Vec::new();
        }
    };

    files
        .iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(&base).ok()?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let mut item =
                CompletionItem::new(relative.replace(' ', "&#32;"), CompletionKind::File);
            item.documentation = Some(format!(
                "![{relative}]({})",
                file.display().to_string().replace(' ', "&#32;")
            ));
            Some(item)
        })
        .collect()
}

fn reference_completions(
    doc: &TextDocument,
    position: Position,
    before: &str,
) -> Vec<CompletionItem> {
    let start = before.rfind('[').map_or(0, |i| byte_to_utf16(before, i) + 1);
    let range = Range::new(position.with_character(start), position);

    let mut usages: HashMap<&str, usize> = HashMap::new();
    for (_, line) in doc.lines() {
        for caps in REFERENCE_USAGE.captures_iter(line) {
            if let Some(label) = caps.get(1) {
                *usages.entry(label.as_str()).or_default() += 1;
            }
        }
    }

    doc.lines()
        .filter_map(|(_, line)| REFERENCE_DEFINITION.captures(line))
        .map(|caps| {
            let label = caps.get(1).map_or("", |m| m.as_str());
            let target = caps.get(2).map_or("", |m| m.as_str());
            let count = usages.get(label).copied().unwrap_or(0);

            let mut item = CompletionItem::new(label, CompletionKind::Reference);
            item.documentation = Some(target.to_string());
            item.detail = Some(if count == 1 {
                "1 usage".to_string()
            } else {
                format!("{count} usages")
            });
            // Unused labels first
            item.sort_text = Some(format!("{}-{label}", if count == 0 { 0 } else { 1 }));
            item.range = Some(range);
            item
        })
        .collect()
}

fn anchor_completions(
    doc: &TextDocument,
    position: Position,
    before: &str,
    after: &str,
) -> Vec<CompletionItem> {
    let start = before.rfind('(').map_or(0, |i| byte_to_utf16(before, i) + 1);

    // Replace up to a closing paren when only one token sits before it,
    // otherwise replace the token under the cursor and close the link.
    let (end, close_paren) = match after.find(')') {
        Some(paren) if CLOSING_PAREN_AHEAD.is_match(after) => {
            (position.character + byte_to_utf16(after, paren), false)
        }
        _ => {
            let token = after.split(char::is_whitespace).next().unwrap_or("");
            (position.character + utf16_len(token), true)
        }
    };
    let range = Range::new(position.with_character(start), position.with_character(end));

    build_toc(doc)
        .into_iter()
        .map(|entry| {
            let label = format!("#{}", entry.slug);
            let mut item = CompletionItem::new(label.clone(), CompletionKind::Reference);
            if close_paren {
                item.insert_text = Some(InsertText::Plain(format!("{label})")));
            }
            item.documentation = Some(entry.text);
            item.range = Some(range);
            item
        })
        .collect()
}
