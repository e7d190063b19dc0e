//! Table of contents generation for markdown documents.
//!
//! - Scans ATX headings, skipping fenced code and YAML front matter
//! - Assigns de-duplicated anchor slugs in document order
//! - Renders the TOC as a markdown list and keeps it up to date between
//!   `<!-- toc -->` / `<!-- /toc -->` markers

mod slug;

use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::editing::{Position, Range, TextDocument, TextEdit};

pub use slug::{SlugCounter, slugify};

pub const TOC_START: &str = "<!-- toc -->";
pub const TOC_END: &str = "<!-- /toc -->";
const OMIT_MARKER: &str = "<!-- omit in toc -->";

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*))?$").unwrap());

/// One heading of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub text: String,
    pub level: u8,
    pub line: usize,
    pub slug: String,
}

/// How the TOC list is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocOptions {
    /// Heading levels that make it into the list.
    pub levels: RangeInclusive<u8>,
    pub ordered_list: bool,
    /// Plain heading text instead of `[text](#slug)` links.
    pub plaintext: bool,
    /// Spaces per nesting level.
    pub tab_size: usize,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            levels: 1..=6,
            ordered_list: false,
            plaintext: false,
            tab_size: 2,
        }
    }
}

/// Indicates the type of code block fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Backticks,
    Tildes,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if line.len() - trimmed.len() > 3 {
            return None;
        }
        if trimmed.starts_with("```") {
            Some(Fence::Backticks)
        } else if trimmed.starts_with("~~~") {
            Some(Fence::Tildes)
        } else {
            None
        }
    }
}

/// Line index just past YAML front matter, or 0 when there is none.
fn front_matter_end(doc: &TextDocument) -> usize {
    if doc.line_text(0).trim_end() != "---" {
        return 0;
    }
    doc.lines()
        .skip(1)
        .find(|(_, text)| matches!(text.trim_end(), "---" | "..."))
        .map_or(0, |(line, _)| line + 1)
}

/// Heading level and cleaned text of an ATX heading line.
fn parse_heading(line: &str) -> Option<(u8, String)> {
    let caps = ATX_HEADING.captures(line)?;
    let level = caps[1].len() as u8;
    let mut text = caps.get(2).map_or("", |m| m.as_str()).trim();

    // Closing sequence only counts when separated by whitespace
    let without_closing = text.trim_end_matches('#');
    if without_closing.len() != text.len()
        && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
    {
        text = without_closing.trim_end();
    }
    Some((level, text.to_string()))
}

/// All ATX headings of `doc` with unique slugs, in document order.
///
/// Headings carrying `<!-- omit in toc -->` (at the end of the line or on
/// the line above) are left out.
pub fn build_toc(doc: &TextDocument) -> Vec<TocEntry> {
    let mut counter = SlugCounter::new();
    let mut fence = None;
    let mut entries = Vec::new();
    let mut previous = "";

    for (line, text) in doc.lines().skip(front_matter_end(doc)) {
        let prev_line = std::mem::replace(&mut previous, text);
        match fence {
            Some(kind) => {
                if Fence::open(text) == Some(kind) {
                    fence = None;
                }
                continue;
            }
            None => {
                if let Some(kind) = Fence::open(text) {
                    fence = Some(kind);
                    continue;
                }
            }
        }

        let Some((level, heading)) = parse_heading(text) else {
            continue;
        };
        let (heading, omitted) = match heading.strip_suffix(OMIT_MARKER) {
            Some(rest) => (rest.trim_end().to_string(), true),
            None => (heading, prev_line.trim() == OMIT_MARKER),
        };
        if omitted {
            log::debug!("line {line}: heading omitted from toc");
            continue;
        }

        entries.push(TocEntry {
            slug: counter.next(&heading),
            text: heading,
            level,
            line,
        });
    }
    entries
}

/// Render `entries` as a markdown list, without a trailing newline.
///
/// Nesting is relative to the shallowest heading that is rendered.
pub fn render_toc(entries: &[TocEntry], options: &TocOptions) -> String {
    let visible: Vec<&TocEntry> = entries
        .iter()
        .filter(|e| options.levels.contains(&e.level))
        .collect();
    let Some(top) = visible.iter().map(|e| e.level).min() else {
        return String::new();
    };

    visible
        .iter()
        .map(|entry| {
            let indent = " ".repeat(options.tab_size * usize::from(entry.level - top));
            let bullet = if options.ordered_list { "1." } else { "-" };
            if options.plaintext {
                format!("{indent}{bullet} {}", entry.text)
            } else {
                format!("{indent}{bullet} [{}](#{})", entry.text, entry.slug)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where the marked TOC block sits: the lines holding the two markers.
fn find_toc_markers(doc: &TextDocument) -> Option<(usize, usize)> {
    let mut start = None;
    for (line, text) in doc.lines() {
        match text.trim() {
            TOC_START => start = Some(line),
            TOC_END => {
                if let Some(start) = start {
                    return Some((start, line));
                }
            }
            _ => {}
        }
    }
    None
}

/// Refresh the marked TOC block, or insert a new one at `cursor`.
///
/// Returns `None` when an existing block is already up to date.
pub fn update_toc(doc: &TextDocument, options: &TocOptions, cursor: Position) -> Option<TextEdit> {
    let list = render_toc(&build_toc(doc), options);
    let body = if list.is_empty() {
        "\n\n".to_string()
    } else {
        format!("\n\n{list}\n\n")
    };

    match find_toc_markers(doc) {
        Some((start, end)) => {
            let range = Range::new(
                Position::new(start, doc.line_len(start)),
                Position::new(end, 0),
            );
            if doc.text_in(range) == body {
                return None;
            }
            log::debug!("refreshing toc between lines {start} and {end}");
            Some(TextEdit::replace(range, body))
        }
        None => {
            let cursor = doc.clamp(cursor);
            log::debug!("inserting toc at {cursor:?}");
            Some(TextEdit::insert(cursor, format!("{TOC_START}{body}{TOC_END}")))
        }
    }
}
