//! Standalone HTML export.
//!
//! Renders the document with pulldown-cmark, gives every heading an anchor id
//! matching the table of contents, rewrites image sources and wraps the body
//! in a page that links the KaTeX, markdown and highlight stylesheets.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};

use crate::editing::TextDocument;
use crate::io::{IoError, read_bytes, read_file, write_file};
use crate::toc::SlugCounter;

const KATEX_CSS: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css" crossorigin="anonymous">"#;
const MARKDOWN_CSS: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/gh/Microsoft/vscode/extensions/markdown-language-features/media/markdown.css">"#;
const HIGHLIGHT_CSS: &str = r#"<link rel="stylesheet" href="https://cdn.jsdelivr.net/gh/Microsoft/vscode/extensions/markdown-language-features/media/highlight.css">"#;

/// Characters escaped when a filesystem path becomes a `file://` URI.
const URI_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(<img[^>]+src=")([^"]+)("[^>]*>)"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("Cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How `<img src>` values end up in the exported page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Leave sources as written.
    Keep,
    /// Resolve relative sources against the document and emit `file://` URIs.
    #[default]
    Absolute,
    /// Inline local images as `data:` URIs.
    Base64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportOptions {
    /// Render soft line breaks as `<br />`.
    pub breaks: bool,
    pub image_mode: ImageMode,
    /// Extra stylesheets: http(s) URLs are linked, local files inlined.
    pub styles: Vec<String>,
    pub font_family: String,
    /// Pixels; 0 leaves the stylesheet default.
    pub font_size: u32,
    /// 0 leaves the stylesheet default.
    pub line_height: f64,
}

/// Render `doc` (stored at `source_path`) to a complete HTML page.
pub fn export_html(
    doc: &TextDocument,
    source_path: &Path,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let source = std::path::absolute(source_path).map_err(|source| ExportError::Resolve {
        path: source_path.to_path_buf(),
        source,
    })?;
    let doc_dir = source.parent().unwrap_or(Path::new("/"));
    let text = doc.text();

    let body = render_body(&text, options.breaks);
    let body = rewrite_images(&body, doc_dir, options.image_mode);
    let title = title(&text).unwrap_or_default();
    let styles = styles(options, doc_dir);

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta http-equiv="Content-type" content="text/html;charset=UTF-8">
<title>{title}</title>
{styles}
</head>
<body>
{body}
</body>
</html>
"#
    ))
}

/// Export the markdown file at `source_path` next to it, with an `.html`
/// extension. Returns the path written.
pub fn print_to_html(source_path: &Path, options: &ExportOptions) -> Result<PathBuf, ExportError> {
    let text = read_file(source_path)?;
    let doc = TextDocument::from_text(&text);
    let html = export_html(&doc, source_path, options)?;

    let out_path = source_path.with_extension("html");
    write_file(&out_path, &html)?;
    log::info!("exported {} to {}", source_path.display(), out_path.display());
    Ok(out_path)
}

fn pulldown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Markdown body to HTML, headings carrying de-duplicated slug ids.
fn render_body(text: &str, breaks: bool) -> String {
    let events: Vec<Event> = Parser::new_ext(text, pulldown_options()).collect();
    let mut counter = SlugCounter::new();
    let mut processed = Vec::with_capacity(events.len());

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                // An explicit `{#id}` wins over the generated slug
                let id = match id {
                    Some(id) => id.clone(),
                    None => counter.next(&heading_text(&events[i + 1..])).into(),
                };
                processed.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(id),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            Event::SoftBreak if breaks => processed.push(Event::HardBreak),
            _ => processed.push(event.clone()),
        }
    }

    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, processed.into_iter());
    html
}

/// Plain text of the heading whose content starts at `events[0]`.
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => text.push_str(t),
            Event::End(TagEnd::Heading(_)) => break,
            _ => {}
        }
    }
    text
}

/// First line starting with `#`, without its `#` runs, HTML-escaped.
fn title(text: &str) -> Option<String> {
    let line = text.lines().find(|line| line.starts_with('#'))?;
    let title = line.trim_start_matches('#').trim_end_matches('#').trim();
    Some(html_escape::encode_text(title).into_owned())
}

fn is_web_url(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let sep = if path.starts_with('/') { "" } else { "/" };
    format!("file://{sep}{}", utf8_percent_encode(&path, URI_PATH))
}

/// Local path an image source refers to, or `None` for web and data URLs.
fn local_image_path(doc_dir: &Path, src: &str) -> Option<PathBuf> {
    if is_web_url(src) || src.starts_with("data:") {
        return None;
    }
    let decoded = percent_decode_str(src).decode_utf8_lossy();
    if let Some(rest) = decoded.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    Some(doc_dir.join(decoded.as_ref()))
}

fn rewrite_images(body: &str, doc_dir: &Path, mode: ImageMode) -> String {
    if mode == ImageMode::Keep {
        return body.to_string();
    }

    IMG_SRC
        .replace_all(body, |caps: &Captures| {
            let src = &caps[2];
            let new_src = match mode {
                ImageMode::Base64 => inline_image(doc_dir, src),
                _ => absolute_src(doc_dir, src),
            };
            format!("{}{new_src}{}", &caps[1], &caps[3])
        })
        .into_owned()
}

fn absolute_src(doc_dir: &Path, src: &str) -> String {
    let decoded = percent_decode_str(src).decode_utf8_lossy();
    if is_web_url(src)
        || src.starts_with("data:")
        || src.starts_with("file:")
        || Path::new(decoded.as_ref()).is_absolute()
    {
        return src.to_string();
    }
    file_uri(&doc_dir.join(decoded.as_ref()))
}

fn inline_image(doc_dir: &Path, src: &str) -> String {
    let Some(path) = local_image_path(doc_dir, src) else {
        return src.to_string();
    };
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match read_bytes(&path) {
        Ok(bytes) => format!("data:image/{ext};base64,{}", STANDARD.encode(bytes)),
        Err(err) => {
            log::warn!(
                "unable to read {}: {err}, reverting to the image path",
                path.display()
            );
            file_uri(&path)
        }
    }
}

fn styles(options: &ExportOptions, doc_dir: &Path) -> String {
    let mut out = [KATEX_CSS, MARKDOWN_CSS, HIGHLIGHT_CSS].join("\n");

    if let Some(settings) = setting_styles(options) {
        out.push('\n');
        out.push_str(&settings);
    }

    for style in &options.styles {
        if is_web_url(style) {
            let _ = write!(out, "\n<link rel=\"stylesheet\" href=\"{style}\">");
            continue;
        }
        let path = doc_dir.join(style);
        match read_file(&path) {
            Ok(css) => {
                let _ = write!(out, "\n<style>\n{}\n</style>", WHITESPACE.replace_all(&css, " "));
            }
            Err(err) => log::warn!("custom style {} not found: {err}", path.display()),
        }
    }
    out
}

/// Font settings as a `body` rule, `None` when all are unset.
fn setting_styles(options: &ExportOptions) -> Option<String> {
    let mut rules = Vec::new();
    if !options.font_family.is_empty() {
        rules.push(format!("font-family: {};", options.font_family));
    }
    if options.font_size > 0 {
        rules.push(format!("font-size: {}px;", options.font_size));
    }
    if options.line_height > 0.0 {
        rules.push(format!("line-height: {};", options.line_height));
    }
    if rules.is_empty() {
        return None;
    }
    Some(format!("<style>\nbody {{\n  {}\n}}\n</style>", rules.join("\n  ")))
}
