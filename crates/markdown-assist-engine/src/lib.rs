pub mod completion;
pub mod editing;
pub mod export;
pub mod io;
pub mod toc;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use completion::{CompletionContext, CompletionItem, CompletionKind, InsertText, complete};
pub use editing::*;
pub use export::{ExportError, ExportOptions, ImageMode, export_html, print_to_html};
pub use io::*;
pub use toc::{SlugCounter, TocEntry, TocOptions, build_toc, render_toc, slugify, update_toc};
