/*!
 * # Editing Core Module
 *
 * Formatting commands computed against immutable document snapshots.
 *
 * ## Architecture Overview
 *
 * ### 1. Snapshots in, edit batches out
 * - The host hands over a **`TextDocument`** (text + line index) and its selections
 * - Nothing here holds a live editor handle or mutates the host buffer
 * - Every command returns an **`EditBatch`**: one optional `TextEdit` plus the
 *   post-edit selection for each input selection
 *
 * ### 2. Command-Based Editing
 * - All formatting actions are represented as **Commands** (`Cmd` enum)
 * - `compile_command` turns a command into a batch, or `None` when the command
 *   does not apply (and the host should fall back to its default behaviour)
 *
 * ### 3. Atomic application
 * - Edits of a batch are expressed in the coordinates of the original snapshot
 * - `EditBatch::apply` compiles them into a single xi-rope `Delta`, which is how
 *   hosts without their own atomic edit API (and the tests) apply a batch
 *
 * ## Module Structure
 *
 * - **`document`**: `TextDocument`, `Position`, `Range`, `Selection` (UTF-16 columns)
 * - **`patch`**: `TextEdit`, `EditBatch` and delta application
 * - **`style`**: inline style toggling with multi-selection shift bookkeeping
 * - **`math`**: the `$`/`$$` math block cycle
 * - **`links`**: URL detection for paste-as-link
 * - **`commands`**: `Cmd` enum, heading/list toggles and command compilation
 *
 * ## Usage Pattern
 *
 * ```rust
 * use markdown_assist_engine::editing::*;
 *
 * let doc = TextDocument::from_text("say hello world");
 * let cursor = Selection::cursor(Position::new(0, 6));
 *
 * let batch = compile_command(&doc, &[cursor], &Cmd::ToggleBold).unwrap();
 * let edited = batch.apply(&doc).unwrap();
 *
 * assert_eq!(edited.text(), "say **hello** world");
 * assert_eq!(batch.selections(), vec![Selection::cursor(Position::new(0, 8))]);
 * ```
 */

// Module exports
pub mod commands;
pub mod document;
pub mod links;
pub mod math;
pub mod patch;
pub mod style;

// Public API re-exports
pub use commands::{Cmd, compile_command};
pub use document::{Position, Range, Selection, TextDocument};
pub use links::{is_single_link, paste_link};
pub use math::{MathState, toggle_math};
pub use patch::{EditBatch, EditError, SelectionEdit, TextEdit, apply_edits};
pub use style::{DelimiterPair, WrapContext, classify, toggle_style};
