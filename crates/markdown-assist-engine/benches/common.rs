// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **bold** and *italic* words.\n\n- Bullet point\n  - Nested item\n- [ ] Task item\n\n```rust\nfn example() {}\n```\n\n";
    base.repeat(size)
}

/// One cursor inside a word on every paragraph line of `generate_markdown_content`.
#[allow(dead_code)]
pub fn paragraph_cursors(size: usize) -> Vec<markdown_assist_engine::Selection> {
    (0..size)
        .map(|i| {
            markdown_assist_engine::Selection::cursor(markdown_assist_engine::Position::new(
                i * 14 + 4,
                2,
            ))
        })
        .collect()
}
