use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// `[text](target)` and `[text][ref]`, reduced to `text` before slugging.
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\](?:\([^)]*\)|\[[^\]]*\])").unwrap());

/// Converts heading text to the anchor id used in links and exported HTML.
///
/// Links are reduced to their text, the result is lowercased, everything
/// except alphanumerics, `_`, `-` and whitespace is dropped, and each run of
/// whitespace becomes a single `-`.
///
/// ```
/// use markdown_assist_engine::toc::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("See [the docs](https://example.com)!"), "see-the-docs");
/// ```
pub fn slugify(text: &str) -> String {
    let text = LINK.replace_all(text, "$1").to_lowercase();
    let kept: String = text
        .chars()
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            in_space = false;
            slug.push(c);
        }
    }
    slug
}

/// Hands out unique slugs within one document: `slug`, `slug-1`, `slug-2`, ...
///
/// Create one per TOC build or HTML render; never share one across documents.
#[derive(Debug, Default)]
pub struct SlugCounter {
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `text`, in document order.
    ///
    /// A generated `slug-N` is itself reserved, so a later heading whose own
    /// slug is `slug-N` gets a fresh suffix.
    pub fn next(&mut self, text: &str) -> String {
        let base = slugify(text);
        if !self.seen.contains_key(&base) {
            self.seen.insert(base.clone(), 0);
            return base;
        }
        loop {
            let count = self.seen.entry(base.clone()).or_default();
            *count += 1;
            let candidate = format!("{base}-{count}");
            if !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Hello World", "hello-world")]
    #[case("API Reference (v2)", "api-reference-v2")]
    #[case("run `cargo test`", "run-cargo-test")]
    #[case("a   b", "a-b")]
    #[case("snake_case and kebab-case", "snake_case-and-kebab-case")]
    #[case("Ünïcödé Überschrift", "ünïcödé-überschrift")]
    #[case("[Link](http://x.y) and [ref][1]", "link-and-ref")]
    #[case("中文 标题", "中文-标题")]
    #[case("What?!", "what")]
    #[case("Tom & Jerry", "tom-jerry")]
    #[case("Q & A: part 1", "q-a-part-1")]
    fn slugify_cases(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(slugify(text), expected);
    }

    #[test]
    fn counter_deduplicates_in_order() {
        let mut counter = SlugCounter::new();
        let slugs: Vec<String> = ["Intro", "Usage", "Intro", "intro!", "Usage"]
            .iter()
            .map(|t| counter.next(t))
            .collect();

        assert_eq!(slugs, vec!["intro", "usage", "intro-1", "intro-2", "usage-1"]);
    }

    #[test]
    fn counter_never_repeats_a_generated_suffix() {
        let mut counter = SlugCounter::new();
        let slugs: Vec<String> = ["A", "A", "A-1", "A"]
            .iter()
            .map(|t| counter.next(t))
            .collect();

        assert_eq!(slugs, vec!["a", "a-1", "a-1-1", "a-2"]);
    }

    #[test]
    fn counter_skips_slugs_taken_by_earlier_headings() {
        let mut counter = SlugCounter::new();
        let slugs: Vec<String> = ["Intro 1", "Intro", "Intro"]
            .iter()
            .map(|t| counter.next(t))
            .collect();

        assert_eq!(slugs, vec!["intro-1", "intro", "intro-2"]);
    }

    #[test]
    fn fresh_counters_do_not_share_state() {
        let mut first = SlugCounter::new();
        first.next("Title");
        let mut second = SlugCounter::new();
        assert_eq!(second.next("Title"), "title");
    }
}
