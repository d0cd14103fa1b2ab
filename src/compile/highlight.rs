//! Class-based syntax highlighting for fenced code blocks.
//!
//! Emits span-per-token HTML with scope classes so themes stay a pure
//! stylesheet concern. The syntax set is expensive to load and is built
//! exactly once, shared across all compilation threads.

use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlight `source` for `lang`, returning span-wrapped HTML.
///
/// Unknown languages and generator failures return `None`; the caller
/// keeps the escaped plain text in that case.
pub fn highlight(source: &str, lang: &str) -> Option<String> {
    let syntax = SYNTAXES.find_syntax_by_token(lang)?;

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
    for line in LinesWithEndings::from(source) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }
    Some(generator.finalize())
}
