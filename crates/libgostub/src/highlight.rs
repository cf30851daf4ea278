//! Syntax highlighting functionality for Go stub output.

use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};

use crate::error::{Result, StubError};

/// Lazily loaded syntect syntax definitions including newline handling.
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
/// Shared theme catalog for syntax highlighting.
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);
/// Cached lookup for the Go syntax definition.
static GO_SYNTAX: Lazy<Option<&'static SyntaxReference>> =
    Lazy::new(|| SYNTAX_SET.find_syntax_by_extension("go"));
/// Reference to the Solarized (dark) theme used for highlighting output.
static SOLARIZED_THEME: Lazy<Option<&'static Theme>> =
    Lazy::new(|| THEME_SET.themes.get("Solarized (dark)"));

/// Applies syntax highlighting to Go code using the Solarized (dark) theme.
///
/// # Arguments
/// * `code` - The Go code to highlight
///
/// # Returns
/// A string with ANSI escape codes for terminal color output
pub fn highlight_code(code: &str) -> Result<String> {
    let syntax = (*GO_SYNTAX)
        .ok_or_else(|| StubError::Highlight("Go syntax not found".to_string()))?;
    let theme = (*SOLARIZED_THEME)
        .ok_or_else(|| StubError::Highlight("Solarized (dark) theme not found".to_string()))?;
    let mut h = HighlightLines::new(syntax, theme);

    let mut output = String::new();
    for line in LinesWithEndings::from(code) {
        let ranges: Vec<(Style, &str)> = h.highlight_line(line, &SYNTAX_SET)?;
        let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
        output.push_str(&escaped);
    }

    Ok(output)
}
