//! Text statistics and plain-text editing helpers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Counts shown in the editor status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    pub lines: usize,
    pub chars: usize,
}

impl TextStats {
    pub fn of(content: &str) -> Self {
        Self {
            words: content.split_whitespace().count(),
            lines: content.split('\n').count(),
            chars: content.chars().count(),
        }
    }
}

/// 1-based line and column of a character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    /// Position of `offset` (in chars, clamped to the content length).
    pub fn at(content: &str, offset: usize) -> Self {
        let before: String = content.chars().take(offset).collect();
        let line = before.split('\n').count();
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Self { line, column }
    }
}

/// Char offset of the first case-insensitive match of `term`.
pub fn find(content: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    let haystack = content.to_lowercase();
    let needle = term.to_lowercase();
    // Lowercasing can change byte lengths, so map back through chars.
    let byte_idx = haystack.find(&needle)?;
    Some(haystack[..byte_idx].chars().count())
}

/// Replace every case-insensitive occurrence of `term` with `replacement`.
///
/// Returns the new content and the number of replacements.
pub fn replace_all(content: &str, term: &str, replacement: &str) -> (String, usize) {
    if term.is_empty() {
        return (content.to_string(), 0);
    }
    let pattern = regex::RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build();
    match pattern {
        Ok(re) => {
            let count = re.find_iter(content).count();
            let replaced = re.replace_all(content, regex::NoExpand(replacement));
            (replaced.into_owned(), count)
        }
        Err(_) => (content.to_string(), 0),
    }
}

/// Insert `text` at char offset `offset` (end of content when `None`).
pub fn insert_at(content: &str, offset: Option<usize>, text: &str) -> String {
    let total = content.chars().count();
    let at = offset.unwrap_or(total).min(total);
    let split = content
        .char_indices()
        .nth(at)
        .map_or(content.len(), |(i, _)| i);
    format!("{}{}{}", &content[..split], text, &content[split..])
}

/// Pretty-print JSON with two-space indentation.
pub fn format_json(content: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| Error::Validation(format!("Failed to format content: {}", e)))?;
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            TextStats::of(""),
            TextStats {
                words: 0,
                lines: 1,
                chars: 0
            }
        );
        assert_eq!(TextStats::of("   ").words, 0);
    }

    #[test]
    fn test_stats_counts() {
        let stats = TextStats::of("fn main() {\n    println!(\"héllo\");\n}");
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.words, 5);
        assert_eq!(stats.chars, 36);
    }

    #[test]
    fn test_cursor_position() {
        let text = "ab\ncde\nf";
        assert_eq!(CursorPosition::at(text, 0), CursorPosition { line: 1, column: 1 });
        assert_eq!(CursorPosition::at(text, 4), CursorPosition { line: 2, column: 2 });
        assert_eq!(CursorPosition::at(text, 100), CursorPosition { line: 3, column: 2 });
    }

    #[test]
    fn test_find_case_insensitive() {
        assert_eq!(find("Hello World", "world"), Some(6));
        assert_eq!(find("Hello", "bye"), None);
        assert_eq!(find("Hello", ""), None);
    }

    #[test]
    fn test_replace_all_is_literal() {
        let (out, n) = replace_all("a.b A.B c", "a.b", "$x");
        assert_eq!(out, "$x $x c");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_insert_at() {
        assert_eq!(insert_at("héllo", Some(2), "XX"), "héXXllo");
        assert_eq!(insert_at("abc", None, "!"), "abc!");
        assert_eq!(insert_at("abc", Some(99), "!"), "abc!");
    }

    #[test]
    fn test_format_json() {
        assert_eq!(format_json("{\"a\":[1,2]}").unwrap(), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
        assert!(format_json("{nope").is_err());
    }
}
