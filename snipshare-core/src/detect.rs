//! Heuristic language detection
//!
//! Offline fallback used when the remote detector is unavailable. The
//! content is trimmed and lowercased, then tested against a fixed pattern
//! table in priority order; the first match wins. Anything unmatched is
//! plain text. Accuracy is rough by design of the table order: e.g. any
//! `import` classifies as javascript before python gets a chance.

use crate::types::Language;
use once_cell::sync::Lazy;
use regex::Regex;

static PATTERNS: Lazy<Vec<(Language, Regex)>> = Lazy::new(|| {
    let table: [(Language, &str); 13] = [
        (
            Language::Javascript,
            r"(function\s+\w+\s*\(|\bconst\b|\blet\b|\bvar\b|\bimport\b|\bexport\b)",
        ),
        (
            Language::Typescript,
            r"(interface\s+\w+|\btype\b\s+\w+|\bimplements\b)",
        ),
        (
            Language::Python,
            r"(def\s+\w+\s*\(|\bimport\b\s+\w+|\bfrom\b\s+\w+)",
        ),
        (Language::Css, r"(\w+\s*\{\s*[\w-]+\s*:\s*[^;]+;)"),
        (
            Language::Markup,
            r"(<!doctype\s+html>|<html\b|<div\b|<span\b)",
        ),
        (Language::Json, r"^\s*[{\[]"),
        (Language::Bash, r"(#\s*!/bin/bash|\bfunction\b\s+\w+)"),
        (
            Language::Java,
            r"(public\s+class\s+\w+|\bvoid\s+\w+\s*\()",
        ),
        (Language::C, r"(#include\s+<[\w.]+>|int\s+main\s*\()"),
        (Language::Cpp, r"(#include\s+<[\w.]+>|std::\w+)"),
        (Language::Php, r"(<?php|\$\w+\s*=)"),
        (Language::Ruby, r"(def\s+\w+\s*|\bclass\s+\w+)"),
        (Language::Go, r"(package\s+\w+|\bfunc\s+\w+\s*\()"),
    ];

    table
        .into_iter()
        .filter_map(|(lang, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((lang, re)),
            Err(e) => {
                tracing::error!(language = %lang, error = %e, "Invalid detection pattern");
                None
            }
        })
        .collect()
});

/// Classify `content` using the pattern table.
pub fn detect_language(content: &str) -> Language {
    let text = content.trim().to_lowercase();
    if text.is_empty() {
        return Language::Plaintext;
    }

    PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&text))
        .map(|(lang, _)| *lang)
        .unwrap_or(Language::Plaintext)
}
