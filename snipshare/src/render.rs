//! Plain-text rendering for command output.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use snipshare_core::ai::{AiFeature, AiOrchestrator, AiResult};
use snipshare_core::format::{format_file_size, format_relative_time, format_relative_time_opt, preview};
use snipshare_core::{Annotation, EditorSession, HistoryEntry, Notice, Snippet};

/// Spinner on stderr for a network call. Hidden when not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn notices(notices: Vec<Notice>) {
    for notice in notices {
        println!("{}", notice);
    }
}

pub fn draft(session: &EditorSession) {
    let draft = session.draft();
    let stats = session.stats();
    let prefs = session.preferences();

    let title = if draft.title.is_empty() {
        format!("{} (default)", draft.default_title())
    } else {
        draft.title.clone()
    };

    println!("Title:     {}", title);
    println!(
        "Mode:      {}",
        if draft.is_code {
            format!("code ({})", draft.language)
        } else {
            "text".to_string()
        }
    );
    if !draft.tags.is_empty() {
        println!("Tags:      {}", draft.tags.join(", "));
    }
    println!(
        "Access:    {}{}",
        if draft.is_private { "private" } else { "public" },
        if draft.password.is_empty() { "" } else { ", password protected" }
    );
    println!("Expires:   {}", snipshare_core::expiry_label(draft.expire_in));
    println!(
        "Stats:     {} words, {} lines, {} chars",
        stats.words, stats.lines, stats.chars
    );
    println!(
        "Autosave:  {} (last: {})",
        if prefs.auto_save_enabled { "on" } else { "off" },
        format_relative_time_opt(session.autosave().last_saved())
    );

    for file in &draft.ai_metadata.files {
        println!(
            "File:      {} ({}, {})",
            file.name,
            file.mime_type,
            format_file_size(file.size)
        );
    }

    let meta = &draft.ai_metadata;
    if !meta.summary.is_empty() {
        println!("Summary:   {}", meta.summary);
    }
    if !meta.suggestions.is_empty() {
        println!("Suggestions:");
        annotations(&meta.suggestions);
    }
    if !meta.security_issues.is_empty() {
        println!("Security issues:");
        annotations(&meta.security_issues);
    }

    println!();
    if draft.content.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", draft.content);
    }
}

fn annotations(items: &[Annotation]) {
    for item in items {
        match item.line {
            Some(line) => println!("  line {:<4} [{}] {}", line, item.severity.as_str(), item.text),
            None => println!("  {:<9} [{}] {}", "", item.severity.as_str(), item.text),
        }
    }
}

pub fn ai_result(ai: &AiOrchestrator, feature: AiFeature) {
    let Some(result) = ai.result(feature) else {
        return;
    };
    match result {
        AiResult::Suggestions(items) | AiResult::SecurityIssues(items) => {
            if items.is_empty() {
                println!("No findings.");
            }
            annotations(items);
        }
        AiResult::Completions(items) => {
            for (i, item) in items.iter().enumerate() {
                println!("{:>3}: {}", i, item);
            }
        }
        AiResult::Explanation(text) | AiResult::Summary(text) => println!("{}", text),
        AiResult::Tags(tags) => println!("{}", tags.join(", ")),
        AiResult::Generated { content, .. } => println!("{}", content),
        AiResult::DetectedLanguage { language, heuristic } => {
            if *heuristic {
                println!("{} (heuristic)", language);
            } else {
                println!("{}", language);
            }
        }
    }
}

pub fn history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No snippets in this session.");
        return;
    }
    for entry in entries {
        let lock = if entry.has_password { " [locked]" } else { "" };
        println!(
            "{:<12} {:<10} {:>10}  {}{}",
            entry.id,
            entry.language.as_str(),
            format_relative_time(entry.timestamp),
            preview(&entry.title, 60),
            lock
        );
        if !entry.tags.is_empty() {
            println!("{:<12} tags: {}", "", entry.tags.join(", "));
        }
    }
}

pub fn snippet(snippet: &Snippet, share_url: &str) {
    println!("Title:     {}", if snippet.title.is_empty() { "Untitled" } else { &snippet.title });
    println!(
        "Mode:      {}",
        if snippet.is_code {
            format!("code ({})", snippet.language)
        } else {
            "text".to_string()
        }
    );
    if !snippet.tags.is_empty() {
        println!("Tags:      {}", snippet.tags.join(", "));
    }
    println!("Link:      {}", share_url);
    for file in &snippet.ai_metadata.files {
        println!("File:      {} {}", file.name, file.url);
    }

    let meta = &snippet.ai_metadata;
    if !meta.summary.is_empty() {
        println!("Summary:   {}", meta.summary);
    }
    if !meta.explanation.is_empty() {
        println!("Explained: {}", meta.explanation);
    }
    if !meta.suggestions.is_empty() {
        println!("Suggestions:");
        annotations(&meta.suggestions);
    }
    println!();
    println!("{}", snippet.content);
}
