//! One-shot subcommands.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use snipshare_core::notice::Notices;
use snipshare_core::viewer::share_url;
use snipshare_core::{parse_expiry, AiFeature, Config, Language, SearchMode, Theme, ViewerState};

use crate::{render, shell, App, Command, DraftAction};

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Draft { action } => draft(app, action).await,
        Command::Save { draft } => save(app, draft).await,
        Command::View {
            id,
            password,
            analyze,
            summarize,
            export,
        } => view(app, &id, password.as_deref(), analyze, summarize, export).await,
        Command::Ai {
            capability,
            prompt,
            cursor,
            apply,
            pick,
        } => ai(app, &capability, &prompt, cursor, apply, pick).await,
        Command::History {
            search,
            semantic,
            clear,
            yes,
        } => history(app, search, semantic, clear, yes).await,
        Command::Prefs {
            font_size,
            theme,
            autosave,
        } => prefs(app, font_size, theme.as_deref(), autosave.as_deref()),
        Command::Shell { .. } => shell::run(app).await,
        Command::Status { json } => status(app, json),
    }
}

async fn draft(app: &mut App, action: DraftAction) -> Result<()> {
    let session = &mut app.session;
    match action {
        DraftAction::Show => render::draft(session),
        DraftAction::Set {
            content,
            title,
            tags,
            language,
            code,
            text,
            password,
            expire,
            private,
        } => {
            if let Some(language) = language {
                let language: Language = language.parse()?;
                session.set_language(language);
                session.set_is_code(!language.is_plaintext());
            }
            if code {
                session.set_is_code(true);
            }
            if text {
                session.set_is_code(false);
            }
            if let Some(content) = content {
                let content = if content == "-" {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read content from stdin")?;
                    buf
                } else {
                    content
                };
                session.set_content(content);
            }
            if let Some(title) = title {
                session.set_title(title);
            }
            if let Some(tags) = tags {
                session.set_tags(&tags);
            }
            if let Some(password) = password {
                session.set_password(password);
            }
            if let Some(expire) = expire {
                session.set_expire_in(parse_expiry(&expire)?);
            }
            if let Some(private) = private {
                session.set_private(private);
            }
            render::draft(session);
        }
        DraftAction::Clear { yes } => {
            if !session.clear(yes)? {
                bail!("The draft has content; pass --yes to discard it");
            }
        }
        DraftAction::Import { path } => {
            session
                .import_file(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
        }
        DraftAction::Export { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir().context("failed to resolve current directory")?,
            };
            let path = session.export(&dir).context("failed to write export")?;
            println!("{}", path.display());
        }
        DraftAction::Format => {
            if !session.format()? && !session.draft().is_code {
                println!("Formatting only applies in code mode.");
            }
        }
        DraftAction::Find { term } => {
            if let Some(offset) = session.find(&term) {
                println!("{}", offset);
            }
        }
        DraftAction::Replace { find, replace } => {
            session.replace_all(&find, &replace);
        }
        DraftAction::Attach { paths } => attach(app, &paths).await?,
    }
    Ok(())
}

async fn attach(app: &mut App, paths: &[PathBuf]) -> Result<()> {
    let pb = render::spinner("Uploading files...");
    let result = app.session.attach_files(paths).await;
    pb.finish_and_clear();
    let count = result?;
    println!("Attached {} file(s).", count);
    Ok(())
}

async fn save(app: &mut App, as_draft: bool) -> Result<()> {
    let pb = render::spinner("Saving snippet...");
    let result = app.session.save(as_draft).await;
    pb.finish_and_clear();
    let id = result?;
    println!("{}", share_url(app.session.share_origin(), &id));
    Ok(())
}

async fn view(
    app: &mut App,
    id: &str,
    password: Option<&str>,
    analyze: bool,
    summarize: bool,
    export: Option<PathBuf>,
) -> Result<()> {
    let api = app.session.api();
    let mut viewer = app.session.open_viewer(id);
    let mut notices = Notices::new();

    let pb = render::spinner("Fetching snippet...");
    viewer.load(api, &mut notices).await;
    let locked = matches!(viewer.state(), ViewerState::PasswordRequired { .. });
    if let (true, Some(password)) = (locked, password) {
        pb.set_message("Verifying password...");
        // The failure is reported through the notices and the viewer state.
        let _ = viewer.submit_password(api, password, &mut notices).await;
    }
    if analyze {
        pb.set_message("Analyzing...");
        viewer.analyze(api, &mut notices).await;
    }
    if summarize {
        pb.set_message("Summarizing...");
        viewer.summarize(api, &mut notices).await;
    }
    pb.finish_and_clear();
    render::notices(notices.drain());

    match viewer.state() {
        ViewerState::Loaded(snippet) => render::snippet(snippet, &viewer.share_url()),
        ViewerState::PasswordRequired { error: None } => {
            bail!("Snippet {} is password protected; pass --password", id)
        }
        ViewerState::PasswordRequired { error: Some(error) } => bail!("{}", error),
        ViewerState::Error(message) => bail!("{}", message),
        ViewerState::Loading => bail!("Snippet {} did not load", id),
    }

    if let (Some(dir), Some(snippet)) = (export, viewer.snippet()) {
        let path = dir.join(snippet.export_file_name());
        std::fs::write(&path, &snippet.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

async fn ai(
    app: &mut App,
    capability: &str,
    prompt: &str,
    cursor: Option<usize>,
    apply: bool,
    pick: usize,
) -> Result<()> {
    let feature: AiFeature = capability.parse()?;
    let session = &mut app.session;

    // Flags live only as long as the process, so asking for one enables it.
    session.ai_mut().set_enabled(feature, true);
    session.set_cursor(cursor);

    let pb = render::spinner(&format!("Running {}...", feature));
    let result = session.run_ai(feature, prompt).await;
    pb.finish_and_clear();
    result?;

    if let Some(error) = session.ai().error(feature) {
        bail!("{}", error);
    }
    render::ai_result(session.ai(), feature);

    if apply {
        match feature {
            AiFeature::Completion => {
                if !session.apply_completion(pick) {
                    bail!("No completion #{}", pick);
                }
            }
            AiFeature::LanguageDetection => {
                session.apply_detected_language();
            }
            _ => {}
        }
    }
    Ok(())
}

async fn history(
    app: &mut App,
    search: Option<String>,
    semantic: bool,
    clear: bool,
    yes: bool,
) -> Result<()> {
    let session = &mut app.session;
    if clear {
        if !session.clear_history(yes)? {
            bail!(
                "History has {} entries; pass --yes to clear it",
                session.history().len()
            );
        }
        return Ok(());
    }

    if let Some(term) = search {
        session.set_search_term(term);
        if semantic {
            session.set_search_mode(SearchMode::Semantic);
            let pb = render::spinner("Searching...");
            session.run_due_timers().await;
            pb.finish_and_clear();
        }
    }
    render::history(&session.visible_history());
    Ok(())
}

fn prefs(
    app: &mut App,
    font_size: Option<u8>,
    theme: Option<&str>,
    autosave: Option<&str>,
) -> Result<()> {
    let session = &mut app.session;
    if let Some(size) = font_size {
        session.set_font_size(size)?;
    }
    if let Some(theme) = theme {
        let theme: Theme = theme.parse()?;
        session.set_theme(theme);
    }
    if let Some(value) = autosave {
        session.set_auto_save(parse_switch(value)?);
    }

    let prefs = session.preferences();
    println!("Font size: {}", prefs.font_size);
    println!("Theme:     {}", prefs.theme);
    println!(
        "Autosave:  {}",
        if prefs.auto_save_enabled { "on" } else { "off" }
    );
    Ok(())
}

pub fn parse_switch(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => bail!("expected on or off, got '{}'", other),
    }
}

#[derive(Serialize)]
struct StatusReport {
    api_url: String,
    api_source: &'static str,
    api_timeout_secs: u64,
    share_origin: String,
    session: String,
    data_dir: PathBuf,
    session_dir: PathBuf,
    log_file: PathBuf,
    draft_chars: usize,
    draft_words: usize,
    draft_language: String,
    draft_is_code: bool,
    draft_files: usize,
    autosave: bool,
    history_entries: usize,
}

fn status(app: &App, json: bool) -> Result<()> {
    let session = &app.session;
    let stats = session.stats();
    let draft = session.draft();

    let report = StatusReport {
        api_url: app.endpoint.base_url.clone(),
        api_source: app.endpoint.source.as_str(),
        api_timeout_secs: app.config.api.timeout_secs,
        share_origin: session.share_origin().to_string(),
        session: app.session_name.clone(),
        data_dir: Config::data_dir(),
        session_dir: Config::session_dir(&app.session_name),
        log_file: snipshare_core::logging::log_file_path(),
        draft_chars: stats.chars,
        draft_words: stats.words,
        draft_language: draft.effective_language().to_string(),
        draft_is_code: draft.is_code,
        draft_files: draft.ai_metadata.files.len(),
        autosave: session.preferences().auto_save_enabled,
        history_entries: session.history().len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("snipshare status");
    println!("================");
    println!();
    println!(
        "API:           {} ({}, timeout {}s)",
        report.api_url, report.api_source, report.api_timeout_secs
    );
    println!("Share links:   {}", report.share_origin);
    println!("Session:       {}", report.session);
    println!("Draft storage: {}", report.data_dir.display());
    println!("Session dir:   {}", report.session_dir.display());
    println!("Log file:      {}", report.log_file.display());
    println!("Config:        {}", Config::config_path().display());
    println!();
    println!(
        "Draft:         {} chars, {} words ({})",
        report.draft_chars, report.draft_words, report.draft_language
    );
    if report.draft_files > 0 {
        println!("Attachments:   {}", report.draft_files);
    }
    println!(
        "Autosave:      {}",
        if report.autosave { "on" } else { "off" }
    );
    println!("History:       {} snippet(s)", report.history_entries);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert!(parse_switch("on").unwrap());
        assert!(parse_switch(" OFF ").is_ok_and(|v| !v));
        assert!(parse_switch("maybe").is_err());
    }
}
