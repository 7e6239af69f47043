//! Interactive editing session
//!
//! Reads one command per line while the session's debounced timers run in
//! the background of the same task: whenever no input arrives before the
//! nearest deadline, the due timers fire and their notices are printed.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use snipshare_core::{parse_expiry, AiFeature, Language, SearchMode, Theme};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use crate::commands::parse_switch;
use crate::{render, App};

const HELP: &str = "\
Editing:
  show                      print the draft
  set <text>                replace the content
  append <text>             add a line to the content
  undo | redo
  cursor <offset>           set the cursor (chars)
  title <text> | tags <a,b> | lang <name> | code on|off
  password <text> | expire <secs|never> | private on|off
  find <term> | replace <term> <replacement> | format
  import <path> | export [dir] | attach <path>...
  clear [--yes]
Saving:
  save [--draft]
  autosave on|off
AI:
  ai enable|disable <capability>
  ai <capability> [prompt]  analyze complete explain tags generate security summarize detect
  apply [n]                 insert completion n
  apply-lang                adopt the detected language
History:
  history [term]            list or filter this session's snippets
  semantic on|off           rank searches on the server
  history-clear [--yes]
Other:
  prefs | font <size> | theme <name> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    Set(String),
    Append(String),
    Undo,
    Redo,
    Cursor(usize),
    Title(String),
    Tags(String),
    Lang(Language),
    Code(bool),
    Password(String),
    Expire(Option<u64>),
    Private(bool),
    Find(String),
    Replace(String, String),
    Format,
    Import(PathBuf),
    Export(Option<PathBuf>),
    Attach(Vec<PathBuf>),
    Clear { confirmed: bool },
    Save { as_draft: bool },
    Autosave(bool),
    AiToggle(AiFeature, bool),
    Ai(AiFeature, String),
    Apply(usize),
    ApplyLanguage,
    History(String),
    Semantic(bool),
    HistoryClear { confirmed: bool },
    Prefs,
    Font(u8),
    Theme(Theme),
    Help,
    Quit,
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest)
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "show" => ShellCommand::Show,
        "set" => ShellCommand::Set(rest.to_string()),
        "append" => ShellCommand::Append(rest.to_string()),
        "undo" => ShellCommand::Undo,
        "redo" => ShellCommand::Redo,
        "cursor" => match required(rest, "cursor <offset>")?.parse() {
            Ok(offset) => ShellCommand::Cursor(offset),
            Err(_) => bail!("cursor offset must be a number"),
        },
        "title" => ShellCommand::Title(rest.to_string()),
        "tags" => ShellCommand::Tags(rest.to_string()),
        "lang" => ShellCommand::Lang(required(rest, "lang <name>")?.parse()?),
        "code" => ShellCommand::Code(parse_switch(required(rest, "code on|off")?)?),
        "password" => ShellCommand::Password(rest.to_string()),
        "expire" => ShellCommand::Expire(parse_expiry(rest)?),
        "private" => ShellCommand::Private(parse_switch(required(rest, "private on|off")?)?),
        "find" => ShellCommand::Find(required(rest, "find <term>")?.to_string()),
        "replace" => match rest.split_once(char::is_whitespace) {
            Some((term, replacement)) => {
                ShellCommand::Replace(term.to_string(), replacement.trim().to_string())
            }
            None => bail!("usage: replace <term> <replacement>"),
        },
        "format" => ShellCommand::Format,
        "import" => ShellCommand::Import(PathBuf::from(required(rest, "import <path>")?)),
        "export" => ShellCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "attach" => ShellCommand::Attach(
            required(rest, "attach <path>...")?
                .split_whitespace()
                .map(PathBuf::from)
                .collect(),
        ),
        "clear" => ShellCommand::Clear {
            confirmed: rest == "--yes",
        },
        "save" => ShellCommand::Save {
            as_draft: rest == "--draft",
        },
        "autosave" => ShellCommand::Autosave(parse_switch(required(rest, "autosave on|off")?)?),
        "ai" => {
            let rest = required(rest, "ai <capability> [prompt]")?;
            let (first, tail) = match rest.split_once(char::is_whitespace) {
                Some((first, tail)) => (first, tail.trim()),
                None => (rest, ""),
            };
            match first {
                "enable" | "disable" => {
                    let feature = required(tail, "ai enable|disable <capability>")?.parse()?;
                    ShellCommand::AiToggle(feature, first == "enable")
                }
                _ => ShellCommand::Ai(first.parse()?, tail.to_string()),
            }
        }
        "apply" => ShellCommand::Apply(if rest.is_empty() {
            0
        } else {
            match rest.parse() {
                Ok(n) => n,
                Err(_) => bail!("apply takes a completion number"),
            }
        }),
        "apply-lang" => ShellCommand::ApplyLanguage,
        "history" => ShellCommand::History(rest.to_string()),
        "semantic" => ShellCommand::Semantic(parse_switch(required(rest, "semantic on|off")?)?),
        "history-clear" => ShellCommand::HistoryClear {
            confirmed: rest == "--yes",
        },
        "prefs" => ShellCommand::Prefs,
        "font" => match required(rest, "font <size>")?.parse() {
            Ok(size) => ShellCommand::Font(size),
            Err(_) => bail!("font size must be a number"),
        },
        "theme" => ShellCommand::Theme(required(rest, "theme <name>")?.parse()?),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => bail!("unknown command '{}' (try 'help')", other),
    };
    Ok(Some(command))
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn run(app: &mut App) -> Result<()> {
    println!("snipshare shell (session '{}'). Type 'help' for commands.", app.session_name);
    render::notices(app.session.drain_notices());
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let deadline = app.session.next_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse(&line) {
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(app, command).await {
                            println!("error: {:#}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("error: {}", e),
                }
                render::notices(app.session.drain_notices());
                prompt();
            }
            _ = sleep_until(deadline) => {
                let ran = app.session.run_due_timers().await;
                let notices = app.session.drain_notices();
                if !notices.is_empty() || ran.searched {
                    println!();
                    render::notices(notices);
                    if ran.searched {
                        render::history(&app.session.visible_history());
                    }
                    prompt();
                }
            }
        }
    }

    println!();
    tracing::info!("Shell closed");
    Ok(())
}

async fn execute(app: &mut App, command: ShellCommand) -> Result<()> {
    let session = &mut app.session;
    match command {
        ShellCommand::Show => render::draft(session),
        ShellCommand::Set(text) => {
            session.set_content(text);
        }
        ShellCommand::Append(text) => {
            let current = &session.draft().content;
            let next = if current.is_empty() {
                text
            } else {
                format!("{}\n{}", current, text)
            };
            session.set_content(next);
        }
        ShellCommand::Undo => {
            if !session.undo() {
                println!("Nothing to undo.");
            }
        }
        ShellCommand::Redo => {
            if !session.redo() {
                println!("Nothing to redo.");
            }
        }
        ShellCommand::Cursor(offset) => session.set_cursor(Some(offset)),
        ShellCommand::Title(title) => session.set_title(title),
        ShellCommand::Tags(tags) => session.set_tags(&tags),
        ShellCommand::Lang(language) => session.set_language(language),
        ShellCommand::Code(on) => session.set_is_code(on),
        ShellCommand::Password(password) => session.set_password(password),
        ShellCommand::Expire(expire) => session.set_expire_in(expire),
        ShellCommand::Private(on) => session.set_private(on),
        ShellCommand::Find(term) => {
            if let Some(offset) = session.find(&term) {
                println!("at {}", offset);
            }
        }
        ShellCommand::Replace(term, replacement) => {
            session.replace_all(&term, &replacement);
        }
        ShellCommand::Format => {
            session.format()?;
        }
        ShellCommand::Import(path) => session.import_file(&path)?,
        ShellCommand::Export(dir) => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = session.export(&dir)?;
            println!("{}", path.display());
        }
        ShellCommand::Attach(paths) => {
            let pb = render::spinner("Uploading files...");
            let result = session.attach_files(&paths).await;
            pb.finish_and_clear();
            result?;
        }
        ShellCommand::Clear { confirmed } => {
            if !session.clear(confirmed)? {
                println!("The draft has content; use 'clear --yes'.");
            }
        }
        ShellCommand::Save { as_draft } => {
            let pb = render::spinner("Saving snippet...");
            let result = session.save(as_draft).await;
            pb.finish_and_clear();
            result?;
        }
        ShellCommand::Autosave(on) => session.set_auto_save(on),
        ShellCommand::AiToggle(feature, on) => {
            session.ai_mut().set_enabled(feature, on);
            println!("{} {}", feature, if on { "enabled" } else { "disabled" });
        }
        ShellCommand::Ai(feature, prompt) => {
            let pb = render::spinner(&format!("Running {}...", feature));
            let result = session.run_ai(feature, &prompt).await;
            pb.finish_and_clear();
            result?;
            if session.ai().error(feature).is_none() {
                render::ai_result(session.ai(), feature);
            }
        }
        ShellCommand::Apply(index) => {
            if !session.apply_completion(index) {
                println!("No completion #{}.", index);
            }
        }
        ShellCommand::ApplyLanguage => {
            if !session.apply_detected_language() {
                println!("No detected language yet.");
            }
        }
        ShellCommand::History(term) => {
            session.set_search_term(term);
            if session.search().mode() == SearchMode::Local {
                render::history(&session.visible_history());
            }
            // Semantic results arrive when the search debounce fires.
        }
        ShellCommand::Semantic(on) => {
            let mode = if on { SearchMode::Semantic } else { SearchMode::Local };
            session.set_search_mode(mode);
        }
        ShellCommand::HistoryClear { confirmed } => {
            if !session.clear_history(confirmed)? {
                println!("Use 'history-clear --yes' to clear the history.");
            }
        }
        ShellCommand::Prefs => {
            let prefs = session.preferences();
            println!(
                "font {} | theme {} | autosave {}",
                prefs.font_size,
                prefs.theme,
                if prefs.auto_save_enabled { "on" } else { "off" }
            );
        }
        ShellCommand::Font(size) => session.set_font_size(size)?,
        ShellCommand::Theme(theme) => session.set_theme(theme),
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}
