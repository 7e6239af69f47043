//! snipshare - terminal client for sharing code snippets
//!
//! Edits a locally persisted draft, saves it as a shareable snippet, runs
//! AI helpers over it and opens snippets shared by others.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Draft + preferences: $XDG_DATA_HOME/snipshare/ (~/.local/share/snipshare/)
//! - Session history: $XDG_STATE_HOME/snipshare/sessions/<name>/
//! - Config: $XDG_CONFIG_HOME/snipshare/config.toml (~/.config/snipshare/config.toml)

mod commands;
mod render;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snipshare_core::config::ApiEndpoint;
use snipshare_core::{Config, EditorSession, FileStore, HttpSnippetApi, SharedStore};

#[derive(Parser)]
#[command(name = "snipshare")]
#[command(about = "Write, share and inspect code snippets")]
#[command(version)]
pub struct Args {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Inspect or edit the local draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Save the draft as a snippet and print its share link
    Save {
        /// Save as a draft snippet (the local draft is kept)
        #[arg(long)]
        draft: bool,
    },

    /// Open a shared snippet
    View {
        /// Snippet id
        id: String,

        /// Password for a protected snippet
        #[arg(short, long)]
        password: Option<String>,

        /// Ask for improvement suggestions
        #[arg(long)]
        analyze: bool,

        /// Ask for a summary
        #[arg(long)]
        summarize: bool,

        /// Download the snippet into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Run an AI capability over the draft
    Ai {
        /// analyze, complete, explain, tags, generate, security, summarize or detect
        capability: String,

        /// Prompt for content generation
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Character offset of the cursor for completions (default: end)
        #[arg(long)]
        cursor: Option<usize>,

        /// Apply the result (completion or detected language)
        #[arg(long)]
        apply: bool,

        /// Which completion to apply
        #[arg(long, default_value = "0")]
        pick: usize,
    },

    /// Snippets created in this session
    History {
        /// Filter by title, id or tag
        #[arg(short, long)]
        search: Option<String>,

        /// Rank with the server's semantic search
        #[arg(long, requires = "search")]
        semantic: bool,

        /// Clear the session history
        #[arg(long)]
        clear: bool,

        /// Confirm clearing
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change editor preferences
    Prefs {
        #[arg(long)]
        font_size: Option<u8>,

        #[arg(long)]
        theme: Option<String>,

        /// on or off
        #[arg(long)]
        autosave: Option<String>,
    },

    /// Interactive session with live autosave and undo/redo
    Shell {
        /// Use a throwaway session history
        #[arg(long)]
        fresh: bool,
    },

    /// Show configuration, paths and draft status
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum DraftAction {
    /// Print the draft
    Show,

    /// Change draft fields
    Set {
        /// New content (use `-` to read stdin)
        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(short, long)]
        language: Option<String>,

        /// Treat the content as code
        #[arg(long, conflicts_with = "text")]
        code: bool,

        /// Treat the content as plain text
        #[arg(long)]
        text: bool,

        /// Password protection (empty string removes it)
        #[arg(long)]
        password: Option<String>,

        /// Expiry in seconds, or `never`
        #[arg(long)]
        expire: Option<String>,

        /// Unlisted snippet
        #[arg(long)]
        private: Option<bool>,
    },

    /// Clear content, title, tags and password
    Clear {
        /// Confirm discarding content
        #[arg(short, long)]
        yes: bool,
    },

    /// Load a local text file as the draft
    Import { path: PathBuf },

    /// Write the draft to a file
    Export {
        /// Target directory (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Pretty-print JSON content
    Format,

    /// Locate text (case-insensitive)
    Find { term: String },

    /// Replace every occurrence (case-insensitive)
    Replace { find: String, replace: String },

    /// Upload files and attach them to the draft
    Attach {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Everything a command needs.
pub struct App {
    pub config: Config,
    pub endpoint: ApiEndpoint,
    pub session: EditorSession,
    pub session_name: String,
    volatile: Arc<FileStore>,
    throwaway: bool,
}

impl App {
    fn open(config: Config, session_name: String, throwaway: bool) -> Result<Self> {
        let endpoint = config.api.endpoint();
        if endpoint.is_fallback() {
            eprintln!(
                "Using fallback API URL {} (set SNIPSHARE_API_URL or [api].base_url)",
                endpoint.base_url
            );
        }

        let api = HttpSnippetApi::new(&endpoint, config.api.timeout())
            .context("failed to create API client")?;

        let data_dir = Config::data_dir();
        let persistent: SharedStore =
            Arc::new(FileStore::open(&data_dir).context("failed to open draft storage")?);
        let volatile = Arc::new(
            FileStore::open(Config::session_dir(&session_name))
                .context("failed to open session storage")?,
        );

        let origin = config.api.share_origin(&endpoint);
        let session = EditorSession::open(
            Arc::new(api),
            persistent,
            volatile.clone(),
            &config.editor,
            origin,
        );

        tracing::info!(
            api = %endpoint.base_url,
            session = %session_name,
            "Session opened"
        );

        Ok(Self {
            config,
            endpoint,
            session,
            session_name,
            volatile,
            throwaway,
        })
    }

    /// Flush the draft and print queued notices.
    pub fn finish(mut self) -> Result<()> {
        self.session
            .persist_now()
            .context("failed to save the draft locally")?;
        render::notices(self.session.drain_notices());

        if self.throwaway {
            drop(self.session);
            if let Ok(store) = Arc::try_unwrap(self.volatile) {
                store.destroy().context("failed to remove throwaway session")?;
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file; stdout is for command output)
    let _log_guard =
        snipshare_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("snipshare starting up");

    let (session_name, throwaway) = match &args.command {
        Command::Shell { fresh: true } => (Config::fresh_session_name(), true),
        _ => (Config::session_name(), false),
    };
    let mut app = App::open(config, session_name, throwaway)?;

    if args.verbose {
        eprintln!("API: {}", app.endpoint.base_url);
        eprintln!("Session: {}", app.session_name);
    }

    let result = commands::run(&mut app, args.command).await;
    let finished = app.finish();

    tracing::info!("snipshare shutting down");

    result.and(finished)
}
