//! # snipshare-core
//!
//! Client-side session controller for a snippet-sharing service.
//!
//! This library provides:
//! - The draft store with debounced local persistence
//! - Undo/redo over content snapshots
//! - Server-side autosave of drafts
//! - AI capability orchestration (analysis, completion, tags, ...)
//! - The per-session history log with local and semantic search
//! - A password-gated snippet viewer
//! - Configuration and logging infrastructure
//!
//! ## Architecture
//!
//! State lives in two key/value partitions:
//! - **Persistent:** the draft and editor preferences, surviving restarts
//! - **Session:** the history log, discarded with the session
//!
//! Everything remote goes through the [`SnippetApi`] trait; the
//! [`HttpSnippetApi`] implementation speaks JSON over HTTP.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snipshare_core::{Config, EditorSession, FileStore, HttpSnippetApi};
//!
//! # async fn demo() -> snipshare_core::Result<()> {
//! let config = Config::load()?;
//! let endpoint = config.api.endpoint();
//! let api = HttpSnippetApi::new(&endpoint, config.api.timeout())?;
//!
//! let persistent = Arc::new(FileStore::open(Config::data_dir())?);
//! let volatile = Arc::new(FileStore::open(Config::session_dir("default"))?);
//! let origin = config.api.share_origin(&endpoint);
//!
//! let mut session = EditorSession::open(Arc::new(api), persistent, volatile, &config.editor, origin);
//! session.set_content("fn main() {}");
//! let id = session.save(false).await?;
//! println!("saved {id}");
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use ai::{AiFeature, AiOrchestrator, AiUpdate};
pub use api::{HttpSnippetApi, SnippetApi};
pub use config::Config;
pub use error::{Error, Result};
pub use history::SearchMode;
pub use notice::{Notice, NoticeLevel};
pub use session::{DueTimers, EditorSession};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use types::*;
pub use viewer::{SnippetViewer, ViewerState};

// Public modules
pub mod ai;
pub mod api;
pub mod autosave;
pub mod config;
pub mod detect;
pub mod draft;
pub mod edit_history;
pub mod error;
pub mod format;
pub mod history;
pub mod logging;
pub mod notice;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod text;
pub mod types;
pub mod upload;
pub mod viewer;
