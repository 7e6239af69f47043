//! Session history log
//!
//! Newest-first list of snippets created in this session, capped at
//! [`HISTORY_CAPACITY`] and mirrored into the volatile session partition.
//! [`HistorySearch`] filters it locally or asks the API for a semantic
//! ranking.

use std::time::Duration;

use tokio::time::Instant;

use crate::api::SnippetApi;
use crate::error::Result;
use crate::notice::Notices;
use crate::schedule::Debounce;
use crate::storage::{SharedStore, HISTORY_KEY};
use crate::types::HistoryEntry;

pub const HISTORY_CAPACITY: usize = 15;

pub struct SessionHistory {
    store: SharedStore,
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    /// Load and sanitize the persisted log.
    ///
    /// Entries that cannot be decoded are dropped; an unreadable log is
    /// replaced by an empty one.
    pub fn load(store: SharedStore, notices: &mut Notices) -> Self {
        let entries = match read_entries(&store) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session history");
                notices.error("Error loading history");
                Vec::new()
            }
        };
        Self { store, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `entry`, evicting the oldest past capacity.
    pub fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        self.persist()
    }

    /// Empty the log and its persisted copy.
    ///
    /// Returns `Ok(false)` without changes when the log is non-empty and
    /// `confirmed` is false.
    pub fn clear(&mut self, confirmed: bool) -> Result<bool> {
        if !self.entries.is_empty() && !confirmed {
            return Ok(false);
        }
        self.entries.clear();
        self.store.remove(HISTORY_KEY)?;
        tracing::info!("Session history cleared");
        Ok(true)
    }

    /// Case-insensitive substring match on title, id or any tag.
    pub fn search_local(&self, term: &str) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.matches(term))
            .cloned()
            .collect()
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &raw)
    }
}

fn read_entries(store: &SharedStore) -> Result<Vec<HistoryEntry>> {
    let Some(raw) = store.get(HISTORY_KEY)? else {
        return Ok(Vec::new());
    };
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<HistoryEntry>(v) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed history entry");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Local,
    Semantic,
}

/// Search box state over a [`SessionHistory`].
#[derive(Debug)]
pub struct HistorySearch {
    mode: SearchMode,
    term: String,
    debounce: Debounce,
    semantic_results: Option<Vec<HistoryEntry>>,
}

impl HistorySearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            mode: SearchMode::Local,
            term: String::new(),
            debounce: Debounce::new(delay),
            semantic_results: None,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Update the term. A semantic query goes out once typing pauses.
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.semantic_results = None;
        if self.mode == SearchMode::Semantic && !self.term.trim().is_empty() {
            self.debounce.arm();
        } else {
            self.debounce.cancel();
        }
    }

    /// Switch modes and re-evaluate the current term right away.
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
        self.semantic_results = None;
        if mode == SearchMode::Semantic && !self.term.trim().is_empty() {
            self.debounce.arm_now();
        } else {
            self.debounce.cancel();
        }
    }

    /// Entries to display.
    pub fn visible(&self, history: &SessionHistory) -> Vec<HistoryEntry> {
        match self.mode {
            SearchMode::Local => history.search_local(&self.term),
            SearchMode::Semantic => self
                .semantic_results
                .clone()
                .unwrap_or_else(|| history.entries().to_vec()),
        }
    }

    /// Send the semantic query if its debounce has elapsed.
    ///
    /// On failure the unfiltered log stays visible and an error notice is
    /// queued. Returns whether a query was sent.
    pub async fn run_if_due(
        &mut self,
        api: &dyn SnippetApi,
        history: &SessionHistory,
        notices: &mut Notices,
    ) -> bool {
        if !self.debounce.fire_if_due() {
            return false;
        }
        if self.mode != SearchMode::Semantic || self.term.trim().is_empty() {
            return false;
        }

        let outcome = api.search(&self.term, history.entries()).await;

        match outcome {
            Ok(results) => {
                tracing::debug!(term = %self.term, hits = results.len(), "Semantic search done");
                self.semantic_results = Some(results);
                notices.success("Semantic search completed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Semantic search failed");
                self.semantic_results = None;
                notices.error("Semantic search failed");
            }
        }
        true
    }
}
