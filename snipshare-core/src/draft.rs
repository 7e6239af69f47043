//! Draft store
//!
//! Owns the in-progress [`Draft`] and the [`EditorPreferences`], mirrors
//! both into the persistent partition, and keeps the derived text stats
//! current. Every field change (re)arms a debounced write; content
//! changes additionally mark the draft dirty for autosave.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::notice::Notices;
use crate::schedule::Debounce;
use crate::storage::{SharedStore, DRAFT_KEY, PREFERENCES_KEY};
use crate::text::TextStats;
use crate::types::{
    parse_tags, AiMetadata, Draft, EditorPreferences, FileAttachment, Language, Theme,
};

pub struct DraftStore {
    store: SharedStore,
    draft: Draft,
    preferences: EditorPreferences,
    stats: TextStats,
    dirty: bool,
    persist: Debounce,
}

impl DraftStore {
    /// Restore the draft and preferences from `store`.
    ///
    /// Missing records yield defaults. Malformed records are discarded with
    /// a logged warning and a queued notice; loading never fails.
    pub fn load(store: SharedStore, persist_delay: Duration, notices: &mut Notices) -> Self {
        let draft = match read_record::<Draft>(&store, DRAFT_KEY) {
            Ok(Some(draft)) => {
                tracing::debug!(chars = draft.content.len(), "Restored draft");
                draft
            }
            Ok(None) => Draft::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable draft");
                notices.warning("Saved draft could not be restored; starting fresh.");
                Draft::default()
            }
        };

        let preferences = match read_record::<EditorPreferences>(&store, PREFERENCES_KEY) {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable editor preferences");
                notices.warning("Editor preferences could not be restored; using defaults.");
                EditorPreferences::default()
            }
        };

        let stats = TextStats::of(&draft.content);
        Self {
            store,
            draft,
            preferences,
            stats,
            dirty: false,
            persist: Debounce::new(persist_delay),
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn preferences(&self) -> &EditorPreferences {
        &self.preferences
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    /// Content changed since the last successful autosave or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// A clear would discard content or attached files.
    pub fn needs_confirmation(&self) -> bool {
        !self.draft.content.is_empty() || self.draft.ai_metadata.has_files()
    }

    fn touch(&mut self) {
        self.draft.timestamp = chrono::Utc::now();
        self.persist.arm();
    }

    /// Replace the content. Returns false when nothing changed.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content == self.draft.content {
            return false;
        }
        self.draft.content = content;
        self.stats = TextStats::of(&self.draft.content);
        self.dirty = true;
        self.touch();
        true
    }

    pub fn set_is_code(&mut self, is_code: bool) {
        self.draft.is_code = is_code;
        self.touch();
    }

    pub fn set_language(&mut self, language: Language) {
        self.draft.language = language;
        self.touch();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
        self.touch();
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.draft.tags = tags;
        self.touch();
    }

    /// Set tags from a comma-separated string.
    pub fn set_tags_str(&mut self, input: &str) {
        self.set_tags(parse_tags(input));
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.draft.password = password.into();
        self.touch();
    }

    pub fn set_expire_in(&mut self, seconds: Option<u64>) {
        self.draft.expire_in = seconds;
        self.touch();
    }

    pub fn set_private(&mut self, is_private: bool) {
        self.draft.is_private = is_private;
        self.touch();
    }

    /// Mutate the AI metadata in place.
    pub fn update_metadata(&mut self, f: impl FnOnce(&mut AiMetadata)) {
        f(&mut self.draft.ai_metadata);
        self.touch();
    }

    pub fn attach_files(&mut self, files: Vec<FileAttachment>) {
        self.update_metadata(|meta| meta.files.extend(files));
    }

    pub fn set_font_size(&mut self, size: u8) -> Result<()> {
        self.preferences.set_font_size(size)?;
        self.persist.arm();
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.preferences.theme = theme;
        self.persist.arm();
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.preferences.auto_save_enabled = enabled;
        self.persist.arm();
    }

    /// Reset content, password, title, tags and AI metadata.
    ///
    /// Returns `Ok(false)` without touching anything when the draft holds
    /// content or files and `confirmed` is false. Preferences survive.
    pub fn clear(&mut self, confirmed: bool) -> Result<bool> {
        if self.needs_confirmation() && !confirmed {
            return Ok(false);
        }

        self.draft.content.clear();
        self.draft.password.clear();
        self.draft.title.clear();
        self.draft.tags.clear();
        self.draft.ai_metadata = AiMetadata::default();
        self.draft.timestamp = chrono::Utc::now();
        self.stats = TextStats::of("");
        self.dirty = false;
        self.persist.cancel();

        self.store.remove(DRAFT_KEY)?;
        tracing::info!("Draft cleared");
        Ok(true)
    }

    /// Drop the persisted draft record (after a final save).
    pub fn remove_persisted(&mut self) -> Result<()> {
        self.persist.cancel();
        self.store.remove(DRAFT_KEY)?;
        // Preferences are still wanted.
        self.write_preferences()
    }

    /// Write draft and preferences now, cancelling any pending write.
    pub fn persist_now(&mut self) -> Result<()> {
        self.persist.cancel();
        let draft = serde_json::to_string(&self.draft)?;
        self.store.set(DRAFT_KEY, &draft)?;
        self.write_preferences()?;
        tracing::debug!("Draft persisted");
        Ok(())
    }

    fn write_preferences(&self) -> Result<()> {
        let prefs = serde_json::to_string(&self.preferences)?;
        self.store.set(PREFERENCES_KEY, &prefs)
    }

    /// Persist if the debounce has elapsed. Returns whether a write happened.
    pub fn persist_if_due(&mut self) -> Result<bool> {
        if !self.persist.fire_if_due() {
            return Ok(false);
        }
        self.persist_now()?;
        Ok(true)
    }

    pub fn persist_deadline(&self) -> Option<Instant> {
        self.persist.deadline()
    }

    pub fn has_pending_write(&self) -> bool {
        self.persist.is_pending()
    }
}

fn read_record<T: serde::de::DeserializeOwned>(store: &SharedStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
