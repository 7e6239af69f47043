//! Editing session
//!
//! [`EditorSession`] wires the draft store, edit history, autosave, AI
//! orchestrator and session history together. All mutation goes through
//! `&mut self`; network calls are awaited by the caller. Debounced work
//! (draft persistence, autosave, semantic search) runs when the owner
//! calls [`run_due_timers`](EditorSession::run_due_timers), typically after
//! sleeping until [`next_deadline`](EditorSession::next_deadline).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::time::Instant;

use crate::ai::{AiContext, AiFeature, AiOrchestrator, AiUpdate};
use crate::api::{SnippetApi, SnippetPayload};
use crate::autosave::Autosave;
use crate::config::EditorConfig;
use crate::draft::DraftStore;
use crate::edit_history::EditHistory;
use crate::error::{Error, Result};
use crate::history::{HistorySearch, SearchMode, SessionHistory};
use crate::notice::{Notice, Notices};
use crate::schedule::earliest;
use crate::storage::SharedStore;
use crate::text::{self, TextStats};
use crate::types::{Draft, EditorPreferences, HistoryEntry, Language, Theme};
use crate::upload;
use crate::viewer::{share_url, SnippetViewer};

/// Largest local file accepted by [`EditorSession::import_file`].
pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

/// What a [`EditorSession::run_due_timers`] pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueTimers {
    /// The draft was written locally.
    pub persisted: bool,
    /// An autosave succeeded.
    pub autosaved: bool,
    /// A semantic search was sent (successful or not).
    pub searched: bool,
}

pub struct EditorSession {
    api: Arc<dyn SnippetApi>,
    drafts: DraftStore,
    edits: EditHistory,
    autosave: Autosave,
    ai: AiOrchestrator,
    history: SessionHistory,
    search: HistorySearch,
    notices: Notices,
    cursor: Option<usize>,
    share_origin: String,
}

impl EditorSession {
    /// Start a session.
    ///
    /// `persistent` holds the draft and preferences; `volatile` holds the
    /// per-session history log.
    pub fn open(
        api: Arc<dyn SnippetApi>,
        persistent: SharedStore,
        volatile: SharedStore,
        editor: &EditorConfig,
        share_origin: impl Into<String>,
    ) -> Self {
        let mut notices = Notices::new();
        let drafts = DraftStore::load(persistent, editor.draft_persist_delay(), &mut notices);
        let history = SessionHistory::load(volatile, &mut notices);

        let mut edits = EditHistory::new();
        edits.record(&drafts.draft().content);

        let autosave = Autosave::new(
            drafts.preferences().auto_save_enabled,
            editor.autosave_delay(),
        );

        tracing::debug!(
            chars = drafts.stats().chars,
            history = history.len(),
            "Editor session opened"
        );

        Self {
            api,
            drafts,
            edits,
            autosave,
            ai: AiOrchestrator::new(),
            history,
            search: HistorySearch::new(editor.search_debounce()),
            notices,
            cursor: None,
            share_origin: share_origin.into(),
        }
    }

    // --- state -----------------------------------------------------------

    pub fn draft(&self) -> &Draft {
        self.drafts.draft()
    }

    pub fn preferences(&self) -> &EditorPreferences {
        self.drafts.preferences()
    }

    pub fn stats(&self) -> TextStats {
        self.drafts.stats()
    }

    pub fn is_dirty(&self) -> bool {
        self.drafts.is_dirty()
    }

    pub fn edits(&self) -> &EditHistory {
        &self.edits
    }

    pub fn autosave(&self) -> &Autosave {
        &self.autosave
    }

    pub fn ai(&self) -> &AiOrchestrator {
        &self.ai
    }

    pub fn ai_mut(&mut self) -> &mut AiOrchestrator {
        &mut self.ai
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn search(&self) -> &HistorySearch {
        &self.search
    }

    pub fn api(&self) -> &dyn SnippetApi {
        &*self.api
    }

    pub fn share_origin(&self) -> &str {
        &self.share_origin
    }

    /// Take queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // --- editing ---------------------------------------------------------

    /// Replace the content: snapshot for undo, mark dirty, (re)arm timers.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if !self.drafts.set_content(content) {
            return false;
        }
        let draft = self.drafts.draft();
        self.edits.record(&draft.content);
        self.autosave
            .on_content_changed(&draft.content, self.drafts.is_dirty());
        true
    }

    fn restore_content(&mut self, content: String) {
        if self.drafts.set_content(content) {
            let draft = self.drafts.draft();
            self.autosave
                .on_content_changed(&draft.content, self.drafts.is_dirty());
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.edits.undo() {
            Some(previous) => {
                self.restore_content(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.edits.redo() {
            Some(next) => {
                self.restore_content(next);
                true
            }
            None => false,
        }
    }

    /// Char offset of the editing cursor, if known.
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_is_code(&mut self, is_code: bool) {
        self.drafts.set_is_code(is_code);
    }

    pub fn set_language(&mut self, language: Language) {
        self.drafts.set_language(language);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.drafts.set_title(title);
    }

    pub fn set_tags(&mut self, tags: &str) {
        self.drafts.set_tags_str(tags);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.drafts.set_password(password);
    }

    pub fn set_expire_in(&mut self, seconds: Option<u64>) {
        self.drafts.set_expire_in(seconds);
    }

    pub fn set_private(&mut self, is_private: bool) {
        self.drafts.set_private(is_private);
    }

    pub fn set_font_size(&mut self, size: u8) -> Result<()> {
        self.drafts.set_font_size(size)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.drafts.set_theme(theme);
    }

    /// Enabling arms autosave immediately if the draft qualifies.
    pub fn set_auto_save(&mut self, enabled: bool) {
        self.drafts.set_auto_save(enabled);
        self.autosave.set_enabled(enabled);
        if enabled {
            let draft = self.drafts.draft();
            self.autosave
                .on_content_changed(&draft.content, self.drafts.is_dirty());
        }
    }

    /// Clear the draft (see [`DraftStore::clear`]).
    pub fn clear(&mut self, confirmed: bool) -> Result<bool> {
        if !self.drafts.clear(confirmed)? {
            return Ok(false);
        }
        self.edits.record("");
        self.autosave.cancel();
        self.notices.success("Content and files cleared");
        Ok(true)
    }

    /// Write the draft and preferences now.
    pub fn persist_now(&mut self) -> Result<()> {
        self.drafts.persist_now()
    }

    // --- saving ----------------------------------------------------------

    /// Create a snippet from the draft and return its id.
    ///
    /// An empty draft is rejected before any request. A final save
    /// (`as_draft == false`) also drops the persisted draft.
    pub async fn save(&mut self, as_draft: bool) -> Result<String> {
        let draft = self.drafts.draft();
        if !draft.is_saveable() {
            let msg = "Content or files cannot be empty.";
            self.notices.error(msg);
            return Err(Error::Validation(msg.to_string()));
        }

        let payload = SnippetPayload::for_create(draft, as_draft);
        let created = match self.api.create(&payload).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, "Save failed");
                self.notices
                    .error(e.user_message("Failed to save snippet. Please try again."));
                return Err(e);
            }
        };

        let entry = HistoryEntry::from_saved(created.id.clone(), self.drafts.draft());
        if let Err(e) = self.history.record(entry) {
            tracing::warn!(error = %e, "Could not record session history");
        }

        if !as_draft {
            self.drafts.remove_persisted()?;
        }

        let url = share_url(&self.share_origin, &created.id);
        tracing::info!(id = %created.id, draft = as_draft, "Snippet saved");
        self.notices.success(format!("Snippet saved! URL: {}", url));
        Ok(created.id)
    }

    // --- timers ----------------------------------------------------------

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.drafts.persist_deadline(),
            self.autosave.deadline(),
            self.search.deadline(),
        ])
    }

    /// Run every timer whose deadline has passed.
    pub async fn run_due_timers(&mut self) -> DueTimers {
        let persisted = match self.drafts.persist_if_due() {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(error = %e, "Draft persistence failed");
                self.notices.warning("Draft could not be saved locally");
                false
            }
        };

        let autosaved = self
            .autosave
            .run(&*self.api, &mut self.drafts, &mut self.notices)
            .await;

        let searched = self
            .search
            .run_if_due(&*self.api, &self.history, &mut self.notices)
            .await;

        DueTimers {
            persisted,
            autosaved,
            searched,
        }
    }

    // --- AI --------------------------------------------------------------

    /// Run an AI capability and apply its result to the draft.
    ///
    /// Returns `Err` only when the call was rejected before the network.
    pub async fn run_ai(&mut self, feature: AiFeature, prompt: &str) -> Result<Option<AiUpdate>> {
        let draft = self.drafts.draft();
        let ctx = AiContext {
            content: &draft.content,
            is_code: draft.is_code,
            language: draft.language,
            cursor: self.cursor,
            prompt,
        };
        let update = self
            .ai
            .run(&*self.api, feature, &ctx, &mut self.notices)
            .await?;

        if let Some(update) = &update {
            self.apply_ai_update(update.clone());
        }
        Ok(update)
    }

    pub fn apply_ai_update(&mut self, update: AiUpdate) {
        match update {
            AiUpdate::Suggestions(s) => self.drafts.update_metadata(|m| m.suggestions = s),
            AiUpdate::SecurityIssues(s) => self.drafts.update_metadata(|m| m.security_issues = s),
            AiUpdate::Explanation(e) => self.drafts.update_metadata(|m| m.explanation = e),
            AiUpdate::Summary(s) => self.drafts.update_metadata(|m| m.summary = s),
            AiUpdate::Tags(tags) => self.drafts.set_tags(tags),
            AiUpdate::Content { content, is_code } => {
                self.set_content(content);
                self.drafts.set_is_code(is_code);
            }
        }
    }

    /// Insert completion `index` at the cursor.
    pub fn apply_completion(&mut self, index: usize) -> bool {
        let applied = self
            .ai
            .apply_completion(&self.drafts.draft().content, self.cursor, index);
        match applied {
            Some(content) => {
                self.set_content(content);
                self.notices.success("Completion applied");
                true
            }
            None => false,
        }
    }

    /// Adopt the detected language; code mode follows it.
    pub fn apply_detected_language(&mut self) -> bool {
        let Some(language) = self.ai.detected_language() else {
            return false;
        };
        self.drafts.set_language(language);
        self.drafts.set_is_code(!language.is_plaintext());
        self.notices.success(format!("Applied language: {}", language));
        true
    }

    // --- history ---------------------------------------------------------

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search.set_term(term);
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search.set_mode(mode);
    }

    /// History entries for the current search.
    pub fn visible_history(&self) -> Vec<HistoryEntry> {
        self.search.visible(&self.history)
    }

    pub fn clear_history(&mut self, confirmed: bool) -> Result<bool> {
        let cleared = self.history.clear(confirmed)?;
        if cleared {
            self.notices.success("Session history cleared");
        }
        Ok(cleared)
    }

    // --- attachments -----------------------------------------------------

    /// Validate, upload and attach local files. Returns how many were added.
    pub async fn attach_files(&mut self, paths: &[PathBuf]) -> Result<usize> {
        let files = upload::prepare(paths, &mut self.notices)?;
        let stored = upload::upload(&*self.api, &files, &mut self.notices).await?;
        let count = stored.len();
        self.drafts.attach_files(stored);
        self.notices.success("Files added to snippet.");
        Ok(count)
    }

    // --- editor utilities ------------------------------------------------

    /// Char offset of the first case-insensitive match; moves the cursor.
    pub fn find(&mut self, term: &str) -> Option<usize> {
        if term.is_empty() {
            return None;
        }
        let found = text::find(&self.drafts.draft().content, term);
        match found {
            Some(offset) => {
                self.cursor = Some(offset);
                self.notices.success("Found match");
            }
            None => self.notices.error("No matches found"),
        }
        found
    }

    /// Replace every case-insensitive occurrence; returns the count.
    pub fn replace_all(&mut self, term: &str, replacement: &str) -> usize {
        if term.is_empty() {
            return 0;
        }
        let (content, count) = text::replace_all(&self.drafts.draft().content, term, replacement);
        self.set_content(content);
        self.notices.success(format!("Replaced {} occurrences", count));
        count
    }

    /// Pretty-print JSON content. Non-JSON code is left as is.
    pub fn format(&mut self) -> Result<bool> {
        let draft = self.drafts.draft();
        if !draft.is_code {
            return Ok(false);
        }
        if draft.language != Language::Json {
            self.notices.info("Nothing to format for this language");
            return Ok(false);
        }
        match text::format_json(&draft.content) {
            Ok(formatted) => {
                self.set_content(formatted);
                self.notices.success("Content formatted");
                Ok(true)
            }
            Err(e) => {
                self.notices.error("Failed to format content");
                Err(e)
            }
        }
    }

    /// Load a local text file as the draft.
    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_IMPORT_BYTES {
            let msg = "File too large. Maximum size is 5MB.";
            self.notices.error(msg);
            return Err(Error::Validation(msg.to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default().to_string();
        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Plaintext);

        self.set_content(content);
        self.drafts.set_title(stem);
        self.drafts.set_is_code(!language.is_plaintext());
        self.drafts.set_language(language);
        tracing::info!(path = %path.display(), language = %language, "Imported file");
        self.notices.success(format!(
            "File \"{}\" loaded. Language set to {}",
            file_name, language
        ));
        Ok(())
    }

    /// Write the draft (plus the attachment trailer) into `dir`.
    pub fn export(&mut self, dir: &Path) -> Result<PathBuf> {
        let draft = self.drafts.draft();
        let path = dir.join(draft.export_file_name());
        std::fs::write(&path, draft.export_text())?;
        self.notices.success("File downloaded");
        Ok(path)
    }

    /// Viewer for a snippet on the same server.
    pub fn open_viewer(&self, id: impl Into<String>) -> SnippetViewer {
        SnippetViewer::new(id, self.share_origin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, DRAFT_KEY};
    use async_trait::async_trait;
    use crate::api::{
        CompletionRequest, ContentRequest, CreatedSnippet, DetectRequest, GenerateRequest,
        UploadFile,
    };
    use crate::types::{Annotation, FileAttachment, Snippet};

    /// Rejects every call; the session must not reach it in these tests.
    struct Offline;

    fn offline<T>() -> Result<T> {
        Err(Error::Http("offline".to_string()))
    }

    #[async_trait]
    impl SnippetApi for Offline {
        async fn create(&self, _: &SnippetPayload) -> Result<CreatedSnippet> {
            offline()
        }
        async fn autosave(&self, _: &SnippetPayload) -> Result<()> {
            offline()
        }
        async fn fetch(&self, _: &str) -> Result<Snippet> {
            offline()
        }
        async fn verify(&self, _: &str, _: &str) -> Result<Snippet> {
            offline()
        }
        async fn analyze(&self, _: &ContentRequest) -> Result<Vec<Annotation>> {
            offline()
        }
        async fn complete(&self, _: &CompletionRequest) -> Result<Vec<String>> {
            offline()
        }
        async fn explain(&self, _: &ContentRequest) -> Result<String> {
            offline()
        }
        async fn tags(&self, _: &ContentRequest) -> Result<Vec<String>> {
            offline()
        }
        async fn generate(&self, _: &GenerateRequest) -> Result<String> {
            offline()
        }
        async fn security(&self, _: &ContentRequest) -> Result<Vec<Annotation>> {
            offline()
        }
        async fn summarize(&self, _: &ContentRequest) -> Result<String> {
            offline()
        }
        async fn detect_language(&self, _: &DetectRequest) -> Result<Language> {
            offline()
        }
        async fn search(&self, _: &str, _: &[HistoryEntry]) -> Result<Vec<HistoryEntry>> {
            offline()
        }
        async fn upload(&self, _: &[UploadFile]) -> Result<Vec<FileAttachment>> {
            offline()
        }
    }

    fn session() -> (SharedStore, EditorSession) {
        let persistent = MemoryStore::shared();
        let session = EditorSession::open(
            Arc::new(Offline),
            persistent.clone(),
            MemoryStore::shared(),
            &EditorConfig::default(),
            "http://localhost:5000",
        );
        (persistent, session)
    }

    #[test]
    fn test_undo_redo_through_session() {
        let (_, mut s) = session();
        s.set_content("a");
        s.set_content("ab");
        assert!(s.undo());
        assert_eq!(s.draft().content, "a");
        assert!(s.redo());
        assert_eq!(s.draft().content, "ab");

        s.undo();
        s.set_content("ax");
        assert!(!s.redo());
    }

    #[tokio::test]
    async fn test_empty_save_rejected() {
        let (_, mut s) = session();
        s.set_content("   ");
        let err = s.save(false).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let notices = s.drain_notices();
        assert_eq!(notices[0].message, "Content or files cannot be empty.");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let (store, mut s) = session();
        s.set_content("keep");
        s.persist_now().unwrap();
        assert!(s.save(false).await.is_err());
        assert!(store.get(DRAFT_KEY).unwrap().is_some());
        assert!(s.history().is_empty());
        assert_eq!(
            s.drain_notices().last().map(|n| n.message.clone()),
            Some("Failed to save snippet. Please try again.".to_string())
        );
    }

    #[tokio::test]
    async fn test_detection_falls_back_offline() {
        let (_, mut s) = session();
        s.set_content("def foo():\n    pass");
        s.ai_mut().set_enabled(AiFeature::LanguageDetection, true);

        let update = s.run_ai(AiFeature::LanguageDetection, "").await.unwrap();
        assert!(update.is_none());
        assert_eq!(s.ai().detected_language(), Some(Language::Python));

        assert!(s.apply_detected_language());
        assert_eq!(s.draft().language, Language::Python);
        assert!(s.draft().is_code);
    }

    #[test]
    fn test_replace_and_find() {
        let (_, mut s) = session();
        s.set_content("Foo foo FOO bar");
        assert_eq!(s.replace_all("foo", "baz"), 3);
        assert_eq!(s.draft().content, "baz baz baz bar");
        assert_eq!(s.find("BAR"), Some(12));
        assert_eq!(s.cursor(), Some(12));
        assert!(s.undo());
        assert_eq!(s.draft().content, "Foo foo FOO bar");
    }

    #[test]
    fn test_format_json_only() {
        let (_, mut s) = session();
        s.set_content("{\"a\":1}");
        assert!(!s.format().unwrap());

        s.set_is_code(true);
        s.set_language(Language::Json);
        assert!(s.format().unwrap());
        assert_eq!(s.draft().content, "{\n  \"a\": 1\n}");

        s.set_content("{broken");
        assert!(s.format().is_err());
        assert_eq!(s.draft().content, "{broken");
    }

    #[test]
    fn test_import_and_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("script.min.py");
        std::fs::write(&src, "print('hi')\n").unwrap();

        let (_, mut s) = session();
        s.import_file(&src).unwrap();
        assert_eq!(s.draft().title, "script");
        assert_eq!(s.draft().language, Language::Python);
        assert!(s.draft().is_code);

        let out = s.export(dir.path()).unwrap();
        assert_eq!(out.file_name().unwrap(), "script.python");
        assert_eq!(std::fs::read_to_string(out).unwrap(), "print('hi')\n");
    }

    #[test]
    fn test_clear_resets_and_snapshots() {
        let (_, mut s) = session();
        s.set_content("gone soon");
        assert!(!s.clear(false).unwrap());
        assert!(s.clear(true).unwrap());
        assert_eq!(s.draft().content, "");
        assert!(s.undo());
        assert_eq!(s.draft().content, "gone soon");
    }
}
