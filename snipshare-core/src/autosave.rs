//! Autosave scheduler
//!
//! Idle until a content change arrives while autosave is enabled, the
//! content is non-blank and the draft is dirty; then pending for the
//! configured delay. Every further qualifying change restarts the delay.
//! When the delay elapses the owner calls [`Autosave::run`], which posts
//! the draft once. Failures are reported, never retried.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::api::{SnippetApi, SnippetPayload};
use crate::draft::DraftStore;
use crate::notice::Notices;
use crate::schedule::Debounce;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending,
}

#[derive(Debug)]
pub struct Autosave {
    enabled: bool,
    timer: Debounce,
    last_saved: Option<DateTime<Utc>>,
}

impl Autosave {
    pub fn new(enabled: bool, delay: Duration) -> Self {
        Self {
            enabled,
            timer: Debounce::new(delay),
            last_saved: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning autosave off drops any pending save without side effects.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.timer.is_pending() {
            tracing::debug!("Autosave disabled; pending save cancelled");
            self.timer.cancel();
        }
    }

    pub fn state(&self) -> AutosaveState {
        if self.timer.is_pending() {
            AutosaveState::Pending
        } else {
            AutosaveState::Idle
        }
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// React to a content change. Returns whether the timer was (re)armed.
    pub fn on_content_changed(&mut self, content: &str, dirty: bool) -> bool {
        if self.enabled && dirty && !content.trim().is_empty() {
            self.timer.arm();
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Post the draft if the delay has elapsed.
    ///
    /// Returns true when an autosave succeeded.
    pub async fn run(
        &mut self,
        api: &dyn SnippetApi,
        drafts: &mut DraftStore,
        notices: &mut Notices,
    ) -> bool {
        if !self.timer.fire_if_due() {
            return false;
        }
        if !drafts.draft().has_content() {
            return false;
        }

        let payload = SnippetPayload::for_autosave(drafts.draft());
        match api.autosave(&payload).await {
            Ok(()) => {
                self.last_saved = Some(Utc::now());
                drafts.mark_clean();
                tracing::info!("Autosaved draft");
                notices.success("Auto-saved");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Autosave failed");
                notices.error("Auto-save failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_arms_only_when_eligible() {
        let mut autosave = Autosave::new(false, Duration::from_secs(2));
        assert!(!autosave.on_content_changed("code", true));

        autosave.set_enabled(true);
        assert!(!autosave.on_content_changed("   ", true));
        assert!(!autosave.on_content_changed("code", false));
        assert_eq!(autosave.state(), AutosaveState::Idle);

        assert!(autosave.on_content_changed("code", true));
        assert_eq!(autosave.state(), AutosaveState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_cancels_pending() {
        let mut autosave = Autosave::new(true, Duration::from_secs(2));
        autosave.on_content_changed("code", true);
        autosave.set_enabled(false);
        assert_eq!(autosave.state(), AutosaveState::Idle);
        assert_eq!(autosave.deadline(), None);
    }
}
