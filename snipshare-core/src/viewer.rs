//! Read-only snippet viewer
//!
//! `Loading` moves to `PasswordRequired`, `Loaded` or `Error` after the
//! first fetch. A locked snippet stays in `PasswordRequired` until the
//! server accepts a password. Once loaded, analyze and summarize only ever
//! touch the snippet's AI metadata.

use crate::api::{ContentRequest, SnippetApi};
use crate::error::{Error, Result};
use crate::notice::Notices;
use crate::types::Snippet;

pub const NOT_FOUND_MESSAGE: &str = "Snippet not found or has expired.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerState {
    Loading,
    PasswordRequired { error: Option<String> },
    Loaded(Box<Snippet>),
    Error(String),
}

pub struct SnippetViewer {
    id: String,
    origin: String,
    state: ViewerState,
}

impl SnippetViewer {
    /// `origin` is the public site root used for share links.
    pub fn new(id: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            state: ViewerState::Loading,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn snippet(&self) -> Option<&Snippet> {
        match &self.state {
            ViewerState::Loaded(snippet) => Some(&**snippet),
            _ => None,
        }
    }

    pub async fn load(&mut self, api: &dyn SnippetApi, notices: &mut Notices) {
        self.state = ViewerState::Loading;
        match api.fetch(&self.id).await {
            Ok(snippet) if snippet.requires_password => {
                tracing::debug!(id = %self.id, "Snippet is password protected");
                self.state = ViewerState::PasswordRequired { error: None };
            }
            Ok(snippet) => {
                tracing::debug!(id = %self.id, "Snippet loaded");
                self.state = ViewerState::Loaded(Box::new(snippet));
            }
            Err(e) => {
                let message = e.user_message(NOT_FOUND_MESSAGE);
                tracing::warn!(id = %self.id, error = %e, "Snippet fetch failed");
                notices.error(message.clone());
                self.state = ViewerState::Error(message);
            }
        }
    }

    /// Unlock a protected snippet.
    ///
    /// An empty password is rejected without a request. A rejected
    /// password keeps the viewer in `PasswordRequired` with the error inline.
    pub async fn submit_password(
        &mut self,
        api: &dyn SnippetApi,
        password: &str,
        notices: &mut Notices,
    ) -> Result<()> {
        if !matches!(self.state, ViewerState::PasswordRequired { .. }) {
            return Err(Error::Validation("This snippet is not password protected".to_string()));
        }
        if password.is_empty() {
            let message = "Password is required.".to_string();
            notices.error(message.clone());
            self.state = ViewerState::PasswordRequired {
                error: Some(message.clone()),
            };
            return Err(Error::Validation(message));
        }

        match api.verify(&self.id, password).await {
            Ok(snippet) => {
                self.state = ViewerState::Loaded(Box::new(snippet));
                notices.success("Access granted!");
                Ok(())
            }
            Err(e) => {
                let message = e.user_message("Failed to verify password.");
                tracing::info!(id = %self.id, error = %e, "Password rejected");
                notices.error(message.clone());
                self.state = ViewerState::PasswordRequired {
                    error: Some(message),
                };
                Err(e)
            }
        }
    }

    fn content_request(&self) -> Option<ContentRequest> {
        let snippet = self.snippet()?;
        if snippet.content.is_empty() {
            return None;
        }
        Some(ContentRequest {
            content: snippet.content.clone(),
            language: snippet.language,
        })
    }

    fn loaded_mut(&mut self) -> Option<&mut Snippet> {
        match &mut self.state {
            ViewerState::Loaded(snippet) => Some(&mut **snippet),
            _ => None,
        }
    }

    /// Fetch suggestions and merge them into the snippet. Returns whether
    /// they were applied.
    pub async fn analyze(&mut self, api: &dyn SnippetApi, notices: &mut Notices) -> bool {
        let Some(request) = self.content_request() else {
            return false;
        };
        match api.analyze(&request).await {
            Ok(suggestions) => {
                if let Some(snippet) = self.loaded_mut() {
                    snippet.ai_metadata.suggestions = suggestions;
                }
                notices.success("Code analyzed!");
                true
            }
            Err(e) => {
                notices.error(e.user_message("Failed to analyze code."));
                false
            }
        }
    }

    /// Fetch a summary and merge it into the snippet.
    pub async fn summarize(&mut self, api: &dyn SnippetApi, notices: &mut Notices) -> bool {
        let Some(request) = self.content_request() else {
            return false;
        };
        match api.summarize(&request).await {
            Ok(summary) => {
                if let Some(snippet) = self.loaded_mut() {
                    snippet.ai_metadata.summary = summary;
                }
                notices.success("Summary generated!");
                true
            }
            Err(e) => {
                notices.error(e.user_message("Failed to generate summary."));
                false
            }
        }
    }

    /// `<origin>/<id>`
    pub fn share_url(&self) -> String {
        share_url(&self.origin, &self.id)
    }

    pub fn export_file_name(&self) -> Option<String> {
        self.snippet().map(Snippet::export_file_name)
    }
}

/// Public link for snippet `id`.
pub fn share_url(origin: &str, id: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url() {
        assert_eq!(share_url("https://snips.example.com/", "abc"), "https://snips.example.com/abc");
        let viewer = SnippetViewer::new("xyz", "http://localhost:5000");
        assert_eq!(viewer.share_url(), "http://localhost:5000/xyz");
        assert_eq!(viewer.state(), &ViewerState::Loading);
        assert_eq!(viewer.export_file_name(), None);
    }
}
