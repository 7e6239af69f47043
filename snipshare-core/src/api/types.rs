//! Request and response bodies for the snippet API
//!
//! One struct per endpoint, decoded at the boundary. Response fields
//! default when absent so a sparse server reply never fails to decode.

use serde::{Deserialize, Serialize};

use crate::text::CursorPosition;
use crate::types::{AiMetadata, Annotation, Draft, FileAttachment, HistoryEntry, Language};

/// Body for `POST /` and `POST /autosave`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPayload {
    pub content: String,
    pub is_code: bool,
    pub language: Language,
    pub password: String,
    #[serde(with = "crate::types::expire_in")]
    pub expire_in: Option<u64>,
    pub title: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub is_draft: bool,
    pub ai_metadata: AiMetadata,
}

impl SnippetPayload {
    fn from_draft(draft: &Draft, title: String, is_draft: bool) -> Self {
        Self {
            content: draft.content.clone(),
            is_code: draft.is_code,
            language: draft.effective_language(),
            password: draft.password.clone(),
            expire_in: draft.expire_in,
            title,
            tags: draft.tags.clone(),
            is_private: draft.is_private,
            is_draft,
            ai_metadata: draft.ai_metadata.clone(),
        }
    }

    /// Payload for an explicit save; an empty title gets the default.
    pub fn for_create(draft: &Draft, is_draft: bool) -> Self {
        let title = if draft.title.is_empty() {
            draft.default_title()
        } else {
            draft.title.clone()
        };
        Self::from_draft(draft, title, is_draft)
    }

    /// Payload for a background autosave; always a draft, title as typed.
    pub fn for_autosave(draft: &Draft) -> Self {
        Self::from_draft(draft, draft.title.clone(), true)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSnippet {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    pub password: &'a str,
}

/// Body shared by analyze, explain, tags, security and summarize.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest {
    pub content: String,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub content: String,
    pub language: Language,
    pub cursor_position: CursorPosition,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
    pub history: &'a [HistoryEntry],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SuggestionsResponse {
    pub suggestions: Vec<Annotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CompletionsResponse {
    pub completions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ExplanationResponse {
    pub explanation: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GeneratedResponse {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SecurityResponse {
    pub security_issues: Vec<Annotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DetectResponse {
    pub language: Language,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchResponse {
    pub results: Vec<HistoryEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UploadResponse {
    pub files: Vec<FileAttachment>,
}

/// `{ "message": "..." }` returned with non-success statuses.
///
/// A locked snippet may also answer `GET /{id}` with an error status and
/// `requiresPassword: true`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ErrorEnvelope {
    pub message: Option<String>,
    pub requires_password: bool,
}

/// A validated file ready for the multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
