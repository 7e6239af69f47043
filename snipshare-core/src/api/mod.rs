//! Snippet API port
//!
//! Everything the session needs from the remote service is behind the
//! [`SnippetApi`] trait. [`HttpSnippetApi`] talks to the real server; tests
//! substitute an in-memory fake.
//!
//! Failures come back as [`Error::Api`](crate::Error::Api) carrying the
//! envelope message (possibly empty) or [`Error::Http`](crate::Error::Http)
//! for transport problems. Callers pick their own fallback text through
//! [`Error::user_message`](crate::Error::user_message).

mod client;
mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Annotation, FileAttachment, HistoryEntry, Language, Snippet};

pub use client::HttpSnippetApi;
pub use types::{
    CompletionRequest, ContentRequest, CreatedSnippet, DetectRequest, GenerateRequest,
    SnippetPayload, UploadFile,
};

#[async_trait]
pub trait SnippetApi: Send + Sync {
    /// `POST /`: persist a snippet, returning its id.
    async fn create(&self, payload: &SnippetPayload) -> Result<CreatedSnippet>;

    /// `POST /autosave`: push a draft; the response body is ignored.
    async fn autosave(&self, payload: &SnippetPayload) -> Result<()>;

    /// `GET /{id}`: a locked snippet comes back with only
    /// `requires_password` set.
    async fn fetch(&self, id: &str) -> Result<Snippet>;

    /// `POST /verify/{id}`: unlock a password-protected snippet.
    async fn verify(&self, id: &str, password: &str) -> Result<Snippet>;

    async fn analyze(&self, request: &ContentRequest) -> Result<Vec<Annotation>>;

    async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>>;

    async fn explain(&self, request: &ContentRequest) -> Result<String>;

    async fn tags(&self, request: &ContentRequest) -> Result<Vec<String>>;

    async fn generate(&self, request: &GenerateRequest) -> Result<String>;

    async fn security(&self, request: &ContentRequest) -> Result<Vec<Annotation>>;

    async fn summarize(&self, request: &ContentRequest) -> Result<String>;

    async fn detect_language(&self, request: &DetectRequest) -> Result<Language>;

    /// `POST /search`: semantic ranking over the caller's history.
    async fn search(&self, query: &str, history: &[HistoryEntry]) -> Result<Vec<HistoryEntry>>;

    /// `POST /upload-multimedia`: multipart upload under the `files` field.
    async fn upload(&self, files: &[UploadFile]) -> Result<Vec<FileAttachment>>;
}
