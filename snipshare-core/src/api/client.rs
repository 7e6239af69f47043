//! HTTP client for the snippet REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiEndpoint;
use crate::error::{Error, Result};
use crate::types::{Annotation, FileAttachment, HistoryEntry, Language, Snippet};

use super::types::*;
use super::SnippetApi;

/// reqwest-backed [`SnippetApi`].
pub struct HttpSnippetApi {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSnippetApi {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: &ApiEndpoint, timeout: Duration) -> Result<Self> {
        let base_url = endpoint.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("api.base_url is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        tracing::debug!(base_url = %base_url, source = ?endpoint.source, "Snippet API client ready");

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("HTTP request failed: {}", e)))?;

        decode(response).await
    }
}

/// Decode a success body, or turn the error envelope into [`Error::Api`].
async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let status = response.status();

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| Error::Http(format!("failed to parse response: {}", e)));
    }

    Err(api_error(status, response).await)
}

async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, "API error");
    Error::Api {
        status: status.as_u16(),
        message: envelope.message.unwrap_or_default(),
    }
}

#[async_trait]
impl SnippetApi for HttpSnippetApi {
    async fn create(&self, payload: &SnippetPayload) -> Result<CreatedSnippet> {
        self.post_json("/", payload).await
    }

    async fn autosave(&self, payload: &SnippetPayload) -> Result<()> {
        let _: serde_json::Value = self.post_json("/autosave", payload).await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Snippet> {
        let url = self.url(&format!("/{}", urlencoding::encode(id)));
        tracing::debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return decode(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
        if envelope.requires_password {
            return Ok(Snippet {
                id: id.to_string(),
                requires_password: true,
                ..Default::default()
            });
        }

        tracing::warn!(status = status.as_u16(), body = %body, "API error");
        Err(Error::Api {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_default(),
        })
    }

    async fn verify(&self, id: &str, password: &str) -> Result<Snippet> {
        let path = format!("/verify/{}", urlencoding::encode(id));
        self.post_json(&path, &VerifyRequest { password }).await
    }

    async fn analyze(&self, request: &ContentRequest) -> Result<Vec<Annotation>> {
        let resp: SuggestionsResponse = self.post_json("/analyze", request).await?;
        Ok(resp.suggestions)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>> {
        let resp: CompletionsResponse = self.post_json("/complete", request).await?;
        Ok(resp.completions)
    }

    async fn explain(&self, request: &ContentRequest) -> Result<String> {
        let resp: ExplanationResponse = self.post_json("/explain", request).await?;
        Ok(resp.explanation)
    }

    async fn tags(&self, request: &ContentRequest) -> Result<Vec<String>> {
        let resp: TagsResponse = self.post_json("/tags", request).await?;
        Ok(resp.tags)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let resp: GeneratedResponse = self.post_json("/generate", request).await?;
        Ok(resp.content)
    }

    async fn security(&self, request: &ContentRequest) -> Result<Vec<Annotation>> {
        let resp: SecurityResponse = self.post_json("/security", request).await?;
        Ok(resp.security_issues)
    }

    async fn summarize(&self, request: &ContentRequest) -> Result<String> {
        let resp: SummaryResponse = self.post_json("/summarize", request).await?;
        Ok(resp.summary)
    }

    async fn detect_language(&self, request: &DetectRequest) -> Result<Language> {
        let resp: DetectResponse = self.post_json("/detect-language", request).await?;
        Ok(resp.language)
    }

    async fn search(&self, query: &str, history: &[HistoryEntry]) -> Result<Vec<HistoryEntry>> {
        let resp: SearchResponse = self
            .post_json("/search", &SearchRequest { query, history })
            .await?;
        Ok(resp.results)
    }

    async fn upload(&self, files: &[UploadFile]) -> Result<Vec<FileAttachment>> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| Error::Validation(format!("invalid file type {}: {}", file.mime_type, e)))?;
            form = form.part("files", part);
        }

        let url = self.url("/upload-multimedia");
        tracing::debug!(url = %url, count = files.len(), "POST multipart");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Http(format!("HTTP request failed: {}", e)))?;

        let resp: UploadResponse = decode(response).await?;
        Ok(resp.files)
    }
}
