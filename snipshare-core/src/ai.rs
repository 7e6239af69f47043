//! AI feature orchestration
//!
//! Eight independent capabilities, each with an enable flag, a loading
//! flag, an inline error slot and its latest result. A call is split in
//! three steps so the loading state is observable while the request is in
//! flight:
//!
//! 1. [`AiOrchestrator::begin`] checks the flag and the preconditions, sets
//!    loading, and builds the request. Nothing touches the network when it
//!    fails.
//! 2. [`execute`] performs the request.
//! 3. [`AiOrchestrator::complete`] clears loading, stores the result or the
//!    error, and returns the [`AiUpdate`] the caller applies to its draft.
//!
//! Capabilities never block each other.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::{CompletionRequest, ContentRequest, DetectRequest, GenerateRequest, SnippetApi};
use crate::detect::detect_language;
use crate::error::{Error, Result};
use crate::notice::Notices;
use crate::text::{insert_at, CursorPosition};
use crate::types::{Annotation, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiFeature {
    Analysis,
    Completion,
    Explanation,
    TagGeneration,
    ContentGeneration,
    SecurityCheck,
    Summarization,
    LanguageDetection,
}

impl AiFeature {
    pub const ALL: [AiFeature; 8] = [
        AiFeature::Analysis,
        AiFeature::Completion,
        AiFeature::Explanation,
        AiFeature::TagGeneration,
        AiFeature::ContentGeneration,
        AiFeature::SecurityCheck,
        AiFeature::Summarization,
        AiFeature::LanguageDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiFeature::Analysis => "analysis",
            AiFeature::Completion => "completion",
            AiFeature::Explanation => "explanation",
            AiFeature::TagGeneration => "tag-generation",
            AiFeature::ContentGeneration => "content-generation",
            AiFeature::SecurityCheck => "security-check",
            AiFeature::Summarization => "summarization",
            AiFeature::LanguageDetection => "language-detection",
        }
    }

    /// Short command-style alias.
    pub fn alias(&self) -> &'static str {
        match self {
            AiFeature::Analysis => "analyze",
            AiFeature::Completion => "complete",
            AiFeature::Explanation => "explain",
            AiFeature::TagGeneration => "tags",
            AiFeature::ContentGeneration => "generate",
            AiFeature::SecurityCheck => "security",
            AiFeature::Summarization => "summarize",
            AiFeature::LanguageDetection => "detect",
        }
    }

    /// Analysis, completion and security checks only run in code mode.
    pub fn requires_code(&self) -> bool {
        matches!(
            self,
            AiFeature::Analysis | AiFeature::Completion | AiFeature::SecurityCheck
        )
    }

    /// Notice shown when the precondition check fails.
    fn precondition_message(&self) -> &'static str {
        match self {
            AiFeature::Analysis => "Please enter code to analyze",
            AiFeature::Completion => "Please enter code to complete",
            AiFeature::Explanation => "Please enter content to explain",
            AiFeature::TagGeneration => "Please enter content to generate tags",
            AiFeature::ContentGeneration => "Please enter a prompt to generate content",
            AiFeature::SecurityCheck => "Please enter code to check for security issues",
            AiFeature::Summarization => "Please enter content to summarize",
            AiFeature::LanguageDetection => "Please enter content to detect language",
        }
    }

    /// Message used when the API error carries none.
    pub fn failure_message(&self) -> &'static str {
        match self {
            AiFeature::Analysis => "Failed to analyze code",
            AiFeature::Completion => "Failed to generate completions",
            AiFeature::Explanation => "Failed to generate explanation",
            AiFeature::TagGeneration => "Failed to generate tags",
            AiFeature::ContentGeneration => "Failed to generate content",
            AiFeature::SecurityCheck => "Failed to perform security check",
            AiFeature::Summarization => "Failed to generate summary",
            AiFeature::LanguageDetection => "Failed to detect language",
        }
    }
}

impl fmt::Display for AiFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiFeature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        AiFeature::ALL
            .into_iter()
            .find(|f| f.as_str() == needle || f.alias() == needle)
            .ok_or_else(|| Error::Validation(format!("unknown AI capability: {}", s)))
    }
}

/// Editor state a capability reads when it starts.
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    pub content: &'a str,
    pub is_code: bool,
    pub language: Language,
    /// Char offset of the cursor, if the front end tracks one.
    pub cursor: Option<usize>,
    /// Prompt for content generation.
    pub prompt: &'a str,
}

/// A request that passed its preconditions.
#[derive(Debug, Clone)]
pub enum AiRequest {
    Analyze(ContentRequest),
    Complete(CompletionRequest),
    Explain(ContentRequest),
    Tags(ContentRequest),
    Generate(GenerateRequest),
    Security(ContentRequest),
    Summarize(ContentRequest),
    Detect(DetectRequest),
}

impl AiRequest {
    pub fn feature(&self) -> AiFeature {
        match self {
            AiRequest::Analyze(_) => AiFeature::Analysis,
            AiRequest::Complete(_) => AiFeature::Completion,
            AiRequest::Explain(_) => AiFeature::Explanation,
            AiRequest::Tags(_) => AiFeature::TagGeneration,
            AiRequest::Generate(_) => AiFeature::ContentGeneration,
            AiRequest::Security(_) => AiFeature::SecurityCheck,
            AiRequest::Summarize(_) => AiFeature::Summarization,
            AiRequest::Detect(_) => AiFeature::LanguageDetection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiResult {
    Suggestions(Vec<Annotation>),
    Completions(Vec<String>),
    Explanation(String),
    Tags(Vec<String>),
    Generated { content: String, language: Language },
    SecurityIssues(Vec<Annotation>),
    Summary(String),
    DetectedLanguage { language: Language, heuristic: bool },
}

/// Change to apply to the draft after a successful call.
///
/// Completions and detected languages need an explicit apply step and
/// produce no update on their own.
#[derive(Debug, Clone, PartialEq)]
pub enum AiUpdate {
    Suggestions(Vec<Annotation>),
    SecurityIssues(Vec<Annotation>),
    Explanation(String),
    Summary(String),
    Tags(Vec<String>),
    Content { content: String, is_code: bool },
}

#[derive(Debug, Clone, Default)]
pub struct FeatureState {
    pub enabled: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<AiResult>,
}

#[derive(Debug, Default)]
pub struct AiOrchestrator {
    features: HashMap<AiFeature, FeatureState>,
}

impl AiOrchestrator {
    /// All capabilities start disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, feature: AiFeature) -> FeatureState {
        self.features.get(&feature).cloned().unwrap_or_default()
    }

    fn state_mut(&mut self, feature: AiFeature) -> &mut FeatureState {
        self.features.entry(feature).or_default()
    }

    pub fn set_enabled(&mut self, feature: AiFeature, enabled: bool) {
        self.state_mut(feature).enabled = enabled;
    }

    pub fn is_enabled(&self, feature: AiFeature) -> bool {
        self.features.get(&feature).is_some_and(|s| s.enabled)
    }

    pub fn is_loading(&self, feature: AiFeature) -> bool {
        self.features.get(&feature).is_some_and(|s| s.loading)
    }

    pub fn error(&self, feature: AiFeature) -> Option<&str> {
        self.features.get(&feature).and_then(|s| s.error.as_deref())
    }

    pub fn result(&self, feature: AiFeature) -> Option<&AiResult> {
        self.features.get(&feature).and_then(|s| s.result.as_ref())
    }

    /// Enabled and not already running.
    pub fn can_invoke(&self, feature: AiFeature) -> bool {
        self.is_enabled(feature) && !self.is_loading(feature)
    }

    /// Validate and start a call.
    ///
    /// On rejection nothing changes except the queued error notice.
    pub fn begin(
        &mut self,
        feature: AiFeature,
        ctx: &AiContext<'_>,
        notices: &mut Notices,
    ) -> Result<AiRequest> {
        if !self.is_enabled(feature) {
            let msg = format!("Enable {} first", feature);
            notices.error(msg.clone());
            return Err(Error::Validation(msg));
        }
        if self.is_loading(feature) {
            return Err(Error::Validation(format!("{} is already running", feature)));
        }

        let content_missing = ctx.content.trim().is_empty();
        let rejected = match feature {
            AiFeature::ContentGeneration => ctx.prompt.trim().is_empty(),
            f if f.requires_code() => !ctx.is_code || content_missing,
            _ => content_missing,
        };
        if rejected {
            let msg = feature.precondition_message();
            notices.error(msg);
            return Err(Error::Validation(msg.to_string()));
        }

        let content_request = || ContentRequest {
            content: ctx.content.to_string(),
            language: ctx.language,
        };
        let request = match feature {
            AiFeature::Analysis => AiRequest::Analyze(content_request()),
            AiFeature::Completion => {
                let offset = ctx.cursor.unwrap_or_else(|| ctx.content.chars().count());
                AiRequest::Complete(CompletionRequest {
                    content: ctx.content.to_string(),
                    language: ctx.language,
                    cursor_position: CursorPosition::at(ctx.content, offset),
                })
            }
            AiFeature::Explanation => AiRequest::Explain(content_request()),
            AiFeature::TagGeneration => AiRequest::Tags(content_request()),
            AiFeature::ContentGeneration => AiRequest::Generate(GenerateRequest {
                prompt: ctx.prompt.to_string(),
                language: ctx.language,
            }),
            AiFeature::SecurityCheck => AiRequest::Security(content_request()),
            AiFeature::Summarization => AiRequest::Summarize(content_request()),
            AiFeature::LanguageDetection => AiRequest::Detect(DetectRequest {
                content: ctx.content.to_string(),
            }),
        };

        let state = self.state_mut(feature);
        state.loading = true;
        state.error = None;
        tracing::debug!(feature = %feature, "AI request started");
        Ok(request)
    }

    /// Finish a call started with [`begin`](Self::begin).
    pub fn complete(
        &mut self,
        feature: AiFeature,
        outcome: Result<AiResult>,
        notices: &mut Notices,
    ) -> Option<AiUpdate> {
        let state = self.state_mut(feature);
        state.loading = false;

        match outcome {
            Ok(result) => {
                let (message, update) = match &result {
                    AiResult::Suggestions(s) => (
                        "Code analyzed successfully".to_string(),
                        Some(AiUpdate::Suggestions(s.clone())),
                    ),
                    AiResult::Completions(_) => ("Completions generated".to_string(), None),
                    AiResult::Explanation(e) => (
                        "Explanation generated".to_string(),
                        Some(AiUpdate::Explanation(e.clone())),
                    ),
                    AiResult::Tags(t) => ("Tags generated".to_string(), Some(AiUpdate::Tags(t.clone()))),
                    AiResult::Generated { content, language } => (
                        "Content generated".to_string(),
                        Some(AiUpdate::Content {
                            content: content.clone(),
                            is_code: !language.is_plaintext(),
                        }),
                    ),
                    AiResult::SecurityIssues(s) => (
                        "Security check completed".to_string(),
                        Some(AiUpdate::SecurityIssues(s.clone())),
                    ),
                    AiResult::Summary(s) => (
                        "Summary generated".to_string(),
                        Some(AiUpdate::Summary(s.clone())),
                    ),
                    AiResult::DetectedLanguage { language, heuristic } => {
                        let msg = if *heuristic {
                            format!("Detected language (heuristic): {}", language)
                        } else {
                            format!("Detected language: {}", language)
                        };
                        (msg, None)
                    }
                };
                state.result = Some(result);
                tracing::info!(feature = %feature, "AI request succeeded");
                notices.success(message);
                update
            }
            Err(e) => {
                let message = e.user_message(feature.failure_message());
                tracing::warn!(feature = %feature, error = %e, "AI request failed");
                state.error = Some(message.clone());
                state.result = None;
                notices.error(message);
                None
            }
        }
    }

    /// `begin`, `execute` and `complete` in one go.
    ///
    /// Returns `Err` only when the call was rejected before the network.
    pub async fn run(
        &mut self,
        api: &dyn SnippetApi,
        feature: AiFeature,
        ctx: &AiContext<'_>,
        notices: &mut Notices,
    ) -> Result<Option<AiUpdate>> {
        let request = self.begin(feature, ctx, notices)?;
        let outcome = execute(api, &request).await;
        Ok(self.complete(feature, outcome, notices))
    }

    /// Latest completion candidates.
    pub fn completions(&self) -> &[String] {
        match self.result(AiFeature::Completion) {
            Some(AiResult::Completions(c)) => c,
            _ => &[],
        }
    }

    pub fn detected_language(&self) -> Option<Language> {
        match self.result(AiFeature::LanguageDetection) {
            Some(AiResult::DetectedLanguage { language, .. }) => Some(*language),
            _ => None,
        }
    }

    /// Content with completion `index` inserted at `cursor`
    /// (end of content when unknown).
    pub fn apply_completion(&self, content: &str, cursor: Option<usize>, index: usize) -> Option<String> {
        let text = self.completions().get(index)?;
        Some(insert_at(content, cursor, text))
    }

    /// Drop every stored result and error; flags are kept.
    pub fn clear_results(&mut self) {
        for state in self.features.values_mut() {
            state.result = None;
            state.error = None;
        }
    }
}

/// Perform `request` against the API.
///
/// Language detection never fails: a remote error falls back to the
/// heuristic detector.
pub async fn execute(api: &dyn SnippetApi, request: &AiRequest) -> Result<AiResult> {
    match request {
        AiRequest::Analyze(req) => api.analyze(req).await.map(AiResult::Suggestions),
        AiRequest::Complete(req) => api.complete(req).await.map(AiResult::Completions),
        AiRequest::Explain(req) => api.explain(req).await.map(AiResult::Explanation),
        AiRequest::Tags(req) => api.tags(req).await.map(AiResult::Tags),
        AiRequest::Generate(req) => api.generate(req).await.map(|content| AiResult::Generated {
            content,
            language: req.language,
        }),
        AiRequest::Security(req) => api.security(req).await.map(AiResult::SecurityIssues),
        AiRequest::Summarize(req) => api.summarize(req).await.map(AiResult::Summary),
        AiRequest::Detect(req) => match api.detect_language(req).await {
            Ok(language) => Ok(AiResult::DetectedLanguage {
                language,
                heuristic: false,
            }),
            Err(e) => {
                tracing::info!(error = %e, "Remote language detection failed; using heuristic");
                Ok(AiResult::DetectedLanguage {
                    language: detect_language(&req.content),
                    heuristic: true,
                })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(content: &'a str, is_code: bool) -> AiContext<'a> {
        AiContext {
            content,
            is_code,
            language: Language::Python,
            cursor: None,
            prompt: "",
        }
    }

    fn enabled_all() -> AiOrchestrator {
        let mut ai = AiOrchestrator::new();
        for f in AiFeature::ALL {
            ai.set_enabled(f, true);
        }
        ai
    }

    #[test]
    fn test_feature_names_parse() {
        for f in AiFeature::ALL {
            assert_eq!(f.as_str().parse::<AiFeature>().unwrap(), f);
            assert_eq!(f.alias().parse::<AiFeature>().unwrap(), f);
        }
        assert!("teleport".parse::<AiFeature>().is_err());
    }

    #[test]
    fn test_disabled_by_default() {
        let mut ai = AiOrchestrator::new();
        let mut notices = Notices::new();
        assert!(!ai.can_invoke(AiFeature::Summarization));
        assert!(ai
            .begin(AiFeature::Summarization, &ctx("text", false), &mut notices)
            .is_err());
        assert!(!ai.is_loading(AiFeature::Summarization));
    }

    #[test]
    fn test_code_preconditions() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();

        let err = ai
            .begin(AiFeature::Analysis, &ctx("print(1)", false), &mut notices)
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter code to analyze");
        assert!(ai.begin(AiFeature::SecurityCheck, &ctx("  ", true), &mut notices).is_err());
        assert!(ai.begin(AiFeature::Explanation, &ctx("prose", false), &mut notices).is_ok());
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn test_generation_needs_prompt() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        let mut c = ctx("", false);
        assert!(ai.begin(AiFeature::ContentGeneration, &c, &mut notices).is_err());
        c.prompt = "a todo list";
        assert!(ai.begin(AiFeature::ContentGeneration, &c, &mut notices).is_ok());
    }

    #[test]
    fn test_loading_blocks_only_its_own_feature() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        let c = ctx("def f(): pass", true);

        ai.begin(AiFeature::Analysis, &c, &mut notices).unwrap();
        assert!(ai.is_loading(AiFeature::Analysis));
        assert!(!ai.can_invoke(AiFeature::Analysis));
        assert!(ai.begin(AiFeature::Analysis, &c, &mut notices).is_err());

        assert!(ai.can_invoke(AiFeature::Summarization));
        ai.begin(AiFeature::Summarization, &c, &mut notices).unwrap();

        ai.complete(AiFeature::Analysis, Ok(AiResult::Suggestions(vec![])), &mut notices);
        assert!(ai.can_invoke(AiFeature::Analysis));
        assert!(ai.is_loading(AiFeature::Summarization));
    }

    #[test]
    fn test_completion_request_carries_cursor() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        let mut c = ctx("ab\ncd", true);
        c.cursor = Some(4);
        match ai.begin(AiFeature::Completion, &c, &mut notices).unwrap() {
            AiRequest::Complete(req) => {
                assert_eq!(req.cursor_position, CursorPosition { line: 2, column: 2 });
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_failure_uses_envelope_or_fallback() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();

        ai.begin(AiFeature::TagGeneration, &ctx("x", false), &mut notices).unwrap();
        let update = ai.complete(
            AiFeature::TagGeneration,
            Err(Error::Http("connection reset".to_string())),
            &mut notices,
        );
        assert!(update.is_none());
        assert_eq!(ai.error(AiFeature::TagGeneration), Some("Failed to generate tags"));
        assert!(!ai.is_loading(AiFeature::TagGeneration));

        ai.begin(AiFeature::TagGeneration, &ctx("x", false), &mut notices).unwrap();
        assert_eq!(ai.error(AiFeature::TagGeneration), None);
        ai.complete(
            AiFeature::TagGeneration,
            Err(Error::Api {
                status: 503,
                message: "Model overloaded".to_string(),
            }),
            &mut notices,
        );
        assert_eq!(ai.error(AiFeature::TagGeneration), Some("Model overloaded"));
    }

    #[test]
    fn test_failure_discards_previous_result() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        let c = ctx("def f(): pass", true);

        ai.begin(AiFeature::Completion, &c, &mut notices).unwrap();
        ai.complete(
            AiFeature::Completion,
            Ok(AiResult::Completions(vec!["return 1".to_string()])),
            &mut notices,
        );
        assert!(ai.result(AiFeature::Completion).is_some());

        ai.begin(AiFeature::Completion, &c, &mut notices).unwrap();
        ai.complete(
            AiFeature::Completion,
            Err(Error::Http("timed out".to_string())),
            &mut notices,
        );
        assert!(ai.result(AiFeature::Completion).is_none());
        assert!(ai.error(AiFeature::Completion).is_some());
    }

    #[test]
    fn test_generated_content_sets_code_mode() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        let update = ai.complete(
            AiFeature::ContentGeneration,
            Ok(AiResult::Generated {
                content: "print('hi')".to_string(),
                language: Language::Python,
            }),
            &mut notices,
        );
        assert_eq!(
            update,
            Some(AiUpdate::Content {
                content: "print('hi')".to_string(),
                is_code: true
            })
        );
    }

    #[test]
    fn test_apply_completion() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        ai.complete(
            AiFeature::Completion,
            Ok(AiResult::Completions(vec!["()".to_string()])),
            &mut notices,
        );
        assert_eq!(ai.apply_completion("foo", None, 0).as_deref(), Some("foo()"));
        assert_eq!(ai.apply_completion("foo bar", Some(3), 0).as_deref(), Some("foo() bar"));
        assert_eq!(ai.apply_completion("foo", None, 1), None);
    }

    #[test]
    fn test_clear_results_keeps_flags() {
        let mut ai = enabled_all();
        let mut notices = Notices::new();
        ai.complete(
            AiFeature::LanguageDetection,
            Ok(AiResult::DetectedLanguage {
                language: Language::Go,
                heuristic: true,
            }),
            &mut notices,
        );
        assert_eq!(ai.detected_language(), Some(Language::Go));
        assert_eq!(
            notices.last().map(|n| n.message.as_str()),
            Some("Detected language (heuristic): go")
        );

        ai.clear_results();
        assert_eq!(ai.detected_language(), None);
        assert!(ai.is_enabled(AiFeature::LanguageDetection));
    }
}
