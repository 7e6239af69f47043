//! Core domain types for snipshare
//!
//! These types mirror the JSON records kept in local storage and exchanged
//! with the snippet API. Field names serialize in camelCase so persisted
//! drafts and API payloads share one shape.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Draft** | The in-progress snippet, not yet persisted remotely |
//! | **Snippet** | A persisted, shareable unit identified by a server-assigned id |
//! | **AI Metadata** | Suggestions, security issues, explanation, summary and attached files |
//! | **History Entry** | Lightweight record of a snippet created in this session |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================
// Language
// ============================================

/// Languages the editor knows how to highlight.
///
/// Unknown names decode as [`Language::Plaintext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Typescript,
    Css,
    Markup,
    Python,
    Json,
    Bash,
    Java,
    C,
    Cpp,
    Php,
    Ruby,
    Go,
    #[serde(other)]
    Plaintext,
}

impl Language {
    /// Every supported language, in menu order.
    pub const ALL: [Language; 14] = [
        Language::Javascript,
        Language::Typescript,
        Language::Css,
        Language::Markup,
        Language::Python,
        Language::Json,
        Language::Bash,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Php,
        Language::Ruby,
        Language::Go,
        Language::Plaintext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Css => "css",
            Language::Markup => "markup",
            Language::Python => "python",
            Language::Json => "json",
            Language::Bash => "bash",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Go => "go",
            Language::Plaintext => "plaintext",
        }
    }

    pub fn is_plaintext(&self) -> bool {
        *self == Language::Plaintext
    }

    /// Language implied by a file extension when importing a local file.
    pub fn from_extension(ext: &str) -> Language {
        match ext.to_ascii_lowercase().as_str() {
            "js" => Language::Javascript,
            "ts" => Language::Typescript,
            "css" => Language::Css,
            "html" => Language::Markup,
            "py" => Language::Python,
            "json" => Language::Json,
            "sh" => Language::Bash,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "go" => Language::Go,
            _ => Language::Plaintext,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("unsupported language: {}", s)))
    }
}

// ============================================
// AI annotations and attachments
// ============================================

/// Severity attached to a suggestion or security issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Warning,
    Error,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Unknown => "unknown",
        }
    }
}

/// A line-anchored AI finding (suggestion or security issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub severity: Severity,
}

/// An uploaded multimedia file referenced by a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
}

/// AI-derived annotations carried by a draft or snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub suggestions: Vec<Annotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub security_issues: Vec<Annotation>,
    #[serde(deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<FileAttachment>,
}

impl AiMetadata {
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }
}

// ============================================
// Draft
// ============================================

/// The working snippet before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_code: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub language: Language,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    /// Seconds until expiry; `None` never expires.
    #[serde(with = "expire_in")]
    pub expire_in: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub ai_metadata: AiMetadata,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            content: String::new(),
            is_code: false,
            language: Language::default(),
            title: String::new(),
            tags: Vec::new(),
            password: String::new(),
            expire_in: None,
            is_private: false,
            ai_metadata: AiMetadata::default(),
            timestamp: Utc::now(),
        }
    }
}

impl Draft {
    /// True when the content has something other than whitespace.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// A draft with blank content and no attached files cannot be saved.
    pub fn is_saveable(&self) -> bool {
        self.has_content() || self.ai_metadata.has_files()
    }

    /// Language reported to the API: plain text unless in code mode.
    pub fn effective_language(&self) -> Language {
        if self.is_code {
            self.language
        } else {
            Language::Plaintext
        }
    }

    /// Title sent on create when the user left it empty.
    pub fn default_title(&self) -> String {
        if self.is_code {
            format!("{} snippet", self.language)
        } else {
            "Text snippet".to_string()
        }
    }

    /// File name offered when downloading the draft.
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.title, self.is_code, self.language)
    }

    /// Content followed by a `Files:` trailer listing attachment URLs.
    pub fn export_text(&self) -> String {
        if self.ai_metadata.files.is_empty() {
            return self.content.clone();
        }
        let urls: Vec<&str> = self
            .ai_metadata
            .files
            .iter()
            .map(|f| f.url.as_str())
            .collect();
        format!("{}\n\nFiles:\n{}", self.content, urls.join("\n"))
    }
}

/// Expiry choices offered by the editor, in seconds.
pub const EXPIRY_OPTIONS: [(u64, &str); 6] = [
    (1800, "30 minutes"),
    (3600, "1 hour"),
    (21600, "6 hours"),
    (86400, "1 day"),
    (604800, "1 week"),
    (2592000, "1 month"),
];

/// Parse an expiry choice: `never` (or empty) or one of the offered
/// durations in seconds.
pub fn parse_expiry(input: &str) -> Result<Option<u64>, Error> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("never") {
        return Ok(None);
    }
    input
        .parse::<u64>()
        .ok()
        .filter(|secs| EXPIRY_OPTIONS.iter().any(|(s, _)| s == secs))
        .map(Some)
        .ok_or_else(|| {
            let allowed: Vec<String> = EXPIRY_OPTIONS.iter().map(|(s, _)| s.to_string()).collect();
            Error::Validation(format!(
                "expiry must be 'never' or one of {}",
                allowed.join(", ")
            ))
        })
}

/// Human label for an expiry setting.
pub fn expiry_label(expire_in: Option<u64>) -> String {
    match expire_in {
        None => "never".to_string(),
        Some(secs) => EXPIRY_OPTIONS
            .iter()
            .find(|(s, _)| *s == secs)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| format!("{}s", secs)),
    }
}

/// Split a comma-separated tag string, trimming and dropping empty parts.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// `<title or "snippet">.<language or "txt">`
pub fn export_file_name(title: &str, is_code: bool, language: Language) -> String {
    let stem = if title.trim().is_empty() {
        "snippet"
    } else {
        title.trim()
    };
    let ext = if is_code { language.as_str() } else { "txt" };
    format!("{}.{}", stem, ext)
}

// ============================================
// Editor preferences
// ============================================

/// Font sizes offered by the editor.
pub const FONT_SIZES: [u8; 7] = [10, 12, 14, 16, 18, 20, 24];

pub const DEFAULT_FONT_SIZE: u8 = 14;

/// Editor color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    Solarized,
    #[default]
    #[serde(other)]
    Tomorrow,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Tomorrow, Theme::Dark, Theme::Light, Theme::Solarized];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Tomorrow => "tomorrow",
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Solarized => "solarized",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Theme::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("unknown theme: {}", s)))
    }
}

/// Editor preferences, persisted independently of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorPreferences {
    #[serde(deserialize_with = "font_size_or_default")]
    pub font_size: u8,
    pub theme: Theme,
    #[serde(deserialize_with = "null_as_default")]
    pub auto_save_enabled: bool,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            theme: Theme::default(),
            auto_save_enabled: false,
        }
    }
}

impl EditorPreferences {
    /// Set the font size; only sizes from [`FONT_SIZES`] are accepted.
    pub fn set_font_size(&mut self, size: u8) -> crate::Result<()> {
        if !FONT_SIZES.contains(&size) {
            return Err(Error::Validation(format!(
                "font size must be one of {:?}",
                FONT_SIZES
            )));
        }
        self.font_size = size;
        Ok(())
    }
}

// ============================================
// Session history
// ============================================

/// Record of a snippet created during this session. Never holds the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default = "unknown_id", deserialize_with = "id_or_unknown")]
    pub id: String,
    #[serde(default = "untitled", deserialize_with = "title_or_untitled")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_code: bool,
    #[serde(default = "plaintext", deserialize_with = "language_or_plaintext")]
    pub language: Language,
    #[serde(
        default = "Utc::now",
        deserialize_with = "timestamp_or_now",
        serialize_with = "chrono::serde::ts_milliseconds::serialize"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_password: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileAttachment>,
}

impl HistoryEntry {
    /// Build the history record for a freshly created snippet.
    pub fn from_saved(id: impl Into<String>, draft: &Draft) -> Self {
        let prefix = if draft.title.trim().is_empty() {
            if draft.is_code {
                format!("{} snippet", draft.language)
            } else {
                "text snippet".to_string()
            }
        } else {
            draft.title.clone()
        };

        Self {
            id: id.into(),
            title: format!("{} - {}", prefix, crate::format::preview(&draft.content, 30)),
            is_code: draft.is_code,
            language: draft.language,
            timestamp: Utc::now(),
            has_password: !draft.password.is_empty(),
            tags: draft.tags.clone(),
            summary: draft.ai_metadata.summary.clone(),
            files: draft.ai_metadata.files.clone(),
        }
    }

    /// Case-insensitive substring match against title, id, or any tag.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.id.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

// ============================================
// Remote snippet
// ============================================

/// A snippet as fetched from the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_code: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub language: Language,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ai_metadata: AiMetadata,
    #[serde(deserialize_with = "null_as_default")]
    pub requires_password: bool,
}

impl Snippet {
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.title, self.is_code, self.language)
    }
}

// ============================================
// Serde helpers
// ============================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn unknown_id() -> String {
    "unknown".to_string()
}

fn untitled() -> String {
    "Untitled".to_string()
}

fn plaintext() -> Language {
    Language::Plaintext
}

/// Non-blank string value, if the JSON held one (numbers are stringified).
fn non_blank_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn id_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank_string(deserializer)?.unwrap_or_else(unknown_id))
}

fn title_or_untitled<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank_string(deserializer)?.unwrap_or_else(untitled))
}

fn language_or_plaintext<'de, D>(deserializer: D) -> Result<Language, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(Language::Plaintext),
        _ => Language::Plaintext,
    })
}

fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = value.and_then(|v| match v {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    });
    Ok(parsed.unwrap_or_else(Utc::now))
}

fn font_size_or_default<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let size = value
        .and_then(|v| v.as_u64())
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| FONT_SIZES.contains(n));
    Ok(size.unwrap_or(DEFAULT_FONT_SIZE))
}

/// `expireIn` is an empty string when unset and a count of seconds otherwise.
pub(crate) mod expire_in {
    use super::*;

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(secs) => serializer.serialize_str(&secs.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_and_display() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(Language::Cpp.to_string(), "cpp");
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_unknown_language_decodes_as_plaintext() {
        let lang: Language = serde_json::from_str("\"cobol\"").unwrap();
        assert_eq!(lang, Language::Plaintext);
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("html"), Language::Markup);
        assert_eq!(Language::from_extension("md"), Language::Plaintext);
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("never").unwrap(), None);
        assert_eq!(parse_expiry("").unwrap(), None);
        assert_eq!(parse_expiry("3600").unwrap(), Some(3600));
        assert!(parse_expiry("42").is_err());
        assert!(parse_expiry("soon").is_err());
        assert_eq!(expiry_label(Some(86400)), "1 day");
        assert_eq!(expiry_label(None), "never");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" rust, cli ,,web "), vec!["rust", "cli", "web"]);
        assert!(parse_tags("  ,  ").is_empty());
        assert_eq!(parse_tags("a,a"), vec!["a", "a"]);
    }

    #[test]
    fn test_draft_saveable() {
        let mut draft = Draft::default();
        assert!(!draft.is_saveable());

        draft.content = "   \n".to_string();
        assert!(!draft.is_saveable());

        draft.ai_metadata.files.push(FileAttachment {
            name: "a.png".to_string(),
            url: "https://cdn.example.com/a.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 10,
        });
        assert!(draft.is_saveable());
    }

    #[test]
    fn test_draft_default_title_and_language() {
        let mut draft = Draft::default();
        assert_eq!(draft.default_title(), "Text snippet");
        assert_eq!(draft.effective_language(), Language::Plaintext);

        draft.is_code = true;
        draft.language = Language::Go;
        assert_eq!(draft.default_title(), "go snippet");
        assert_eq!(draft.effective_language(), Language::Go);
    }

    #[test]
    fn test_draft_json_shape() {
        let mut draft = Draft::default();
        draft.content = "x".to_string();
        draft.expire_in = Some(3600);
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["isCode"], false);
        assert_eq!(json["expireIn"], "3600");
        assert!(json["aiMetadata"]["securityIssues"].is_array());
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_draft_tolerates_partial_json() {
        let draft: Draft =
            serde_json::from_str(r#"{"content":"hi","expireIn":"","aiMetadata":null}"#).unwrap();
        assert_eq!(draft.content, "hi");
        assert_eq!(draft.expire_in, None);
        assert_eq!(draft.language, Language::Javascript);
        assert!(draft.ai_metadata.files.is_empty());
    }

    #[test]
    fn test_preferences_sanitize_font_size() {
        let prefs: EditorPreferences =
            serde_json::from_str(r#"{"fontSize":13,"theme":"neon","autoSaveEnabled":true}"#)
                .unwrap();
        assert_eq!(prefs.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(prefs.theme, Theme::Tomorrow);
        assert!(prefs.auto_save_enabled);

        let mut prefs = EditorPreferences::default();
        assert!(prefs.set_font_size(11).is_err());
        assert!(prefs.set_font_size(20).is_ok());
        assert_eq!(prefs.font_size, 20);
    }

    #[test]
    fn test_history_entry_from_saved() {
        let mut draft = Draft::default();
        draft.content = "a".repeat(40);
        draft.password = "secret".to_string();
        draft.tags = vec!["demo".to_string()];

        let entry = HistoryEntry::from_saved("abc123", &draft);
        assert_eq!(entry.title, format!("text snippet - {}...", "a".repeat(30)));
        assert!(entry.has_password);
        assert_eq!(entry.tags, vec!["demo"]);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_history_entry_sanitizes_missing_fields() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"tags":null}"#).unwrap();
        assert_eq!(entry.id, "unknown");
        assert_eq!(entry.title, "Untitled");
        assert_eq!(entry.language, Language::Plaintext);
        assert!(entry.tags.is_empty());
        assert!(!entry.has_password);
    }

    #[test]
    fn test_history_entry_matches() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"id":"Xy12","title":"Sorting helpers","tags":["Python","algo"]}"#,
        )
        .unwrap();
        assert!(entry.matches("py"));
        assert!(entry.matches("SORT"));
        assert!(entry.matches("xy1"));
        assert!(!entry.matches("rust"));
    }

    #[test]
    fn test_export_text_lists_files() {
        let mut draft = Draft::default();
        draft.content = "body".to_string();
        assert_eq!(draft.export_text(), "body");

        draft.ai_metadata.files.push(FileAttachment {
            name: "a.pdf".to_string(),
            url: "https://cdn.example.com/a.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1,
        });
        assert_eq!(
            draft.export_text(),
            "body\n\nFiles:\nhttps://cdn.example.com/a.pdf"
        );
        assert_eq!(draft.export_file_name(), "snippet.txt");
    }
}
