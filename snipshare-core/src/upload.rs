//! Multimedia upload validation
//!
//! Files are checked before anything is sent: the type (from the file
//! extension) must be on the allowlist and the size within
//! [`MAX_UPLOAD_BYTES`]. One bad file rejects the whole batch.

use std::path::{Path, PathBuf};

use crate::api::{SnippetApi, UploadFile};
use crate::error::{Error, Result};
use crate::notice::Notices;
use crate::types::FileAttachment;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 9] = [
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("mp4", "video/mp4"),
    ("mp3", "audio/mpeg"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// MIME type for an allowed extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Validate and read `paths` into an upload batch.
///
/// Every offending file gets its own error notice; any failure rejects
/// the batch.
pub fn prepare(paths: &[PathBuf], notices: &mut Notices) -> Result<Vec<UploadFile>> {
    if paths.is_empty() {
        notices.error("No valid files selected.");
        return Err(Error::Validation("No valid files selected.".to_string()));
    }

    let mut checked = Vec::with_capacity(paths.len());
    let mut rejected = 0;

    for path in paths {
        let name = display_name(path);
        let Some(mime) = mime_for(path) else {
            notices.error(format!("File \"{}\" has an unsupported type.", name));
            rejected += 1;
            continue;
        };
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable upload");
                notices.error(format!("File \"{}\" could not be read.", name));
                rejected += 1;
                continue;
            }
        };
        if size > MAX_UPLOAD_BYTES {
            notices.error(format!("File \"{}\" exceeds 10MB limit.", name));
            rejected += 1;
            continue;
        }
        checked.push((path, name, mime));
    }

    if rejected > 0 {
        return Err(Error::Validation(format!(
            "{} of {} files rejected",
            rejected,
            paths.len()
        )));
    }

    checked
        .into_iter()
        .map(|(path, name, mime)| {
            Ok(UploadFile {
                name,
                mime_type: mime.to_string(),
                bytes: std::fs::read(path)?,
            })
        })
        .collect()
}

/// Upload a prepared batch and return the stored file descriptors.
pub async fn upload(
    api: &dyn SnippetApi,
    files: &[UploadFile],
    notices: &mut Notices,
) -> Result<Vec<FileAttachment>> {
    match api.upload(files).await {
        Ok(stored) => {
            tracing::info!(count = stored.len(), "Files uploaded");
            notices.success("Files uploaded successfully!");
            Ok(stored)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Upload failed");
            notices.error(e.user_message("Failed to upload files."));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for(Path::new("song.mp3")), Some("audio/mpeg"));
        assert_eq!(mime_for(Path::new("notes.txt")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[test]
    fn test_prepare_valid_batch() {
        let dir = TempDir::new().unwrap();
        let paths = vec![write(&dir, "a.png", 3), write(&dir, "b.pdf", 5)];
        let mut notices = Notices::new();

        let files = prepare(&paths, &mut notices).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.png");
        assert_eq!(files[1].mime_type, "application/pdf");
        assert_eq!(files[1].size(), 5);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_one_bad_file_rejects_batch() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write(&dir, "ok.jpg", 1),
            write(&dir, "script.exe", 1),
            write(&dir, "notes.txt", 1),
        ];
        let mut notices = Notices::new();

        assert!(prepare(&paths, &mut notices).is_err());
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = TempDir::new().unwrap();
        let big = dir.path().join("big.mp4");
        let file = std::fs::File::create(&big).unwrap();
        file.set_len(MAX_UPLOAD_BYTES + 1).unwrap();

        let mut notices = Notices::new();
        assert!(prepare(&[big], &mut notices).is_err());
        assert!(notices.drain()[0].message.contains("exceeds 10MB"));
    }

    #[test]
    fn test_missing_file_gets_its_own_notice() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            dir.path().join("gone.png"),
            write(&dir, "notes.txt", 1),
            write(&dir, "ok.pdf", 1),
        ];
        let mut notices = Notices::new();

        let err = prepare(&paths, &mut notices).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let messages: Vec<String> = notices.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("\"gone.png\" could not be read"));
        assert!(messages[1].contains("notes.txt"));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut notices = Notices::new();
        assert!(prepare(&[], &mut notices).is_err());
        assert_eq!(notices.len(), 1);
    }
}
