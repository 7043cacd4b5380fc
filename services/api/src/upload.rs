//! Upload handling for audio files
//!
//! Disk-backed storage with a MIME allowlist and a fixed size ceiling.

use std::path::{Path, PathBuf};

use anyhow::Result;
use uuid::Uuid;

/// Maximum accepted upload size: 10 MiB
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted audio MIME types
const ALLOWED_MIME_TYPES: &[&str] = &["audio/mpeg", "audio/wav"];

/// Check whether a content type is on the audio allowlist
pub fn is_allowed_mime(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Upload directory configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

impl UploadConfig {
    /// Create an UploadConfig from the `UPLOAD_DIR` environment variable,
    /// defaulting to `uploads/`
    pub fn from_env() -> Self {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Self {
            dir: PathBuf::from(dir),
        }
    }
}

/// Derive a unique storage filename, preserving the original extension
pub fn storage_filename(original_name: &str) -> String {
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

/// Write uploaded audio bytes to disk and return the stored relative path
pub async fn store_audio(dir: &Path, original_name: &str, data: &[u8]) -> Result<String> {
    tokio::fs::create_dir_all(dir).await?;

    let filename = storage_filename(original_name);
    let path = dir.join(&filename);
    tokio::fs::write(&path, data).await?;

    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_allowlist() {
        assert!(is_allowed_mime("audio/mpeg"));
        assert!(is_allowed_mime("audio/wav"));
        assert!(!is_allowed_mime("audio/ogg"));
        assert!(!is_allowed_mime("video/mp4"));
        assert!(!is_allowed_mime("text/plain"));
    }

    #[test]
    fn test_storage_filename_keeps_extension() {
        let name = storage_filename("my song.mp3");
        assert!(name.ends_with(".mp3"));

        let name = storage_filename("noextension");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_storage_filenames_are_unique() {
        assert_ne!(storage_filename("a.wav"), storage_filename("a.wav"));
    }

    #[tokio::test]
    async fn test_store_audio_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let data = b"RIFF....WAVE";

        let path = store_audio(tmp.path(), "clip.wav", data).await.unwrap();

        assert!(path.ends_with(".wav"));
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, data);
    }
}
