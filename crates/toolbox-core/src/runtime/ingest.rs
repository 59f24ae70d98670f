//! File intake: type filtering, previews and output naming.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

/// A file offered to the queue, e.g. picked on the command line.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// MIME type as reported by the source (`image/jpeg`, ...).
    pub mime: String,
    pub bytes: Bytes,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, mime, bytes))
    }

    /// Image-typed and not already WebP.
    pub fn is_convertible(&self) -> bool {
        let mime = self.mime.to_ascii_lowercase();
        mime.starts_with("image/") && !mime.contains("webp")
    }
}

/// Render `bytes` as a `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Output name for a converted file: the extension is replaced by `.webp`.
///
/// Only the last extension is dropped (`a.b.png` → `a.b.webp`); names without
/// a usable stem fall back to `image.webp`.
pub fn webp_file_name(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_owned());
    format!("{stem}.webp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_images_but_not_webp() {
        let ok = |mime: &str| IncomingFile::new("f", mime, Vec::new()).is_convertible();
        assert!(ok("image/jpeg"));
        assert!(ok("image/png"));
        assert!(ok("IMAGE/GIF"));
        assert!(!ok("image/webp"));
        assert!(!ok("text/plain"));
        assert!(!ok("application/octet-stream"));
    }

    #[test]
    fn data_uri_has_mime_and_base64_payload() {
        assert_eq!(data_uri("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn webp_names_replace_the_extension() {
        assert_eq!(webp_file_name("photo.jpg"), "photo.webp");
        assert_eq!(webp_file_name("scan.final.PNG"), "scan.final.webp");
        assert_eq!(webp_file_name("noext"), "noext.webp");
        assert_eq!(webp_file_name(""), "image.webp");
    }

    #[tokio::test]
    async fn from_path_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let file = IncomingFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "cat.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(&file.bytes[..], b"\x89PNG");
        assert!(file.is_convertible());
    }
}
