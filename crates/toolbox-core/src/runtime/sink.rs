//! Where converted files go.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Receives each successfully converted file, once.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Deliver `data` under `file_name`; returns a human-readable location.
    async fn save(&self, file_name: &str, data: Bytes) -> Result<String, SinkError>;
}

/// Writes files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, file_name: &str, data: Bytes) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(file_name);
        // Sources sharing a stem map to the same output name.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(path = %path.display(), "overwriting existing file");
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = data.len(), "file saved");
        Ok(path.display().to_string())
    }
}

/// A delivered file, as recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub data: Bytes,
}

/// Keeps every download in memory, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    downloads: Arc<Mutex<Vec<Download>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().await.clone()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, file_name: &str, data: Bytes) -> Result<String, SinkError> {
        self.downloads.lock().await.push(Download {
            file_name: file_name.to_owned(),
            data,
        });
        Ok(format!("memory:{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn directory_sink_creates_dir_and_writes() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("nested/out"));

        let location = sink
            .save("a.webp", Bytes::from_static(b"RIFF"))
            .await
            .expect("save");

        let written = tokio::fs::read(root.path().join("nested/out/a.webp"))
            .await
            .unwrap();
        assert_eq!(written, b"RIFF");
        assert!(location.ends_with("a.webp"));
    }

    #[tokio::test]
    async fn directory_sink_reports_io_errors() {
        let root = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = root.path().join("blocker");
        tokio::fs::write(&blocker, b"").await.unwrap();
        let sink = DirectorySink::new(blocker.clone());

        let err = sink
            .save("a.webp", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[tokio::test]
    #[traced_test]
    async fn directory_sink_warns_before_overwriting() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path());

        sink.save("a.webp", Bytes::from_static(b"first")).await.unwrap();
        assert!(!logs_contain("overwriting existing file"));

        sink.save("a.webp", Bytes::from_static(b"second")).await.unwrap();
        assert!(logs_contain("overwriting existing file"));
        let written = tokio::fs::read(root.path().join("a.webp")).await.unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.save("1.webp", Bytes::from_static(b"a")).await.unwrap();
        sink.save("2.webp", Bytes::from_static(b"b")).await.unwrap();
        let names: Vec<_> = sink
            .downloads()
            .await
            .into_iter()
            .map(|d| d.file_name)
            .collect();
        assert_eq!(names, ["1.webp", "2.webp"]);
    }
}
