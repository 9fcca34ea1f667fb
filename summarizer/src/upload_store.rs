use crate::error::SummarizerError;
use crate::models::StoredUpload;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Persists uploads under generated names.
///
/// The client filename is only kept as metadata and never becomes part of a
/// path. Files are not cleaned up.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), SummarizerError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SummarizerError::Upload {
                path: self.dir.clone(),
                source,
            })
    }

    pub async fn save(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, SummarizerError> {
        let id = Uuid::new_v4().to_string();
        let path = self.dir.join(format!("{id}.pdf"));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| SummarizerError::Upload {
                path: path.clone(),
                source,
            })?;

        log::info!(
            "Stored upload '{}' ({} bytes) as {}",
            original_filename,
            bytes.len(),
            path.display()
        );

        Ok(StoredUpload {
            id,
            original_filename: original_filename.to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_dir_creates_nested_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path().join("a").join("upload"));
        store.ensure_dir().await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn traversal_filename_stays_inside_upload_dir() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path());

        let saved = store.save("../../etc/passwd", b"%PDF-1.4").await.unwrap();

        assert_eq!(saved.path.parent(), Some(root.path()));
        assert_eq!(saved.original_filename, "../../etc/passwd");
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn same_filename_does_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path());

        let a = store.save("report.pdf", b"one").await.unwrap();
        let b = store.save("report.pdf", b"two").await.unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(std::fs::read(&a.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&b.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn save_into_missing_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        let store = UploadStore::new(root.path().join("absent"));
        let err = store.save("x.pdf", b"x").await.unwrap_err();
        assert!(matches!(err, SummarizerError::Upload { .. }));
    }
}
