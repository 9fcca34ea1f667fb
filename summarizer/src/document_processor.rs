use crate::error::SummarizerError;
use pdf_extract::extract_text;
use std::path::{Path, PathBuf};

pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Text of every page in order, with no separator added between pages.
    pub fn extract_text(&self, file_path: &Path) -> Result<String, SummarizerError> {
        if !file_path.is_file() {
            return Err(SummarizerError::DocumentOpen {
                path: file_path.to_path_buf(),
                detail: "no such file".to_string(),
            });
        }

        log::info!("Extracting text from {}", file_path.display());

        let content = extract_text(file_path).map_err(|e| SummarizerError::DocumentOpen {
            path: file_path.to_path_buf(),
            detail: e.to_string(),
        })?;

        log::info!("Extracted {} characters", content.chars().count());
        Ok(content)
    }

    /// Runs [`Self::extract_text`] on the blocking pool.
    pub async fn extract_text_blocking_safe(
        &self,
        file_path: PathBuf,
    ) -> Result<String, SummarizerError> {
        let path = file_path.clone();
        tokio::task::spawn_blocking(move || DocumentProcessor::new().extract_text(&path))
            .await
            .map_err(|e| SummarizerError::DocumentOpen {
                path: file_path,
                detail: format!("extraction task failed: {e}"),
            })?
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}
