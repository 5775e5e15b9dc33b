use recap_common::{RecapError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain text (`.txt`, `.md`)
    PlainText,

    /// PDF document
    Pdf,
}

impl FileKind {
    /// Detect the format from a filename's extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            _ => Err(RecapError::invalid_input(format!(
                "Unsupported file type: {} (expected .txt, .md or .pdf)",
                filename
            ))),
        }
    }
}

/// Extract text from a file on disk
pub async fn read_text(path: &Path, kind: FileKind) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let text = match kind {
        FileKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        FileKind::Pdf => {
            // pdf-extract is synchronous and CPU bound
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| RecapError::external("document parser", format!("PDF task aborted: {}", e)))?
                .map_err(|e| RecapError::external("document parser", e.to_string()))?
        }
    };

    info!("Extracted {} chars from {:?} file", text.len(), kind);
    Ok(text)
}
