use recap_common::{RecapError, Result};
use std::sync::Arc;
use tracing::info;

use crate::document::{Document, DocumentSource};
use crate::file::read_text;
use crate::transcript::{extract_video_id, TranscriptFetcher};
use crate::upload::UploadedFile;

/// What the user submitted
#[derive(Debug)]
pub enum Input {
    /// Uploaded document held in a temp file
    Upload(UploadedFile),

    /// Video URL whose transcript is summarized
    VideoUrl(String),
}

impl Input {
    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Upload(file) => format!("upload '{}'", file.filename()),
            Self::VideoUrl(url) => format!("video '{}'", url),
        }
    }
}

/// Turns an `Input` into a normalized `Document`
#[derive(Clone)]
pub struct DocumentLoader {
    transcripts: Arc<dyn TranscriptFetcher>,
}

impl DocumentLoader {
    pub fn new(transcripts: Arc<dyn TranscriptFetcher>) -> Self {
        Self { transcripts }
    }

    /// Load the document for an input
    ///
    /// Borrowing keeps the upload's temp file owned by the caller, so its
    /// lifetime stays tied to the request.
    pub async fn load(&self, input: &Input) -> Result<Document> {
        let document = match input {
            Input::Upload(file) => {
                let raw = read_text(file.path(), file.kind()?).await?;
                Document::new(
                    &raw,
                    DocumentSource::File {
                        filename: file.filename().to_string(),
                    },
                )
            }
            Input::VideoUrl(url) => {
                let video_id = extract_video_id(url).ok_or_else(|| {
                    RecapError::invalid_input(format!("Not a valid YouTube URL: {}", url))
                })?;
                let raw = self.transcripts.fetch(&video_id).await?;
                Document::new(&raw, DocumentSource::Transcript { video_id })
            }
        };

        info!(
            "Loaded document from {} - {} chars",
            input.describe(),
            document.len()
        );
        Ok(document)
    }
}
