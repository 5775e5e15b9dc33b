use serde::Serialize;

use crate::normalize::normalize_text;

/// Where a document's text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Uploaded file
    File { filename: String },

    /// Fetched video transcript
    Transcript { video_id: String },
}

impl DocumentSource {
    /// True for video transcripts
    pub fn is_transcript(&self) -> bool {
        matches!(self, Self::Transcript { .. })
    }
}

/// Normalized input text, immutable once loaded
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    source: DocumentSource,
}

impl Document {
    /// Create a document from raw text, normalizing it
    pub fn new(raw_text: &str, source: DocumentSource) -> Self {
        Self {
            text: normalize_text(raw_text),
            source,
        }
    }

    /// Full document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document origin
    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_is_normalized() {
        let doc = Document::new(
            "  Title\r\n\r\n\r\nBody  text ",
            DocumentSource::File {
                filename: "notes.txt".to_string(),
            },
        );
        assert_eq!(doc.text(), "Title\n\nBody text");
        assert!(!doc.source().is_transcript());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(
            " \n\t ",
            DocumentSource::Transcript {
                video_id: "dQw4w9WgXcQ".to_string(),
            },
        );
        assert!(doc.is_empty());
        assert!(doc.source().is_transcript());
    }
}
