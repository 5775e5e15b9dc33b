//! Recap input acquisition
//!
//! Uploaded files, video transcripts and the normalized `Document` built from them

pub mod document;
pub mod file;
pub mod loader;
pub mod normalize;
pub mod transcript;
pub mod upload;

// Re-export main types
pub use document::{Document, DocumentSource};
pub use file::FileKind;
pub use loader::{DocumentLoader, Input};
pub use normalize::normalize_text;
pub use transcript::{extract_video_id, TranscriptFetcher, YoutubeTranscripts};
pub use upload::UploadedFile;
