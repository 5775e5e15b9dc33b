use async_trait::async_trait;
use recap_common::{RecapError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Source of video transcripts
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the full transcript text for a video
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

fn video_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // youtube.com/watch?v=ID (v may follow other query params)
            r"youtube\.com/watch\?(?:.*&)?v=([A-Za-z0-9_-]{11})",
            // youtu.be/ID
            r"youtu\.be/([A-Za-z0-9_-]{11})",
            // youtube.com/embed/ID, /shorts/ID, /live/ID, /v/ID
            r"youtube\.com/(?:embed|shorts|live|v)/([A-Za-z0-9_-]{11})",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"))
}

/// Extract the 11 character video id from a YouTube URL or a bare id
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();

    if bare_id_pattern().is_match(url) {
        return Some(url.to_string());
    }

    video_id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Transcript fetcher backed by YouTube captions
#[derive(Debug, Clone)]
pub struct YoutubeTranscripts {
    languages: Vec<String>,
}

impl YoutubeTranscripts {
    /// Create a fetcher preferring `languages` in order
    pub fn new(languages: Vec<String>) -> Self {
        let languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages
        };
        Self { languages }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscripts {
    async fn fetch(&self, video_id: &str) -> Result<String> {
        debug!(
            "Fetching transcript - Video: {}, Languages: {:?}",
            video_id, self.languages
        );

        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| RecapError::external("transcript", e.to_string()))?;

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let transcript = api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| RecapError::external("transcript", e.to_string()))?;

        let text = transcript.text();
        info!(
            "Transcript fetched - Video: {}, Language: {}, Length: {} chars",
            video_id,
            transcript.language_code,
            text.len()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_short_and_path_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/live/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(extract_video_id(" dQw4w9WgXcQ ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_invalid_urls() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn test_default_languages() {
        assert_eq!(YoutubeTranscripts::new(Vec::new()).languages(), ["en"]);
    }
}
