use crate::error::RecapError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recap application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where request-scoped upload temp files are created
    pub upload_dir: PathBuf,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: u64,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// OpenAI-compatible API base URL (including the version segment)
    pub api_base_url: String,

    /// Model used for per-chunk summaries, and for the combine step by default
    pub standard_model: String,

    /// Model used for the combine step when the advanced tier is requested
    pub advanced_model: String,

    /// Embedding model used for clustering
    pub embedding_model: String,

    /// Model name whose tokenizer is used for counting
    pub tokenizer_model: String,

    /// Smallest accepted document, in tokens (inclusive)
    pub min_document_tokens: usize,

    /// Largest accepted document, in tokens (inclusive)
    pub max_document_tokens: usize,

    /// Desired number of chunks per document
    pub chunk_count_hint: usize,

    /// Lower bound for the per-chunk token target
    pub min_chunk_tokens: usize,

    /// Upper bound for the per-chunk token target
    pub max_chunk_tokens: usize,

    /// Maximum in-flight map calls for one request (1 = sequential)
    pub max_concurrent_requests: usize,

    /// HTTP timeout for model API calls
    pub request_timeout_secs: u64,

    /// Preferred transcript languages, most preferred first
    pub transcript_languages: Vec<String>,

    /// Required API key prefix (empty disables the check)
    pub api_key_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./data/uploads"),
            max_upload_bytes: 200 * 1024 * 1024,
            log_dir: PathBuf::from("./data/log"),
            log_level: "info".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8501,
            api_base_url: "https://api.openai.com/v1".to_string(),
            standard_model: "gpt-3.5-turbo".to_string(),
            advanced_model: "gpt-4".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            tokenizer_model: "gpt-3.5-turbo".to_string(),
            min_document_tokens: 2000,
            max_document_tokens: 800_000,
            chunk_count_hint: 10,
            min_chunk_tokens: 200,
            max_chunk_tokens: 2000,
            max_concurrent_requests: 4,
            request_timeout_secs: 300,
            transcript_languages: vec!["en".to_string()],
            api_key_prefix: "sk-".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, RecapError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            upload_dir: Self::get_env_path("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            max_upload_bytes: Self::get_env_parsed("MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: Self::get_env_string("LOG_LEVEL").unwrap_or(defaults.log_level),
            server_host: Self::get_env_string("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            api_base_url: Self::get_env_string("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            standard_model: Self::get_env_string("STANDARD_MODEL")
                .unwrap_or(defaults.standard_model),
            advanced_model: Self::get_env_string("ADVANCED_MODEL")
                .unwrap_or(defaults.advanced_model),
            embedding_model: Self::get_env_string("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            tokenizer_model: Self::get_env_string("TOKENIZER_MODEL")
                .unwrap_or(defaults.tokenizer_model),
            min_document_tokens: Self::get_env_parsed("MIN_DOCUMENT_TOKENS")?
                .unwrap_or(defaults.min_document_tokens),
            max_document_tokens: Self::get_env_parsed("MAX_DOCUMENT_TOKENS")?
                .unwrap_or(defaults.max_document_tokens),
            chunk_count_hint: Self::get_env_parsed("CHUNK_COUNT_HINT")?
                .unwrap_or(defaults.chunk_count_hint),
            min_chunk_tokens: Self::get_env_parsed("MIN_CHUNK_TOKENS")?
                .unwrap_or(defaults.min_chunk_tokens),
            max_chunk_tokens: Self::get_env_parsed("MAX_CHUNK_TOKENS")?
                .unwrap_or(defaults.max_chunk_tokens),
            max_concurrent_requests: Self::get_env_parsed("MAX_CONCURRENT_REQUESTS")?
                .unwrap_or(defaults.max_concurrent_requests),
            request_timeout_secs: Self::get_env_parsed("REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            transcript_languages: Self::get_env_string("TRANSCRIPT_LANGUAGES")
                .map(|langs| parse_list(&langs))
                .unwrap_or(defaults.transcript_languages),
            // An explicitly empty prefix is meaningful, so read it raw
            api_key_prefix: std::env::var("API_KEY_PREFIX").unwrap_or(defaults.api_key_prefix),
        };

        config.validate()?;

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        Self::get_env_string(key).map(PathBuf::from)
    }

    /// Get non-empty string from environment variable
    fn get_env_string(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse environment variable, failing loudly on malformed values
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, RecapError> {
        match Self::get_env_string(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| RecapError::config(format!("{} has an invalid value: {}", key, raw))),
            None => Ok(None),
        }
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), RecapError> {
        for dir in [&self.upload_dir, &self.log_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    RecapError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), RecapError> {
        for (name, value) in [
            ("STANDARD_MODEL", &self.standard_model),
            ("ADVANCED_MODEL", &self.advanced_model),
            ("EMBEDDING_MODEL", &self.embedding_model),
            ("TOKENIZER_MODEL", &self.tokenizer_model),
        ] {
            if value.trim().is_empty() {
                return Err(RecapError::config(format!("{} cannot be empty", name)));
            }
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(RecapError::config(
                "API base URL must start with http:// or https://",
            ));
        }

        if self.server_port == 0 {
            return Err(RecapError::config("Server port cannot be 0"));
        }

        if self.min_document_tokens > self.max_document_tokens {
            return Err(RecapError::config(format!(
                "Document token window is empty: [{}, {}]",
                self.min_document_tokens, self.max_document_tokens
            )));
        }

        if self.min_chunk_tokens == 0 || self.min_chunk_tokens > self.max_chunk_tokens {
            return Err(RecapError::config(format!(
                "Invalid chunk token bounds: [{}, {}]",
                self.min_chunk_tokens, self.max_chunk_tokens
            )));
        }

        if self.max_upload_bytes == 0 {
            return Err(RecapError::config("Max upload size must be at least 1 byte"));
        }

        if self.chunk_count_hint == 0 {
            return Err(RecapError::config("Chunk count hint must be at least 1"));
        }

        if self.max_concurrent_requests == 0 {
            return Err(RecapError::config("Max concurrent requests must be at least 1"));
        }

        Ok(())
    }
}

/// Split a comma separated list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8501);
        assert_eq!(config.min_document_tokens, 2000);
        assert_eq!(config.max_document_tokens, 800_000);
        assert_eq!(config.chunk_count_hint, 10);
        assert_eq!(config.max_upload_bytes, 200 * 1024 * 1024);
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "127.0.0.1:8501");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.standard_model = String::new();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.api_base_url = "api.openai.com".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.min_document_tokens = 10;
        invalid_config.max_document_tokens = 5;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.min_chunk_tokens = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.max_concurrent_requests = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.max_upload_bytes = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("en, de,,fr "), vec!["en", "de", "fr"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.upload_dir = dir.path().join("uploads");
        config.log_dir = dir.path().join("log");

        config.ensure_directories().unwrap();
        assert!(config.upload_dir.is_dir());
        assert!(config.log_dir.is_dir());
    }
}
