/// Recap error types
///
/// Every variant is terminal for the request that produced it. Nothing in the
/// workspace retries on these.
#[derive(Debug, thiserror::Error)]
pub enum RecapError {
    /// No file and no video URL were supplied
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Input was supplied but cannot be used (bad URL, unsupported upload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// API key is malformed or was rejected by the provider
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// API key cannot use the requested model tier
    #[error("Model tier unavailable: {model}")]
    UnsupportedTier { model: String },

    /// Document is below the token floor
    #[error("Document too small: {tokens} tokens (minimum {minimum})")]
    DocumentTooSmall { tokens: usize, minimum: usize },

    /// Document is above the token ceiling
    #[error("Document too large: {tokens} tokens (maximum {maximum})")]
    DocumentTooLarge { tokens: usize, maximum: usize },

    /// Transcript service, model API, tokenizer, parser or clustering failure
    #[error("{service} error: {message}")]
    ExternalService { service: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecapError {
    /// Create missing input error
    pub fn missing_input<S: Into<String>>(msg: S) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create invalid credential error
    pub fn invalid_credential<S: Into<String>>(msg: S) -> Self {
        Self::InvalidCredential(msg.into())
    }

    /// Create unsupported tier error
    pub fn unsupported_tier<S: Into<String>>(model: S) -> Self {
        Self::UnsupportedTier {
            model: model.into(),
        }
    }

    /// Create external service error
    pub fn external<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

impl RecapError {
    /// Warning text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput(_) => "Please upload a file or enter a YouTube URL.".to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::InvalidCredential(_) => "Key not valid or API is down.".to_string(),
            Self::UnsupportedTier { model } => format!("Key not valid for {}.", model),
            Self::DocumentTooSmall { .. } => "File or transcript too small!".to_string(),
            Self::DocumentTooLarge { .. } => "File or transcript too big!".to_string(),
            Self::ExternalService { service, message } => {
                format!("{} failed: {}", service, message)
            }
            other => other.to_string(),
        }
    }

    /// Validation failures caused by what the user submitted
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_)
                | Self::InvalidInput(_)
                | Self::InvalidCredential(_)
                | Self::UnsupportedTier { .. }
                | Self::DocumentTooSmall { .. }
                | Self::DocumentTooLarge { .. }
        )
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingInput(_) => 400,
            Self::InvalidInput(_) => 400,
            Self::InvalidCredential(_) => 401,
            Self::UnsupportedTier { .. } => 403,
            Self::DocumentTooSmall { .. } => 422,
            Self::DocumentTooLarge { .. } => 413,
            Self::ExternalService { .. } => 502,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Io(_) => 500,
            Self::Json(_) => 500,
            Self::Other(_) => 500,
        }
    }
}
