use serde::{Deserialize, Serialize};

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role ("system", "user", "assistant")
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name (e.g., "gpt-3.5-turbo", "gpt-4")
    pub model: String,

    /// Conversation so far
    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Single user-turn request
    pub fn single(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text of the last message, i.e. the rendered prompt
    pub fn prompt(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Model that answered
    #[serde(default)]
    pub model: String,

    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Embedding request
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    /// Position of the matching input
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// `GET /models` response
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

/// Model class used for the combine step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Standard,
    Advanced,
}

/// Concrete model names per tier
#[derive(Debug, Clone)]
pub struct ModelSelection {
    /// Used for every map call and for the standard-tier combine
    pub standard: String,

    /// Used for the advanced-tier combine
    pub advanced: String,
}

impl ModelSelection {
    pub fn new(standard: impl Into<String>, advanced: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            advanced: advanced.into(),
        }
    }

    /// Model name for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard,
            ModelTier::Advanced => &self.advanced,
        }
    }
}

/// Per-request summarization switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeOptions {
    /// Use the advanced model for the combine step
    #[serde(default)]
    pub use_advanced_model: bool,

    /// Group chunks by embedding similarity and summarize one chunk per group
    #[serde(default)]
    pub find_clusters: bool,
}

impl SummarizeOptions {
    pub fn tier(&self) -> ModelTier {
        if self.use_advanced_model {
            ModelTier::Advanced
        } else {
            ModelTier::Standard
        }
    }
}

/// Summarization result
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Final summary text (markdown)
    pub text: String,

    /// Model used for the combine step
    pub model: String,

    /// Chunks produced by the splitter
    pub chunks_total: usize,

    /// Chunks sent through the map step
    pub chunks_summarized: usize,
}
