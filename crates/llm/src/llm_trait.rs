use recap_common::Result;
use std::sync::Arc;
use crate::chunking::TextChunk;
use crate::credentials::Credentials;
use crate::types::ChatRequest;
use async_trait::async_trait;

/// Common trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run a chat completion and return the assistant text
    async fn chat(&self, request: ChatRequest) -> Result<String>;

    /// Generate one embedding per input, in input order
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// List model ids the credential can use
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Builds a client bound to one request's credentials
pub trait ClientFactory: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn LlmClient>>;
}

/// Chooses which chunks go through the map step
#[async_trait]
pub trait ChunkSelector: Send + Sync {
    /// Indices into `chunks`, ascending
    async fn select(&self, chunks: &[TextChunk]) -> Result<Vec<usize>>;
}
