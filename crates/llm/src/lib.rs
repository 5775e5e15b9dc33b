//! Recap LLM Integration
//!
//! OpenAI-compatible API client, token accounting, prompt templates and the
//! map/combine summarization driver

mod chunking;
mod client;
mod credentials;
mod llm_trait;
mod prompts;
mod summarize;
mod tokens;
mod types;

pub use chunking::{TextChunk, TokenSplitter};
pub use client::{OpenAiClient, OpenAiConnector};
pub use credentials::{verify_access, Credentials};
pub use llm_trait::{ChunkSelector, ClientFactory, LlmClient};
pub use prompts::{
    PromptLibrary, PromptPair, PromptTemplate, DOCUMENT_COMBINE_PROMPT, DOCUMENT_MAP_PROMPT,
    TRANSCRIPT_COMBINE_PROMPT, TRANSCRIPT_MAP_PROMPT,
};
pub use summarize::{Summarizer, SUMMARY_SEPARATOR};
pub use tokens::{SizeGate, TiktokenCounter, TokenCounter};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, ModelList,
    ModelSelection, ModelTier, SummarizeOptions, Summary,
};
