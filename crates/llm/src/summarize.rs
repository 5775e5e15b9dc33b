use futures::stream::{self, StreamExt, TryStreamExt};
use recap_common::{RecapError, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::chunking::{TextChunk, TokenSplitter};
use crate::llm_trait::{ChunkSelector, LlmClient};
use crate::prompts::PromptPair;
use crate::tokens::TokenCounter;
use crate::types::{ChatRequest, ModelSelection, SummarizeOptions, Summary};

/// Sampling temperature for both steps
const TEMPERATURE: f32 = 0.0;

/// Separator between per-chunk summaries in the combine input
pub const SUMMARY_SEPARATOR: &str = "\n\n";

/// Summarizer for long text using map/combine
pub struct Summarizer {
    client: Arc<dyn LlmClient>,
    models: ModelSelection,
    splitter: TokenSplitter,
    counter: Arc<dyn TokenCounter>,
    selector: Option<Arc<dyn ChunkSelector>>,
    max_concurrency: usize,
}

impl Summarizer {
    /// Create new summarizer
    pub fn new(
        client: Arc<dyn LlmClient>,
        models: ModelSelection,
        splitter: TokenSplitter,
        counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            client,
            models,
            splitter,
            counter,
            selector: None,
            max_concurrency: 1,
        }
    }

    /// Attach the selector consulted when `find_clusters` is set
    pub fn with_selector(mut self, selector: Arc<dyn ChunkSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Allow up to `limit` map calls in flight (1 = sequential)
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Summarize text: split, map each chunk, combine the partial summaries
    pub async fn summarize(
        &self,
        text: &str,
        chunk_hint: usize,
        prompts: &PromptPair,
        options: SummarizeOptions,
    ) -> Result<Summary> {
        info!("Starting summarization - Text length: {} chars", text.len());

        // Step 1: Split into chunks
        let chunks = self.split(text, chunk_hint).await?;
        if chunks.is_empty() {
            return Err(RecapError::invalid_input("Document has no text to summarize"));
        }
        info!("Split text into {} chunks", chunks.len());

        // Step 2: Optionally narrow down to representative chunks
        let selected = self.select_chunks(&chunks, options).await?;

        // Step 3: Summarize each chunk (map)
        let chunk_summaries = self.map_chunks(&selected, prompts).await?;

        // Step 4: Combine in document order
        let combined = chunk_summaries.join(SUMMARY_SEPARATOR);
        info!("Combined chunk summaries - Length: {} chars", combined.len());

        let model = self.models.model_for(options.tier()).to_string();
        let final_prompt = prompts.combine.render(&combined)?;
        let text = self
            .client
            .chat(ChatRequest::single(&model, final_prompt).with_temperature(TEMPERATURE))
            .await?;

        Ok(Summary {
            text: text.trim().to_string(),
            model,
            chunks_total: chunks.len(),
            chunks_summarized: selected.len(),
        })
    }

    /// Tokenizing the whole document is CPU bound, so it runs on the blocking pool
    async fn split(&self, text: &str, chunk_hint: usize) -> Result<Vec<TextChunk>> {
        let splitter = self.splitter;
        let counter = self.counter.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || splitter.split(&text, counter.as_ref(), chunk_hint))
            .await
            .map_err(|e| RecapError::internal(format!("Chunking task aborted: {}", e)))
    }

    /// Chunks that go through the map step, in document order
    async fn select_chunks<'a>(
        &self,
        chunks: &'a [TextChunk],
        options: SummarizeOptions,
    ) -> Result<Vec<&'a TextChunk>> {
        let selector = match (&self.selector, options.find_clusters) {
            (Some(selector), true) => selector,
            _ => return Ok(chunks.iter().collect()),
        };

        let mut indices = selector.select(chunks).await?;
        indices.sort_unstable();
        indices.dedup();

        if indices.is_empty() {
            return Err(RecapError::external("clustering", "No chunks selected"));
        }

        let selected = indices
            .into_iter()
            .map(|i| {
                chunks.get(i).ok_or_else(|| {
                    RecapError::external("clustering", format!("Selected chunk {} does not exist", i))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Clustering selected {} of {} chunks",
            selected.len(),
            chunks.len()
        );
        Ok(selected)
    }

    /// One map call per chunk; results keep chunk order, first failure aborts
    async fn map_chunks(&self, chunks: &[&TextChunk], prompts: &PromptPair) -> Result<Vec<String>> {
        let total = chunks.len();

        stream::iter(chunks.iter().copied())
            .map(|chunk| async move {
                debug!("Summarizing chunk {}/{}", chunk.index + 1, total);
                self.summarize_chunk(chunk, prompts).await
            })
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }

    /// Summarize a single chunk
    async fn summarize_chunk(&self, chunk: &TextChunk, prompts: &PromptPair) -> Result<String> {
        let prompt = prompts.map.render(chunk.text.trim())?;
        let request = ChatRequest::single(&self.models.standard, prompt).with_temperature(TEMPERATURE);

        let summary = self.client.chat(request).await?;
        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    /// Echoes prompts back, recording every request
    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<ChatRequest>>,
        fail_on: Option<usize>,
    }

    impl RecordingClient {
        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn chat(&self, request: ChatRequest) -> Result<String> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            if Some(requests.len()) == self.fail_on {
                return Err(RecapError::external("model API", "boom"));
            }
            Ok(request.prompt().to_string())
        }

        async fn embed(&self, _model: &str, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(Vec::new())
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct EveryOther;

    #[async_trait]
    impl ChunkSelector for EveryOther {
        async fn select(&self, chunks: &[TextChunk]) -> Result<Vec<usize>> {
            Ok((0..chunks.len()).rev().step_by(2).collect())
        }
    }

    fn prompts() -> PromptPair {
        PromptPair::new("test", "MAP[{{text}}]", "{{text}}").unwrap()
    }

    fn summarizer(client: Arc<RecordingClient>) -> Summarizer {
        Summarizer::new(
            client,
            ModelSelection::new("standard", "advanced"),
            TokenSplitter::new(3, 3),
            Arc::new(WordCounter),
        )
    }

    /// N sentences of three words each -> N chunks with target 3
    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("Sentence number s{}.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[tokio::test]
    async fn test_combine_receives_ordered_concatenation() {
        for n in [1, 2, 5, 12] {
            let client = Arc::new(RecordingClient::default());
            let summary = summarizer(client.clone())
                .with_max_concurrency(4)
                .summarize(&sentences(n), 1, &prompts(), SummarizeOptions::default())
                .await
                .unwrap();

            let requests = client.requests();
            assert_eq!(requests.len(), n + 1);
            assert_eq!(summary.chunks_total, n);
            assert_eq!(summary.chunks_summarized, n);

            let expected = (0..n)
                .map(|i| format!("MAP[Sentence number s{}.]", i))
                .collect::<Vec<_>>()
                .join(SUMMARY_SEPARATOR);
            let combine = requests.last().unwrap();
            assert_eq!(combine.prompt(), expected);
            assert_eq!(summary.text, expected);
        }
    }

    #[tokio::test]
    async fn test_tier_only_affects_combine_model() {
        let client = Arc::new(RecordingClient::default());
        let options = SummarizeOptions {
            use_advanced_model: true,
            find_clusters: false,
        };
        let summary = summarizer(client.clone())
            .summarize(&sentences(3), 1, &prompts(), options)
            .await
            .unwrap();

        let requests = client.requests();
        assert!(requests[..3].iter().all(|r| r.model == "standard"));
        assert_eq!(requests[3].model, "advanced");
        assert_eq!(summary.model, "advanced");
    }

    #[tokio::test]
    async fn test_map_failure_is_fatal() {
        let client = Arc::new(RecordingClient {
            fail_on: Some(2),
            ..Default::default()
        });
        let err = summarizer(client.clone())
            .summarize(&sentences(4), 1, &prompts(), SummarizeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::ExternalService { .. }));
        // No combine call after the failure
        assert!(client.requests().len() <= 4);
    }

    #[tokio::test]
    async fn test_selector_used_only_with_find_clusters() {
        let options = SummarizeOptions {
            use_advanced_model: false,
            find_clusters: true,
        };

        let client = Arc::new(RecordingClient::default());
        let summary = summarizer(client.clone())
            .with_selector(Arc::new(EveryOther))
            .summarize(&sentences(5), 1, &prompts(), options)
            .await
            .unwrap();

        assert_eq!(summary.chunks_total, 5);
        assert_eq!(summary.chunks_summarized, 3);
        // Selected chunks are mapped in document order
        assert_eq!(
            summary.text,
            ["MAP[Sentence number s0.]", "MAP[Sentence number s2.]", "MAP[Sentence number s4.]"]
                .join(SUMMARY_SEPARATOR)
        );

        let client = Arc::new(RecordingClient::default());
        let summary = summarizer(client.clone())
            .with_selector(Arc::new(EveryOther))
            .summarize(&sentences(5), 1, &prompts(), SummarizeOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.chunks_summarized, 5);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let client = Arc::new(RecordingClient::default());
        let err = summarizer(client.clone())
            .summarize("   ", 1, &prompts(), SummarizeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));
        assert!(client.requests().is_empty());
    }
}
