use recap_common::{AppConfig, RecapError, Result};
use recap_llm::{
    verify_access, ClientFactory, Credentials, ModelSelection, OpenAiConnector, PromptLibrary,
    SizeGate, SummarizeOptions, Summarizer, Summary, TiktokenCounter, TokenCounter, TokenSplitter,
};
use recap_loader::{DocumentLoader, DocumentSource, Input, YoutubeTranscripts};
use recap_vector::ClusterSelector;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Everything one summarize request needs
#[derive(Default)]
pub struct SummarizeRequest {
    /// Uploaded file or video URL; `None` when the user gave neither
    pub input: Option<Input>,

    /// API key as typed by the user
    pub api_key: String,

    pub options: SummarizeOptions,
}

impl fmt::Debug for SummarizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeRequest")
            .field("input", &self.input)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Successful request result
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub request_id: Uuid,
    pub summary: Summary,
    pub source: DocumentSource,
    pub document_tokens: usize,
    pub elapsed_ms: u64,
}

/// Request-scoped summarize workflow
///
/// Holds only immutable collaborators; every request gets its own client,
/// document and summarizer.
pub struct Pipeline {
    config: Arc<AppConfig>,
    clients: Arc<dyn ClientFactory>,
    loader: DocumentLoader,
    counter: Arc<dyn TokenCounter>,
    prompts: Arc<PromptLibrary>,
}

impl Pipeline {
    pub fn new(
        config: Arc<AppConfig>,
        clients: Arc<dyn ClientFactory>,
        loader: DocumentLoader,
        counter: Arc<dyn TokenCounter>,
        prompts: Arc<PromptLibrary>,
    ) -> Self {
        Self {
            config,
            clients,
            loader,
            counter,
            prompts,
        }
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self> {
        let clients = Arc::new(OpenAiConnector::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        ));
        let transcripts = Arc::new(YoutubeTranscripts::new(config.transcript_languages.clone()));
        let counter = Arc::new(TiktokenCounter::for_model(&config.tokenizer_model)?);
        let prompts = Arc::new(PromptLibrary::builtin()?);

        Ok(Self::new(
            config,
            clients,
            DocumentLoader::new(transcripts),
            counter,
            prompts,
        ))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate, load and summarize
    ///
    /// The request is consumed, so an uploaded temp file is removed by the
    /// time this returns, whatever the outcome.
    pub async fn run(&self, request: SummarizeRequest) -> Result<SummaryOutcome> {
        let request_id = Uuid::new_v4();
        let span = info_span!("summarize", %request_id);

        async move {
            let started = Instant::now();
            let result = self.execute(request_id, request, started).await;

            match &result {
                Ok(outcome) => info!(
                    "Request completed in {} ms - {} of {} chunks summarized",
                    outcome.elapsed_ms,
                    outcome.summary.chunks_summarized,
                    outcome.summary.chunks_total
                ),
                Err(e) if e.is_user_error() => warn!("Request rejected: {}", e),
                Err(e) => error!("Request failed: {}", e),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request_id: Uuid,
        request: SummarizeRequest,
        started: Instant,
    ) -> Result<SummaryOutcome> {
        let SummarizeRequest {
            input,
            api_key,
            options,
        } = request;

        // Step 1: Input present
        let input = input.ok_or_else(|| RecapError::missing_input("No file or video URL"))?;
        info!("Received {} ({:?})", input.describe(), options);

        // Step 2: Key well-formed
        let credentials = Credentials::parse(&api_key, &self.config.api_key_prefix)?;

        // Step 3: Key accepted by the provider for the requested tier
        let client = self.clients.connect(&credentials)?;
        let models = ModelSelection::new(&self.config.standard_model, &self.config.advanced_model);
        verify_access(client.as_ref(), &models, options.tier()).await?;

        // Step 4: Load, then release the upload
        let document = self.loader.load(&input).await?;
        drop(input);

        // Step 5: Size gate, counted off the async workers
        let gate = SizeGate::new(self.config.min_document_tokens, self.config.max_document_tokens);
        let counter = self.counter.clone();
        let text = document.text().to_string();
        let document_tokens =
            tokio::task::spawn_blocking(move || gate.measure(counter.as_ref(), &text))
                .await
                .map_err(|e| RecapError::internal(format!("Token counting task aborted: {}", e)))??;
        info!("Document accepted - {} tokens", document_tokens);

        // Step 6: Summarize
        let splitter = TokenSplitter::new(self.config.min_chunk_tokens, self.config.max_chunk_tokens);
        let mut summarizer = Summarizer::new(client.clone(), models, splitter, self.counter.clone())
            .with_max_concurrency(self.config.max_concurrent_requests);

        if options.find_clusters {
            summarizer = summarizer.with_selector(Arc::new(ClusterSelector::new(
                client,
                self.config.embedding_model.clone(),
                self.config.chunk_count_hint,
            )));
        }

        let prompts = self.prompts.select(document.source().is_transcript());
        let summary = summarizer
            .summarize(document.text(), self.config.chunk_count_hint, prompts, options)
            .await?;

        Ok(SummaryOutcome {
            request_id,
            summary,
            source: document.source().clone(),
            document_tokens,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
