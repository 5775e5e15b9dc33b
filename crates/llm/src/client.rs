use async_trait::async_trait;
use recap_common::{RecapError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::llm_trait::{ClientFactory, LlmClient};
use crate::types::{
    ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, ModelList,
};

const SERVICE: &str = "model API";

/// OpenAI-compatible API client bound to one API key
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    /// Create new client
    pub fn new(
        base_url: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        debug!(
            "Model API client initialized: {} (key {})",
            base_url,
            credentials.fingerprint()
        );
        Ok(Self {
            base_url,
            api_key: credentials.api_key().to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Decode a response, mapping auth failures to `InvalidCredential`
    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        method: &'static str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, method, &body));
        }

        response.json::<T>().await.map_err(|e| {
            RecapError::external(SERVICE, format!("Failed to parse {} response: {}", method, e))
        })
    }

    fn send_error(method: &'static str, e: reqwest::Error) -> RecapError {
        RecapError::external(SERVICE, format!("Failed to send {} request: {}", method, e))
    }
}

/// Map a non-2xx status to the error taxonomy
fn status_error(status: StatusCode, method: &str, body: &str) -> RecapError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RecapError::invalid_credential(
            format!("{} rejected the API key ({})", method, status),
        ),
        _ => RecapError::external(
            SERVICE,
            format!("{} failed with status {}: {}", method, status, body),
        ),
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<String> {
        debug!(
            "Sending chat request - Model: {}, Prompt length: {}",
            request.model,
            request.prompt().len()
        );

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::send_error("chat", e))?;

        let result: ChatResponse = Self::handle_response(response, "chat").await?;

        let text = result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RecapError::external(SERVICE, "Empty completion from model"));
        }

        debug!(
            "Received completion from {} - Length: {}",
            result.model,
            text.len()
        );
        Ok(text)
    }

    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings - Model: {}, Inputs: {}", model, inputs.len());

        let request = EmbeddingRequest {
            model: model.to_string(),
            input: inputs.to_vec(),
        };

        let response = self
            .client
            .post(self.url("embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::send_error("embeddings", e))?;

        let result: EmbeddingResponse = Self::handle_response(response, "embeddings").await?;
        order_embeddings(result, inputs.len())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Self::send_error("models", e))?;

        let result: ModelList = Self::handle_response(response, "models").await?;
        Ok(result.data.into_iter().map(|m| m.id).collect())
    }
}

/// Put embeddings back in input order and check none are missing
fn order_embeddings(mut response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    response.data.sort_by_key(|d| d.index);

    let in_order = response
        .data
        .iter()
        .enumerate()
        .all(|(i, d)| d.index == i);

    if response.data.len() != expected || !in_order {
        return Err(RecapError::external(
            SERVICE,
            format!(
                "Expected {} embeddings, received {}",
                expected,
                response.data.len()
            ),
        ));
    }

    if response.data.iter().any(|d| d.embedding.is_empty()) {
        return Err(RecapError::external(SERVICE, "Empty embedding from model"));
    }

    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

/// Creates `OpenAiClient`s for per-request credentials
#[derive(Debug, Clone)]
pub struct OpenAiConnector {
    base_url: String,
    timeout: Duration,
}

impl OpenAiConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        info!("Model API endpoint: {}", base_url);
        Self { base_url, timeout }
    }
}

impl ClientFactory for OpenAiConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn LlmClient>> {
        let client = OpenAiClient::new(self.base_url.clone(), credentials, self.timeout)?;
        Ok(Arc::new(client))
    }
}
