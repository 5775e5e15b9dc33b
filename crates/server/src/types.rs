use chrono::{DateTime, Utc};
use recap_common::RecapError;
use recap_loader::DocumentSource;
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::SummaryOutcome;
use crate::render::markdown_to_html;

/// JSON body of a successful summarize call
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub request_id: Uuid,
    pub summary: String,
    pub summary_html: String,
    pub model: String,
    pub chunks_total: usize,
    pub chunks_summarized: usize,
    pub document_tokens: usize,
    pub source: DocumentSource,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl From<SummaryOutcome> for SummaryResponse {
    fn from(outcome: SummaryOutcome) -> Self {
        Self {
            request_id: outcome.request_id,
            summary_html: markdown_to_html(&outcome.summary.text),
            summary: outcome.summary.text,
            model: outcome.summary.model,
            chunks_total: outcome.summary.chunks_total,
            chunks_summarized: outcome.summary.chunks_summarized,
            document_tokens: outcome.document_tokens,
            source: outcome.source,
            elapsed_ms: outcome.elapsed_ms,
            generated_at: Utc::now(),
        }
    }
}

/// JSON body of a failed summarize call
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: &'static str,

    /// Message for the user
    pub warning: String,
}

impl From<&RecapError> for ErrorResponse {
    fn from(e: &RecapError) -> Self {
        let error = match e {
            RecapError::MissingInput(_) => "missing_input",
            RecapError::InvalidInput(_) => "invalid_input",
            RecapError::InvalidCredential(_) => "invalid_credential",
            RecapError::UnsupportedTier { .. } => "unsupported_tier",
            RecapError::DocumentTooSmall { .. } => "document_too_small",
            RecapError::DocumentTooLarge { .. } => "document_too_large",
            RecapError::ExternalService { .. } => "external_service",
            _ => "internal",
        };

        Self {
            error,
            warning: e.user_message(),
        }
    }
}

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
