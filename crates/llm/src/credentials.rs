use recap_common::{RecapError, Result};
use std::fmt;
use tracing::{debug, info, warn};

use crate::llm_trait::LlmClient;
use crate::types::{ModelSelection, ModelTier};

/// API key supplied with a single request; never persisted or logged
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Structural check of a raw key, no network involved
    ///
    /// An empty `required_prefix` disables the prefix check.
    pub fn parse(raw: &str, required_prefix: &str) -> Result<Self> {
        let key = raw.trim();

        if key.is_empty() {
            return Err(RecapError::invalid_credential("API key is empty"));
        }

        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(RecapError::invalid_credential(
                "API key contains whitespace or control characters",
            ));
        }

        if !required_prefix.is_empty() && !key.starts_with(required_prefix) {
            return Err(RecapError::invalid_credential(format!(
                "API key must start with '{}'",
                required_prefix
            )));
        }

        if key.len() <= required_prefix.len() {
            return Err(RecapError::invalid_credential("API key is truncated"));
        }

        Ok(Self {
            api_key: key.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Last four characters, for logs
    pub fn fingerprint(&self) -> String {
        let tail: String = self
            .api_key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.fingerprint())
            .finish()
    }
}

/// Check the key against the provider and the requested tier
///
/// Any failed model listing, rejected key or unreachable provider, yields
/// `InvalidCredential`; a key that works but cannot see the advanced model
/// yields `UnsupportedTier`.
pub async fn verify_access(
    client: &dyn LlmClient,
    models: &ModelSelection,
    tier: ModelTier,
) -> Result<()> {
    let available = client.list_models().await.map_err(|e| match e {
        RecapError::InvalidCredential(_) => e,
        other => {
            warn!("Key check failed: {}", other);
            RecapError::invalid_credential(other.to_string())
        }
    })?;
    debug!("Credential can access {} models", available.len());

    if tier == ModelTier::Advanced && !available.iter().any(|m| m == &models.advanced) {
        return Err(RecapError::unsupported_tier(models.advanced.clone()));
    }

    info!("Credential verified for {:?} tier", tier);
    Ok(())
}
