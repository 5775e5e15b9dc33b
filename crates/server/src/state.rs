use recap_common::{AppConfig, Result};
use std::sync::Arc;

use crate::page::Pages;
use crate::pipeline::Pipeline;

/// Shared application state
///
/// Read-only after startup; nothing here changes between requests.
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Summarize workflow
    pub pipeline: Pipeline,

    /// Page templates
    pub pages: Pages,
}

impl AppState {
    /// Create application state with the production pipeline
    pub fn new(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let pipeline = Pipeline::from_config(config.clone())?;
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: Arc<AppConfig>, pipeline: Pipeline) -> Result<Self> {
        Ok(Self {
            config,
            pipeline,
            pages: Pages::new()?,
        })
    }
}
