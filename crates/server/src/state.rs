use chrono::{DateTime, Utc};
use std::sync::Arc;
use mediacut_core::{Config, Converter, MediaProcessor, ProcessorConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    processor: MediaProcessor,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, converter: Arc<dyn Converter>) -> Self {
        let processor = MediaProcessor::new(ProcessorConfig::from(&config), converter);
        Self {
            config,
            processor,
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn processor(&self) -> &MediaProcessor {
        &self.processor
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
