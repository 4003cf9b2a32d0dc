//! Incremental harvester for paginated blog category pages.
//!
//! A run visits each configured listing page, expands it with the "load more"
//! control, keeps cards published inside the lookback window, and re-checks
//! every article page against the same window before emitting a record.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod sink;
pub mod utils;
pub mod window;

pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use results::{ArticleRecord, ArticleTask, Card};

use std::path::Path;
use tokio::sync::mpsc;

/// Builder for a harvest run
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(HarvestConfig::from_file(path)?))
    }

    /// Replace the listing pages to start from
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.config.urls = urls;
        self
    }

    pub fn with_look_back_window(mut self, days: u32) -> Self {
        self.config.look_back_window = days;
        self
    }

    pub fn with_pagination_limit(mut self, limit: u32) -> Self {
        self.config.pagination_limit = limit;
        self
    }

    /// Set the number of concurrent browser sessions
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Start the harvest and get a receiver for accepted articles.
    ///
    /// Browser sessions are closed as workers run out of work; the receiver
    /// yields `None` once the run is over.
    pub async fn start(self) -> Result<mpsc::Receiver<ArticleRecord>> {
        crawlers::web::start(&self.config).await
    }
}
