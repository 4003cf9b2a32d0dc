use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Category index pages harvested when no URLs are configured
pub const DEFAULT_URLS: &[&str] = &[
    "https://azure.microsoft.com/en-us/blog/category/ai-machine-learning/",
    "https://azure.microsoft.com/en-us/blog/category/analytics/",
    "https://azure.microsoft.com/en-us/blog/category/compute/",
    "https://azure.microsoft.com/en-us/blog/category/containers/",
    "https://azure.microsoft.com/en-us/blog/category/databases/",
    "https://azure.microsoft.com/en-us/blog/category/developer-tools/",
    "https://azure.microsoft.com/en-us/blog/category/devops/",
    "https://azure.microsoft.com/en-us/blog/category/hybrid-multicloud/",
    "https://azure.microsoft.com/en-us/blog/category/identity/",
    "https://azure.microsoft.com/en-us/blog/category/internet-of-things/",
    "https://azure.microsoft.com/en-us/blog/category/management-and-governance/",
    "https://azure.microsoft.com/en-us/blog/category/migration/",
    "https://azure.microsoft.com/en-us/blog/category/mobile/",
    "https://azure.microsoft.com/en-us/blog/category/networking/",
    "https://azure.microsoft.com/en-us/blog/category/security/",
    "https://azure.microsoft.com/en-us/blog/category/serverless/",
    "https://azure.microsoft.com/en-us/blog/category/storage/",
    "https://azure.microsoft.com/en-us/blog/category/web/",
];

/// Run configuration for a harvest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestConfig {
    /// Listing pages to start from
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    /// Days before today still accepted; 0 means only today
    #[serde(default)]
    pub look_back_window: u32,

    /// Maximum "load more" activations per listing visit
    #[serde(default = "default_pagination_limit")]
    pub pagination_limit: u32,

    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,

    #[serde(default = "default_max_request_retries")]
    pub max_request_retries: u32,

    #[serde(default = "default_request_handler_timeout_secs")]
    pub request_handler_timeout_secs: u64,

    /// Number of workers, each with its own browser session
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Command line switches passed to the browser
    #[serde(default = "default_browser_args")]
    pub browser_args: Vec<String>,

    /// Path to a specific browser executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_binary: Option<String>,
}

fn default_urls() -> Vec<String> {
    DEFAULT_URLS.iter().map(|u| u.to_string()).collect()
}

fn default_pagination_limit() -> u32 {
    1
}

fn default_max_requests_per_minute() -> u32 {
    5
}

fn default_max_request_retries() -> u32 {
    5
}

fn default_request_handler_timeout_secs() -> u64 {
    600
}

fn default_max_concurrency() -> usize {
    4
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_browser_args() -> Vec<String> {
    ["--headless", "--no-sandbox", "--disable-setuid-sandbox"]
        .iter()
        .map(|a| a.to_string())
        .collect()
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            look_back_window: 0,
            pagination_limit: default_pagination_limit(),
            max_requests_per_minute: default_max_requests_per_minute(),
            max_request_retries: default_max_request_retries(),
            request_handler_timeout_secs: default_request_handler_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            webdriver_url: default_webdriver_url(),
            browser_args: default_browser_args(),
            browser_binary: None,
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Applies the `WEBDRIVER_URL` environment variable, if set
    pub fn apply_env(&mut self) {
        self.apply_webdriver_url(std::env::var("WEBDRIVER_URL").ok());
    }

    /// Replaces the WebDriver URL with a non-empty override
    pub fn apply_webdriver_url(&mut self, webdriver_url: Option<String>) {
        if let Some(url) = webdriver_url.filter(|u| !u.is_empty()) {
            self.webdriver_url = url;
        }
    }

    pub fn request_handler_timeout(&self) -> Duration {
        Duration::from_secs(self.request_handler_timeout_secs)
    }

    /// Checks the values the scheduler cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(HarvestError::Config("no listing URLs configured".into()));
        }
        for url in &self.urls {
            Url::parse(url)?;
        }
        if self.max_requests_per_minute == 0 {
            return Err(HarvestError::Config(
                "maxRequestsPerMinute must be at least 1".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(HarvestError::Config(
                "maxConcurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
