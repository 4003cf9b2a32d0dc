use blog_harvest::HarvestConfig;
use blog_harvest::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blog-harvest")]
#[command(about = "Harvests recent articles from paginated blog category pages")]
#[command(version)]
pub struct Args {
    /// Listing pages to harvest (defaults to the configured or built-in list)
    pub urls: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Days before today still accepted (0 means only today)
    #[arg(short, long)]
    pub look_back_window: Option<u32>,

    /// Maximum "load more" activations per listing page
    #[arg(short, long)]
    pub pagination_limit: Option<u32>,

    /// Number of concurrent browser sessions
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long)]
    pub max_requests_per_minute: Option<u32>,

    #[arg(long)]
    pub max_request_retries: Option<u32>,

    /// Per-request handler timeout in seconds
    #[arg(long)]
    pub request_handler_timeout: Option<u64>,

    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// File to write JSON lines to (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Builds the run configuration: file values, then the environment, then CLI flags
    pub fn to_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        config.apply_env();
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut HarvestConfig) {

        if !self.urls.is_empty() {
            config.urls = self.urls.clone();
        }
        if let Some(days) = self.look_back_window {
            config.look_back_window = days;
        }
        if let Some(limit) = self.pagination_limit {
            config.pagination_limit = limit;
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(rpm) = self.max_requests_per_minute {
            config.max_requests_per_minute = rpm;
        }
        if let Some(retries) = self.max_request_retries {
            config.max_request_retries = retries;
        }
        if let Some(secs) = self.request_handler_timeout {
            config.request_handler_timeout_secs = secs;
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
    }
}
