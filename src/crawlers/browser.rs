use crate::config::HarvestConfig;
use crate::crawlers::page::PageExtractor;
use crate::error::{HarvestError, Result};
use crate::parsers;
use crate::results::{ArticleFields, Card};
use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;

/// WebDriver ports tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// A browser tab driven over WebDriver
#[derive(Clone)]
pub struct BrowserPage {
    client: Client,
}

impl BrowserPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigates to `url` and waits for the load to complete
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    /// Ends the WebDriver session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    async fn source(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }
}

#[async_trait]
impl PageExtractor for BrowserPage {
    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.client.find_all(Locator::Css(selector)).await?.len())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.client.find(Locator::Css(selector)).await?;
        element.click().await?;
        Ok(())
    }

    async fn extract_cards(&self) -> Result<Vec<Card>> {
        let html = self.source().await?;
        Ok(parsers::listing::parse_cards(&html))
    }

    async fn extract_article_date(&self) -> Result<String> {
        let html = self.source().await?;
        Ok(parsers::article::parse_date_text(&html))
    }

    async fn extract_article_fields(&self) -> Result<ArticleFields> {
        let html = self.source().await?;
        Ok(parsers::article::parse_fields(&html))
    }
}

/// Chrome capabilities built from the run configuration
pub fn browser_capabilities(config: &HarvestConfig) -> Capabilities {
    let mut chrome_options = json!({ "args": config.browser_args });
    if let Some(binary) = &config.browser_binary {
        chrome_options["binary"] = json!(binary);
    }

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), chrome_options);
    caps
}

async fn connect(url: &str, capabilities: &Capabilities) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities.clone());
    builder
        .connect(url)
        .await
        .map_err(|e| HarvestError::WebDriver(format!("{}: {}", url, e)))
}

/// Opens a browser session for a worker, trying common WebDriver ports if
/// the configured one is unreachable
pub async fn connect_to_webdriver(
    worker_id: usize,
    webdriver_url: &str,
    capabilities: &Capabilities,
) -> Result<BrowserPage> {
    match connect(webdriver_url, capabilities).await {
        Ok(client) => {
            ::log::debug!(
                "Worker {} connected to WebDriver at {}",
                worker_id,
                webdriver_url
            );
            return Ok(BrowserPage::new(client));
        }
        Err(e) => {
            ::log::error!("Worker {} failed to connect to WebDriver: {}", worker_id, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!(
            "Worker {} trying fallback WebDriver URL: {}",
            worker_id,
            url
        );
        if let Ok(client) = connect(url, capabilities).await {
            ::log::debug!(
                "Worker {} connected to fallback WebDriver at {}",
                worker_id,
                url
            );
            return Ok(BrowserPage::new(client));
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::WebDriver(format!(
        "worker {} could not reach any WebDriver server",
        worker_id
    )))
}

/// Whether a browser error means the session is gone and must be reopened
pub fn is_session_lost(error: &HarvestError) -> bool {
    match error {
        HarvestError::Browser(e) => {
            let message = e.to_string();
            message.contains("Unable to find session") || message.contains("invalid session id")
        }
        HarvestError::WebDriver(_) => true,
        _ => false,
    }
}
