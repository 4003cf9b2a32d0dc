use crate::error::Result;
use crate::results::{ArticleFields, Card};
use async_trait::async_trait;
use std::time::Duration;

/// Structured access to a rendered page.
///
/// The listing and article processors only talk to a page through this trait,
/// so the browser behind it can be swapped without touching their logic.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// URL the page ended up on after navigation
    async fn current_url(&self) -> Result<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Waits up to `timeout` for an element matching `selector` to appear
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Clicks the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Every card currently rendered on a listing page
    async fn extract_cards(&self) -> Result<Vec<Card>>;

    /// Publish date text of an article page
    async fn extract_article_date(&self) -> Result<String>;

    /// Header and body fields of an article page
    async fn extract_article_fields(&self) -> Result<ArticleFields>;
}
