use crate::config::HarvestConfig;
use crate::crawlers::page::PageExtractor;
use crate::error::Result;
use crate::filter::{CardFilter, derive_blog_slug};
use crate::parsers::{CARD, LOAD_MORE_BUTTON};
use crate::results::ArticleTask;
use crate::window::compute_window;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;

/// Inputs for one listing pass
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Days before today still accepted
    pub look_back_window: u32,

    /// Maximum "load more" activations; 0 keeps only the initial cards
    pub pagination_limit: u32,

    /// How long to wait for the "load more" control to appear
    pub load_more_timeout: Duration,

    /// Fixed pause after each activation so new cards can render
    pub settle_delay: Duration,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            look_back_window: 0,
            pagination_limit: 1,
            load_more_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(5),
        }
    }
}

impl From<&HarvestConfig> for ListingOptions {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            look_back_window: config.look_back_window,
            pagination_limit: config.pagination_limit,
            ..Self::default()
        }
    }
}

/// Paginates a listing page and turns its recent, distinct cards into article tasks
pub async fn process_listing<P>(page: &P, options: &ListingOptions) -> Result<Vec<ArticleTask>>
where
    P: PageExtractor + ?Sized,
{
    process_listing_at(page, options, Local::now().naive_local()).await
}

/// Same as [`process_listing`] with an explicit local "now"
pub async fn process_listing_at<P>(
    page: &P,
    options: &ListingOptions,
    now: NaiveDateTime,
) -> Result<Vec<ArticleTask>>
where
    P: PageExtractor + ?Sized,
{
    let url = page.current_url().await?;
    ::log::info!("processing listing page: {}", url);
    ::log::debug!(
        "inputs: lookBackWindow={}, paginationLimit={}",
        options.look_back_window,
        options.pagination_limit
    );

    paginate(page, options).await;

    ::log::info!("parsing all cards");
    let cards = page.extract_cards().await?;

    let blog = derive_blog_slug(&url);
    let window = compute_window(options.look_back_window, now);
    let target_date_text = window.target_date_text();

    ::log::info!(
        "filtering {} cards: {} - {}",
        cards.len(),
        target_date_text,
        window.start_of_today_text()
    );
    let cards = CardFilter::new(window).apply(cards);

    ::log::info!("enqueuing {} cards", cards.len());
    let tasks = cards
        .into_iter()
        .map(|card| {
            ::log::debug!("enqueueing url: {}, {}", card.url, card.title);
            ArticleTask::from_card(card, &blog, &target_date_text)
        })
        .collect();

    Ok(tasks)
}

/// Activates the "load more" control up to `pagination_limit` times.
///
/// Stops at the first missing or failing control and returns the number of
/// successful activations.
pub async fn paginate<P>(page: &P, options: &ListingOptions) -> u32
where
    P: PageExtractor + ?Sized,
{
    ::log::info!("paginating {} times", options.pagination_limit);

    let mut activations = 0;
    for _ in 0..options.pagination_limit {
        match page.count(CARD).await {
            Ok(n) => ::log::debug!("Number of cards detected: {}", n),
            Err(e) => ::log::debug!("could not count cards: {}", e),
        }

        if let Err(e) = load_more(page, options.load_more_timeout).await {
            ::log::error!("error clicking on the \"more\" button: {}", e);
            break;
        }
        activations += 1;

        tokio::time::sleep(options.settle_delay).await;
    }

    activations
}

async fn load_more<P>(page: &P, timeout: Duration) -> Result<()>
where
    P: PageExtractor + ?Sized,
{
    page.wait_for(LOAD_MORE_BUTTON, timeout).await?;
    page.click(LOAD_MORE_BUTTON).await
}
