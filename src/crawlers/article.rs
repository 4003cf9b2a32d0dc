use crate::crawlers::page::PageExtractor;
use crate::error::Result;
use crate::results::{ArticleRecord, ArticleTask};
use crate::window::{display_date, is_before_window, parse_date};

/// Result of processing one article task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    Accepted(ArticleRecord),
    /// The article's own date falls before the propagated window
    Skipped,
}

/// Re-validates an article against the window carried in its task and
/// builds the output record.
///
/// The target date is read from the task payload, never from the clock, so
/// a retried task reaches the same decision.
pub async fn process_article<P>(page: &P, task: &ArticleTask) -> Result<ArticleOutcome>
where
    P: PageExtractor + ?Sized,
{
    let loaded_url = page.current_url().await?;
    let url = if loaded_url.is_empty() {
        task.url.clone()
    } else {
        loaded_url
    };

    let date_text = page.extract_article_date().await?;
    let date = parse_date(&date_text);
    ::log::debug!(
        "parsing page ({}): {} {}",
        display_date(date),
        url,
        task.payload.title
    );

    let target_date_text = &task.payload.target_date_text;
    match parse_date(target_date_text) {
        Some(target_date) if is_before_window(date, target_date) => {
            ::log::debug!(
                "skipping article: ({} < {}): {}",
                display_date(date),
                target_date_text,
                url
            );
            return Ok(ArticleOutcome::Skipped);
        }
        Some(_) => {}
        None => ::log::warn!(
            "task for {} carries an unreadable target date {:?}",
            url,
            target_date_text
        ),
    }

    let fields = page.extract_article_fields().await?;
    ::log::info!("saving page ({}): {} {}", date_text, url, fields.title);

    Ok(ArticleOutcome::Accepted(ArticleRecord::new(
        url,
        date,
        fields,
        &task.payload,
    )))
}
