use super::{
    AUTHOR, BOOKMARK, CARD, CATEGORY_TAG, DESCRIPTION, PUBLISH_DATE, all_text, first_text,
    job_title_beside, parent_element, selector, text_of,
};
use crate::results::Card;
use scraper::Html;

/// Extracts every rendered card from a listing page, in document order.
///
/// Tags are read from the card element itself; the remaining fields are read
/// from the card's enclosing element, which is where the blog places the date,
/// title, byline and summary. Missing fields come back empty.
pub fn parse_cards(html: &str) -> Vec<Card> {
    let doc = Html::parse_document(html);

    let card_selector = selector(CARD);
    let tag_selector = selector(CATEGORY_TAG);
    let date_selector = selector(PUBLISH_DATE);
    let bookmark_selector = selector(BOOKMARK);
    let author_selector = selector(AUTHOR);
    let description_selector = selector(DESCRIPTION);
    let span_selector = selector("span");

    let cards: Vec<Card> = doc
        .select(&card_selector)
        .map(|el| {
            let scope = parent_element(el).unwrap_or(el);
            let bookmark = scope.select(&bookmark_selector).next();
            let author = scope.select(&author_selector).next();

            Card {
                tags: all_text(el, &tag_selector),
                date: first_text(scope, &date_selector),
                title: bookmark
                    .map(|a| first_text(a, &span_selector))
                    .unwrap_or_default(),
                url: bookmark
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or_default()
                    .to_string(),
                author: author.map(text_of).unwrap_or_default(),
                job_title: job_title_beside(author),
                description: first_text(scope, &description_selector),
            }
        })
        .collect();

    ::log::debug!("listing parser found {} cards", cards.len());
    cards
}
