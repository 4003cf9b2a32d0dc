use crate::results::Card;
use crate::window::{DateWindow, display_date, parse_date};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Path segment that follows `category/` in a listing URL
static BLOG_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"category/([^/]*)").expect("blog slug pattern is valid"));

/// Derives the blog slug from a listing page URL, empty if there is none
pub fn derive_blog_slug(listing_url: &str) -> String {
    BLOG_SLUG
        .captures(listing_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Outcome of offering one card to a [`CardFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Dated before the window's target date
    TooOld,
    /// Same URL as a card already accepted in this pass
    Duplicate,
}

/// Recency and URL dedup filter for a single listing pass
#[derive(Debug)]
pub struct CardFilter {
    window: DateWindow,
    seen: HashSet<String>,
}

impl CardFilter {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            seen: HashSet::new(),
        }
    }

    /// Decides whether a card is forwarded. The first accepted card per URL wins.
    pub fn admit(&mut self, card: &Card) -> Verdict {
        let date = parse_date(&card.date);
        if self.window.rejects(date) {
            ::log::debug!(
                "skipping card: ({} < {}): {} {}",
                display_date(date),
                self.window.target_date_text(),
                card.url,
                card.title
            );
            return Verdict::TooOld;
        }

        if !self.seen.insert(card.url.clone()) {
            return Verdict::Duplicate;
        }

        ::log::debug!(
            "adding card ({} >= {}): {} {}",
            display_date(date),
            self.window.target_date_text(),
            card.url,
            card.title
        );
        Verdict::Accepted
    }

    /// Keeps cards in order that are inside the window and not yet seen
    pub fn apply(&mut self, cards: Vec<Card>) -> Vec<Card> {
        cards
            .into_iter()
            .filter(|card| self.admit(card) == Verdict::Accepted)
            .collect()
    }
}
