use crate::window::with_local_offset;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One article summary as rendered on a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Category labels in page order
    pub tags: Vec<String>,

    /// Raw publish date text
    pub date: String,

    pub title: String,

    /// Link to the full article, also the dedup key
    pub url: String,

    pub author: String,

    pub job_title: String,

    pub description: String,
}

/// Route a queued request is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestLabel {
    Listing,
    Article,
}

/// Listing metadata carried from stage one to stage two
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
    pub date: String,
    pub job_title: String,
    pub description: String,

    /// Category slug parsed from the listing URL
    pub blog: String,

    /// Lower bound of the window, as `YYYY-MM-DD`
    pub target_date_text: String,
}

/// An article crawl request produced by a listing pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTask {
    pub url: String,
    pub label: RequestLabel,
    pub payload: ArticlePayload,
}

impl ArticleTask {
    /// Builds the task for a card that survived filtering
    pub fn from_card(card: Card, blog: &str, target_date_text: &str) -> Self {
        Self {
            url: card.url.clone(),
            label: RequestLabel::Article,
            payload: ArticlePayload {
                title: card.title,
                author: card.author,
                tags: card.tags,
                date: card.date,
                job_title: card.job_title,
                description: card.description,
                blog: blog.to_string(),
                target_date_text: target_date_text.to_string(),
            },
        }
    }
}

/// Fields read from an article page header and body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub tags: Vec<String>,
    pub title: String,
    pub author: String,
    pub author_job_title: String,
    pub text: String,
}

/// Final record handed to the output sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,

    /// The article's own published date with its local UTC offset, `None`
    /// if it could not be parsed
    pub date: Option<DateTime<FixedOffset>>,

    pub author: String,
    pub author_job_title: String,
    pub blog: String,

    /// Copied from the listing card, never from the article body
    pub description: String,

    pub text: String,
}

impl ArticleRecord {
    /// Combines page fields with what the listing pass propagated.
    ///
    /// `date` is a local wall-clock value as produced by the date parser.
    pub fn new(
        url: String,
        date: Option<NaiveDateTime>,
        fields: ArticleFields,
        payload: &ArticlePayload,
    ) -> Self {
        Self {
            title: fields.title,
            url,
            tags: fields.tags,
            date: date.and_then(with_local_offset),
            author: fields.author,
            author_job_title: fields.author_job_title,
            blog: payload.blog.clone(),
            description: payload.description.clone(),
            text: fields.text,
        }
    }
}
