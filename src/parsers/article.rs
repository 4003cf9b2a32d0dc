use super::{
    ARTICLE_BODY, ARTICLE_HEADER, AUTHOR, CATEGORY_TAG, PUBLISH_DATE, all_text, first_text,
    job_title_beside, selector, text_of,
};
use crate::results::ArticleFields;
use scraper::Html;

/// Raw text of the article's publish date indicator, empty when absent
pub fn parse_date_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.select(&selector(PUBLISH_DATE))
        .next()
        .map(text_of)
        .unwrap_or_default()
}

/// Extracts header fields and body text from an article page
pub fn parse_fields(html: &str) -> ArticleFields {
    let doc = Html::parse_document(html);

    let mut fields = ArticleFields::default();

    if let Some(header) = doc.select(&selector(ARTICLE_HEADER)).next() {
        let author = header.select(&selector(AUTHOR)).next();
        fields.tags = all_text(header, &selector(CATEGORY_TAG));
        fields.title = first_text(header, &selector("h1"));
        fields.author = author.map(text_of).unwrap_or_default();
        fields.author_job_title = job_title_beside(author);
    } else {
        ::log::debug!("article page has no header landmark");
    }

    fields.text = doc
        .select(&selector(ARTICLE_BODY))
        .next()
        .map(text_of)
        .unwrap_or_default();

    fields
}
