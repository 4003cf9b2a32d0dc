//! HTML extraction for the blog's listing and article pages.
//!
//! Both parsers work on a page source snapshot, so they can run against
//! whatever the browser has rendered at that moment.

pub mod article;
pub mod listing;


use scraper::{ElementRef, Selector};

/// One article card on a listing page
pub const CARD: &str = "article[id]";
/// Pagination control on a listing page
pub const LOAD_MORE_BUTTON: &str = "button[data-load-more-button]";
pub const CATEGORY_TAG: &str = r#"a[rel="category tag"]"#;
pub const PUBLISH_DATE: &str = "time[pubdate]";
pub const BOOKMARK: &str = r#"a[rel="bookmark"]"#;
pub const AUTHOR: &str = r#"a[rel="author"]"#;
pub const DESCRIPTION: &str = r#"div[itemprop="description"]"#;
/// Header landmark on an article page
pub const ARTICLE_HEADER: &str = r#"header[id="sticky-bar-anchor"]"#;
/// Body landmark on an article page
pub const ARTICLE_BODY: &str = r#"div[id="blog-post-content"]"#;

/// Compiles one of the selectors above
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

/// Trimmed text content of an element
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match under `scope`, empty when absent
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

/// Trimmed text of every match under `scope`, in document order
pub(crate) fn all_text(scope: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    scope.select(selector).map(text_of).collect()
}

/// Parent element of `element`, if it has one
pub(crate) fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Text of the first `span` beside the author anchor, empty when absent
pub(crate) fn job_title_beside(author: Option<ElementRef<'_>>) -> String {
    let span = selector("span");
    author
        .and_then(parent_element)
        .map(|holder| first_text(holder, &span))
        .unwrap_or_default()
}
