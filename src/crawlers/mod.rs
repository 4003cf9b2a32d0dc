pub mod article;
pub mod browser;
pub mod listing;
pub mod page;
pub mod web;

#[cfg(test)]
mod tests;

pub use article::{ArticleOutcome, process_article};
pub use listing::{ListingOptions, process_listing};
pub use page::PageExtractor;
