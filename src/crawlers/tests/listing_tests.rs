use super::mock_page::MockPage;
use crate::crawlers::listing::{ListingOptions, paginate, process_listing_at};
use crate::results::{Card, RequestLabel};
use crate::window::parse_date;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::time::Duration;

const LISTING_URL: &str = "https://azure.example.com/en-us/blog/category/devops/";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn options(pagination_limit: u32, look_back_window: u32) -> ListingOptions {
    ListingOptions {
        look_back_window,
        pagination_limit,
        load_more_timeout: Duration::ZERO,
        settle_delay: Duration::ZERO,
    }
}

fn card(url: &str, title: &str, date: &str) -> Card {
    Card {
        tags: vec!["DevOps".to_string()],
        date: date.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        author: "Ada".to_string(),
        job_title: "PM".to_string(),
        description: format!("summary of {}", title),
    }
}

#[test]
fn test_default_pagination_timings() {
    let defaults = ListingOptions::default();

    assert_eq!(defaults.load_more_timeout, Duration::from_secs(1));
    assert_eq!(defaults.settle_delay, Duration::from_secs(5));
    assert_eq!(defaults.pagination_limit, 1);
    assert_eq!(defaults.look_back_window, 0);
}

#[tokio::test]
async fn test_pagination_halts_at_limit() {
    let mut page = MockPage::listing(LISTING_URL, vec![]);
    page.load_more_available = usize::MAX;

    let activations = paginate(&page, &options(3, 0)).await;

    assert_eq!(activations, 3);
    assert_eq!(page.clicks(), 3);
}

#[tokio::test]
async fn test_pagination_halts_when_control_disappears() {
    let mut page = MockPage::listing(
        LISTING_URL,
        vec![card("/a", "a", "January 10, 2024"), card("/b", "b", "January 10, 2024")],
    );
    page.load_more_available = 1;

    let tasks = process_listing_at(&page, &options(5, 0), now()).await.unwrap();

    assert_eq!(page.clicks(), 1);
    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn test_zero_limit_uses_initial_cards() {
    let mut page = MockPage::listing(LISTING_URL, vec![card("/a", "a", "January 10, 2024")]);
    page.load_more_available = usize::MAX;

    let tasks = process_listing_at(&page, &options(0, 0), now()).await.unwrap();

    assert_eq!(page.clicks(), 0);
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn test_click_failure_degrades_to_loaded_cards() {
    let mut page = MockPage::listing(LISTING_URL, vec![card("/a", "a", "January 10, 2024")]);
    page.load_more_available = usize::MAX;
    page.click_fails = true;

    let tasks = process_listing_at(&page, &options(2, 0), now()).await.unwrap();

    assert_eq!(page.clicks(), 0);
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn test_lookback_keeps_recent_cards_only() {
    let page = MockPage::listing(
        LISTING_URL,
        vec![
            card("/today", "today", "January 10, 2024"),
            card("/yesterday", "yesterday", "January 9, 2024"),
            card("/old", "five days ago", "January 5, 2024"),
        ],
    );

    let tasks = process_listing_at(&page, &options(1, 2), now()).await.unwrap();

    let urls: Vec<_> = tasks.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, vec!["/today", "/yesterday"]);
}

#[tokio::test]
async fn test_duplicate_urls_keep_first_card() {
    let page = MockPage::listing(
        LISTING_URL,
        vec![
            card("/same", "first title", "January 10, 2024"),
            card("/same", "second title", "January 10, 2024"),
        ],
    );

    let tasks = process_listing_at(&page, &options(0, 0), now()).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].payload.title, "first title");
}

#[tokio::test]
async fn test_tasks_carry_card_blog_and_window() {
    let page = MockPage::listing(LISTING_URL, vec![card("/a", "a", "January 9, 2024")]);

    let tasks = process_listing_at(&page, &options(0, 3), now()).await.unwrap();
    let task = &tasks[0];

    assert_eq!(task.label, RequestLabel::Article);
    assert_eq!(task.url, "/a");
    assert_eq!(task.payload.blog, "devops");
    assert_eq!(task.payload.target_date_text, "2024-01-07");
    assert_eq!(task.payload.description, "summary of a");
    assert_eq!(task.payload.job_title, "PM");
    assert_eq!(task.payload.tags, vec!["DevOps"]);
}

#[tokio::test]
async fn test_emitted_tasks_are_unique_and_inside_window() {
    let dates = ["January 10, 2024", "January 3, 2024", "January 8, 2024", "December 31, 2023"];
    let cards: Vec<Card> = (0..12)
        .map(|i| card(&format!("/post-{}", i % 5), &format!("t{}", i), dates[i % dates.len()]))
        .collect();
    let page = MockPage::listing(LISTING_URL, cards);

    let tasks = process_listing_at(&page, &options(0, 4), now()).await.unwrap();
    let target = parse_date(&tasks[0].payload.target_date_text).unwrap();

    let mut seen = HashSet::new();
    for task in &tasks {
        assert!(seen.insert(task.url.clone()), "duplicate task {}", task.url);
        assert!(parse_date(&task.payload.date).unwrap() >= target);
    }
}

#[tokio::test]
async fn test_listing_without_category_has_empty_blog() {
    let page = MockPage::listing(
        "https://azure.example.com/en-us/blog/",
        vec![card("/a", "a", "January 10, 2024")],
    );

    let tasks = process_listing_at(&page, &options(0, 0), now()).await.unwrap();

    assert_eq!(tasks[0].payload.blog, "");
}
