use crate::config::HarvestConfig;
use crate::crawlers::article::{ArticleOutcome, process_article};
use crate::crawlers::browser::{
    BrowserPage, browser_capabilities, connect_to_webdriver, is_session_lost,
};
use crate::crawlers::listing::{ListingOptions, process_listing};
use crate::error::{HarvestError, Result};
use crate::results::{ArticleRecord, ArticleTask, RequestLabel};
use crate::utils::RateLimiter;
use fantoccini::wd::Capabilities;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify, mpsc};
use url::Url;

/// What a queued request asks a worker to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Listing { url: String },
    Article(ArticleTask),
}

/// A unit of work in the request queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub kind: RequestKind,
    pub retry_count: u32,
}

impl CrawlRequest {
    pub fn listing(url: &str) -> Self {
        Self {
            kind: RequestKind::Listing {
                url: url.to_string(),
            },
            retry_count: 0,
        }
    }

    pub fn article(task: ArticleTask) -> Self {
        Self {
            kind: RequestKind::Article(task),
            retry_count: 0,
        }
    }

    /// URL the request navigates to, also its uniqueness key
    pub fn url(&self) -> &str {
        match &self.kind {
            RequestKind::Listing { url } => url,
            RequestKind::Article(task) => &task.url,
        }
    }

    pub fn label(&self) -> RequestLabel {
        match &self.kind {
            RequestKind::Listing { .. } => RequestLabel::Listing,
            RequestKind::Article(_) => RequestLabel::Article,
        }
    }
}

/// FIFO request queue that accepts each URL once per run.
///
/// The queue tracks requests that are queued or being handled; once that
/// count reaches zero, [`RequestQueue::next`] returns `None` to every worker.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: Mutex<VecDeque<CrawlRequest>>,
    seen: Mutex<HashSet<String>>,
    outstanding: AtomicUsize,
    notify: Notify,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request unless its URL was already queued in this run
    pub async fn enqueue(&self, request: CrawlRequest) -> bool {
        if !self.seen.lock().await.insert(request.url().to_string()) {
            ::log::debug!("Skipping already queued url: {}", request.url());
            return false;
        }
        self.push(request).await;
        true
    }

    /// Queues a retry of a request that is still outstanding
    pub async fn requeue(&self, request: CrawlRequest) {
        self.push(request).await;
    }

    async fn push(&self, request: CrawlRequest) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().await.push_back(request);
        self.notify.notify_waiters();
    }

    /// Next request to handle, or `None` once all work is done
    pub async fn next(&self) -> Option<CrawlRequest> {
        loop {
            let notified = self.notify.notified();

            if let Some(request) = self.pending.lock().await.pop_front() {
                return Some(request);
            }
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return None;
            }

            notified.await;
        }
    }

    /// Marks one handed-out request as finished
    pub fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// Counters reported when a run ends
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub handled: AtomicUsize,
    pub saved: AtomicUsize,
    pub skipped: AtomicUsize,
    pub retried: AtomicUsize,
    pub failed: AtomicUsize,
}

impl CrawlStats {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_summary(&self) {
        ::log::info!(
            "Crawl finished: {} requests handled, {} articles saved, {} skipped, {} retries, {} failed",
            self.handled.load(Ordering::Relaxed),
            self.saved.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
            self.retried.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        );
    }
}

/// State shared by all workers of one run
struct WorkerContext {
    queue: Arc<RequestQueue>,
    limiter: RateLimiter,
    listing_options: ListingOptions,
    capabilities: Capabilities,
    webdriver_url: String,
    max_request_retries: u32,
    handler_timeout: Duration,
    stats: CrawlStats,
}

/// Starts a harvest and returns a receiver that yields records as they are saved.
///
/// Each configured URL is queued as a listing request. The channel closes
/// once every request has been handled or has run out of retries.
pub async fn start(config: &HarvestConfig) -> Result<mpsc::Receiver<ArticleRecord>> {
    config.validate()?;
    ::log::info!(
        "Starting harvest of {} listing pages with {} workers",
        config.urls.len(),
        config.max_concurrency
    );

    let queue = Arc::new(RequestQueue::new());
    for url in &config.urls {
        queue.enqueue(CrawlRequest::listing(url)).await;
    }

    let (result_tx, result_rx) = mpsc::channel::<ArticleRecord>(10000);

    let ctx = Arc::new(WorkerContext {
        queue,
        limiter: RateLimiter::per_minute(config.max_requests_per_minute),
        listing_options: ListingOptions::from(config),
        capabilities: browser_capabilities(config),
        webdriver_url: config.webdriver_url.clone(),
        max_request_retries: config.max_request_retries,
        handler_timeout: config.request_handler_timeout(),
        stats: CrawlStats::default(),
    });

    let workers: Vec<_> = (0..config.max_concurrency)
        .map(|worker_id| tokio::spawn(run_worker(worker_id, Arc::clone(&ctx), result_tx.clone())))
        .collect();

    // The channel closes when the last worker drops its sender
    drop(result_tx);

    tokio::spawn(async move {
        for (worker_id, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.await {
                ::log::error!("Worker {} terminated abnormally: {}", worker_id, e);
            }
        }
        ctx.stats.log_summary();
    });

    Ok(result_rx)
}

/// Handles requests until the queue is drained, then closes the worker's session
async fn run_worker(
    worker_id: usize,
    ctx: Arc<WorkerContext>,
    result_tx: mpsc::Sender<ArticleRecord>,
) {
    ::log::debug!("Worker {} starting processing loop", worker_id);

    // Connected lazily so idle workers never open a session
    let mut page: Option<BrowserPage> = None;

    while let Some(request) = ctx.queue.next().await {
        ctx.limiter.acquire().await;
        ::log::trace!(
            "Worker {} processing {:?}: {}",
            worker_id,
            request.label(),
            request.url()
        );

        let result = attempt(worker_id, &mut page, &request, &ctx, &result_tx).await;
        match result {
            Ok(()) => CrawlStats::bump(&ctx.stats.handled),
            Err(e) => retry_or_fail(&ctx, request, e).await,
        }
        ctx.queue.complete();
    }

    if let Some(page) = page {
        if let Err(e) = page.close().await {
            ::log::warn!("Worker {} failed to close browser session: {}", worker_id, e);
        }
    }
    ::log::debug!("Worker {} completed - no more requests to process", worker_id);
}

/// Runs one request on the worker's session, opening or dropping it as needed
async fn attempt(
    worker_id: usize,
    page: &mut Option<BrowserPage>,
    request: &CrawlRequest,
    ctx: &WorkerContext,
    result_tx: &mpsc::Sender<ArticleRecord>,
) -> Result<()> {
    let current = match page.take() {
        Some(current) => current,
        None => connect_to_webdriver(worker_id, &ctx.webdriver_url, &ctx.capabilities).await?,
    };

    let result = with_handler_timeout(
        ctx.handler_timeout,
        handle_request(&current, request, ctx, result_tx),
    )
    .await;

    match &result {
        Err(e) if is_session_lost(e) => {
            ::log::warn!("Worker {} lost its browser session", worker_id);
        }
        _ => *page = Some(current),
    }

    result
}

/// Bounds a request handler by the per-request timeout
pub async fn with_handler_timeout<F, T>(timeout: Duration, handler: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, handler)
        .await
        .unwrap_or_else(|_| Err(HarvestError::Timeout(timeout.as_secs())))
}

async fn handle_request(
    page: &BrowserPage,
    request: &CrawlRequest,
    ctx: &WorkerContext,
    result_tx: &mpsc::Sender<ArticleRecord>,
) -> Result<()> {
    match &request.kind {
        RequestKind::Listing { url } => {
            page.goto(url).await?;
            let tasks = process_listing(page, &ctx.listing_options).await?;
            enqueue_articles(&ctx.queue, url, tasks).await?;
        }
        RequestKind::Article(task) => {
            page.goto(&task.url).await?;
            match process_article(page, task).await? {
                ArticleOutcome::Accepted(record) => {
                    if result_tx.send(record).await.is_err() {
                        ::log::error!("Result receiver dropped, discarding {}", task.url);
                    } else {
                        CrawlStats::bump(&ctx.stats.saved);
                    }
                }
                ArticleOutcome::Skipped => CrawlStats::bump(&ctx.stats.skipped),
            }
        }
    }
    Ok(())
}

/// Resolves task URLs against the listing page and queues them in order.
///
/// Returns the number of newly queued article requests.
pub async fn enqueue_articles(
    queue: &RequestQueue,
    listing_url: &str,
    tasks: Vec<ArticleTask>,
) -> Result<usize> {
    let base = Url::parse(listing_url)?;

    let mut queued = 0;
    for mut task in tasks {
        if task.url.is_empty() {
            ::log::warn!("card without article link on {}: {}", listing_url, task.payload.title);
            continue;
        }
        match base.join(&task.url) {
            Ok(resolved) => task.url = resolved.to_string(),
            Err(e) => {
                ::log::warn!("unusable article link {:?}: {}", task.url, e);
                continue;
            }
        }
        if queue.enqueue(CrawlRequest::article(task)).await {
            queued += 1;
        }
    }

    Ok(queued)
}

async fn retry_or_fail(ctx: &WorkerContext, mut request: CrawlRequest, error: HarvestError) {
    if request.retry_count < ctx.max_request_retries {
        request.retry_count += 1;
        ::log::warn!(
            "Retrying {} ({}/{}) after error: {}",
            request.url(),
            request.retry_count,
            ctx.max_request_retries,
            error
        );
        CrawlStats::bump(&ctx.stats.retried);
        ctx.queue.requeue(request).await;
    } else {
        ::log::error!(
            "Request {} failed after {} retries: {}",
            request.url(),
            request.retry_count,
            error
        );
        CrawlStats::bump(&ctx.stats.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Card;
    use std::sync::atomic::Ordering;

    fn context(max_request_retries: u32) -> WorkerContext {
        let config = HarvestConfig::default();
        WorkerContext {
            queue: Arc::new(RequestQueue::new()),
            limiter: RateLimiter::with_interval(Duration::from_millis(1)),
            listing_options: ListingOptions::from(&config),
            capabilities: browser_capabilities(&config),
            webdriver_url: config.webdriver_url.clone(),
            max_request_retries,
            handler_timeout: Duration::from_millis(20),
            stats: CrawlStats::default(),
        }
    }

    fn task(url: &str) -> ArticleTask {
        ArticleTask::from_card(
            Card {
                url: url.to_string(),
                ..Card::default()
            },
            "devops",
            "2024-01-10",
        )
    }

    #[tokio::test]
    async fn test_queue_is_fifo_and_unique() {
        let queue = RequestQueue::new();
        assert!(queue.enqueue(CrawlRequest::listing("https://x/category/a/")).await);
        assert!(queue.enqueue(CrawlRequest::article(task("https://x/post"))).await);
        assert!(!queue.enqueue(CrawlRequest::listing("https://x/category/a/")).await);
        assert_eq!(queue.outstanding(), 2);

        let first = queue.next().await.unwrap();
        assert_eq!(first.label(), RequestLabel::Listing);
        let second = queue.next().await.unwrap();
        assert_eq!(second.url(), "https://x/post");
    }

    #[tokio::test]
    async fn test_queue_drains_when_work_completes() {
        let queue = RequestQueue::new();
        queue.enqueue(CrawlRequest::listing("https://x/")).await;

        let request = queue.next().await.unwrap();
        queue.complete();
        assert_eq!(request.retry_count, 0);
        assert!(queue.next().await.is_none());
    }

    #[tokio::test]
    async fn test_requeue_bypasses_uniqueness() {
        let queue = RequestQueue::new();
        queue.enqueue(CrawlRequest::listing("https://x/")).await;

        let mut request = queue.next().await.unwrap();
        request.retry_count += 1;
        queue.requeue(request).await;
        queue.complete();

        let retried = queue.next().await.unwrap();
        assert_eq!(retried.retry_count, 1);
        queue.complete();
        assert!(queue.next().await.is_none());
    }

    #[tokio::test]
    async fn test_waiting_worker_wakes_for_new_work() {
        let queue = Arc::new(RequestQueue::new());
        queue.enqueue(CrawlRequest::listing("https://x/")).await;
        let listing = queue.next().await.unwrap();

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.next().await })
        };

        tokio::task::yield_now().await;
        queue.enqueue(CrawlRequest::article(task("https://x/post"))).await;
        queue.complete();

        let woken = waiter.await.unwrap().unwrap();
        assert_eq!(woken.url(), "https://x/post");
        assert_eq!(listing.url(), "https://x/");
    }

    #[tokio::test]
    async fn test_failed_request_is_retried_until_limit() {
        let ctx = context(2);
        ctx.queue.enqueue(CrawlRequest::listing("https://x/category/web/")).await;

        for expected_retry in 0..=2 {
            let request = ctx.queue.next().await.unwrap();
            assert_eq!(request.retry_count, expected_retry);
            retry_or_fail(&ctx, request, HarvestError::Timeout(1)).await;
            ctx.queue.complete();
        }

        assert!(ctx.queue.next().await.is_none());
        assert_eq!(ctx.stats.retried.load(Ordering::Relaxed), 2);
        assert_eq!(ctx.stats.failed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_fails_immediately() {
        let ctx = context(0);
        ctx.queue.enqueue(CrawlRequest::listing("https://x/")).await;

        let request = ctx.queue.next().await.unwrap();
        retry_or_fail(&ctx, request, HarvestError::WebDriver("unreachable".into())).await;
        ctx.queue.complete();

        assert!(ctx.queue.next().await.is_none());
        assert_eq!(ctx.stats.retried.load(Ordering::Relaxed), 0);
        assert_eq!(ctx.stats.failed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_stalled_handler_times_out() {
        let ctx = context(1);
        let result =
            with_handler_timeout(ctx.handler_timeout, std::future::pending::<Result<()>>()).await;

        assert!(matches!(result, Err(HarvestError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_handler_result_passes_through_timeout() {
        let ok = with_handler_timeout(Duration::from_secs(5), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_handler_timeout(Duration::from_secs(5), async {
            Err::<(), _>(HarvestError::Config("bad".into()))
        })
        .await;
        assert!(matches!(err, Err(HarvestError::Config(_))));
    }

    #[tokio::test]
    async fn test_enqueue_articles_resolves_relative_links() {
        let queue = RequestQueue::new();
        let queued = enqueue_articles(
            &queue,
            "https://azure.example.com/en-us/blog/category/devops/",
            vec![
                task("/en-us/blog/post-one/"),
                task("https://azure.example.com/en-us/blog/post-one/"),
                task(""),
                task("https://other.example.com/post-two/"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(queued, 2);
        let first = queue.next().await.unwrap();
        assert_eq!(first.url(), "https://azure.example.com/en-us/blog/post-one/");
        let second = queue.next().await.unwrap();
        assert_eq!(second.url(), "https://other.example.com/post-two/");
    }
}
