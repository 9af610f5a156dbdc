//! Listing Source
//!
//! Fetches a bounded sequence of job listings from a paginated board
//! (Hacker News style: `tr.athing` rows with a `a.morelink` pager).

use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::models::listing::{Listing, COMPANY_PLACEHOLDER, DESCRIPTION_PLACEHOLDER};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_PAGE_DELAY: Duration = Duration::from_secs(2);
const MAX_PAGE_DELAY: Duration = Duration::from_secs(4);

/// Error type for listing source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request to listings page failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listings endpoint is not a valid URL: {0}")]
    BadEndpoint(#[from] url::ParseError),
}

/// Produces a bounded sequence of candidate listings from a target
/// endpoint. The orchestrator depends only on this contract, never on
/// the page mechanics behind it.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self, endpoint: &str, max_items: usize) -> Result<Vec<Listing>, SourceError>;
}

/// Listing source backed by plain HTTP fetches of the board's HTML.
pub struct HttpListingSource {
    http: reqwest::Client,
    min_page_delay: Duration,
    max_page_delay: Duration,
}

impl HttpListingSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::build(MIN_PAGE_DELAY, MAX_PAGE_DELAY, REQUEST_TIMEOUT)
    }

    /// Override the jittered inter-page delay, e.g. zero in tests.
    pub fn with_page_delay(min: Duration, max: Duration) -> Result<Self, SourceError> {
        Self::build(min, max, REQUEST_TIMEOUT)
    }

    fn build(min: Duration, max: Duration, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            min_page_delay: min,
            max_page_delay: max,
        })
    }

    async fn get_page(&self, page_url: &Url) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .get(page_url.clone())
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }

    /// Jittered pause between page fetches to respect the target site.
    async fn pause_between_pages(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(
                self.min_page_delay.as_millis() as u64..=self.max_page_delay.as_millis() as u64,
            )
        };
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, endpoint: &str, max_items: usize) -> Result<Vec<Listing>, SourceError> {
        let endpoint = Url::parse(endpoint)?;

        let mut listings: Vec<Listing> = Vec::new();
        let mut next_url = Some(endpoint);
        let mut first_page = true;

        while let Some(page_url) = next_url.take() {
            if listings.len() >= max_items {
                break;
            }
            if !first_page {
                self.pause_between_pages().await;
            }

            let body = match self.get_page(&page_url).await {
                Ok(body) => body,
                Err(e) if first_page && e.is_timeout() => {
                    tracing::error!(url = %page_url, error = %e, "listings page timed out, treating as empty");
                    return Ok(Vec::new());
                }
                Err(e) if first_page => return Err(SourceError::Http(e)),
                Err(e) => {
                    tracing::warn!(url = %page_url, error = %e, "pagination fetch failed, keeping partial results");
                    break;
                }
            };

            let batch = extract_listings(&body, &page_url, max_items - listings.len());
            listings.extend(batch);

            tracing::info!(
                url = %page_url,
                total = listings.len(),
                "extracted listings from page"
            );

            next_url = if listings.len() < max_items {
                find_more_link(&body, &page_url)
            } else {
                None
            };
            first_page = false;
        }

        Ok(listings)
    }
}

/// Extract up to `budget` listings from one page of board HTML.
///
/// Rows that fail structural extraction (missing title or link) are
/// skipped with a warning, not fatal to the batch.
fn extract_listings(html: &str, page_url: &Url, budget: usize) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse("tr.athing").expect("valid selector");
    let title_sel = Selector::parse("span.titleline a").expect("valid selector");

    let mut listings = Vec::new();

    for row in document.select(&row_sel) {
        if listings.len() >= budget {
            break;
        }

        let anchor = match row.select(&title_sel).next() {
            Some(a) => a,
            None => {
                tracing::warn!("skipping row without a title link");
                continue;
            }
        };

        let title = anchor.text().collect::<String>().trim().to_string();
        let href = anchor.value().attr("href").unwrap_or_default();

        if title.is_empty() || href.is_empty() {
            tracing::warn!("skipping row with missing title or link");
            continue;
        }

        // Normalize relative hrefs against the page's own URL.
        let url = match page_url.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(href, error = %e, "skipping row with unresolvable link");
                continue;
            }
        };

        listings.push(Listing {
            url,
            title,
            company: COMPANY_PLACEHOLDER.to_string(),
            description: DESCRIPTION_PLACEHOLDER.to_string(),
        });
    }

    listings
}

/// Locate the "load more" affordance on the current page, if any.
fn find_more_link(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let more_sel = Selector::parse("a.morelink").expect("valid selector");

    document
        .select(&more_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
}
