//! Scrape module: fetching, extraction and the concurrent engine
//!
//! This module contains the core scraping pipeline, including:
//! - HTTP fetching with a fixed-delay retry policy
//! - Extraction of ranked names, repository counts and listing tags
//! - Alias normalization of language names
//! - Bounded-parallel fan-out over targets with partial-failure tolerance

mod alias;
mod engine;
mod extract;
mod fetcher;
mod target;

pub use alias::AliasTable;
pub use engine::{count_merge, insert_merge, EngineOutcome, ScrapeEngine};
pub use extract::{
    extract_count, extract_listing, extract_ranking, Cutoff, RANKING_NAME_OFFSET, RANKING_ROWS,
    RANKING_STRIDE, STALENESS_WINDOW_DAYS,
};
pub use fetcher::{build_http_client, HttpFetcher, PageSource, RetryPolicy};
pub use target::{listing_targets, Target};

use crate::config::{Config, SourcesConfig};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The three scrape phases over one page source
///
/// # Example
///
/// ```no_run
/// use lang_pulse::config::Config;
/// use lang_pulse::scrape::Scraper;
///
/// # async fn run() -> lang_pulse::Result<()> {
/// let scraper = Scraper::new(&Config::default())?;
/// let languages = scraper.scrape_ranking().await?;
/// let _counts = scraper.scrape_counts(&languages).await.into_result("languages")?;
/// # Ok(())
/// # }
/// ```
pub struct Scraper<S = HttpFetcher> {
    engine: ScrapeEngine<S>,
    aliases: AliasTable,
    sources: SourcesConfig,
    interest: String,
    max_pages: u32,
}

impl Scraper<HttpFetcher> {
    /// Creates a scraper backed by the HTTP fetcher
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.scraper)?;
        Ok(Self::with_source(config, fetcher))
    }
}

impl<S: PageSource> Scraper<S> {
    /// Creates a scraper over any page source
    pub fn with_source(config: &Config, source: S) -> Self {
        Self {
            engine: ScrapeEngine::new(Arc::new(source), config.scraper.max_parallel),
            aliases: AliasTable::new(config.scraper.aliases.clone()),
            sources: config.sources.clone(),
            interest: config.scraper.interest.clone(),
            max_pages: config.scraper.max_pages,
        }
    }

    /// Fetches the ranking page and returns the normalized language keys
    /// in rank order
    pub async fn scrape_ranking(&self) -> Result<Vec<String>> {
        let url = &self.sources.ranking_url;
        tracing::debug!("Scraping ranking from {}", url);

        let body = self.engine.source().fetch(url).await?;
        let names = extract_ranking(&body).inspect_err(|err| {
            tracing::error!("Could not extract ranking from {}: {}", url, err);
        })?;

        Ok(self.aliases.normalize_all(&names))
    }

    /// Fetches the repository count of every language concurrently
    ///
    /// The outcome maps language key to count; failures are reported through
    /// `last_error` and the attempted/succeeded counters.
    pub async fn scrape_counts(&self, languages: &[String]) -> EngineOutcome<u32> {
        let targets = languages
            .iter()
            .map(|lang| Target::entity(&self.sources.entity_url, lang))
            .collect();

        self.engine.run(targets, extract_count, insert_merge).await
    }

    /// Counts the tags of recently updated items over the configured
    /// listing pages
    pub async fn scrape_interest(&self) -> EngineOutcome<u32> {
        self.scrape_interest_at(Utc::now()).await
    }

    /// Like `scrape_interest`, with the staleness window measured from `now`
    ///
    /// The interest topic itself is never counted.
    pub async fn scrape_interest_at(&self, now: DateTime<Utc>) -> EngineOutcome<u32> {
        let cutoff = Cutoff::from_now(now);
        let interest = self.interest.clone();
        let targets = listing_targets(&self.sources.topic_url, &self.interest, self.max_pages);

        tracing::debug!(
            "Scraping {} listing pages for topic {}, cutoff {}",
            targets.len(),
            self.interest,
            cutoff.threshold()
        );

        let extract = move |body: &[u8]| -> Result<Vec<String>> {
            Ok(extract_listing(body, &cutoff)
                .into_iter()
                .filter(|tag| *tag != interest)
                .collect())
        };

        self.engine.run(targets, extract, count_merge).await
    }
}
