use super::items::ListingPass;
use super::pagination::{self, Advance};
use crate::browser::Browser;
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::fetch::ImageFetcher;
use crate::records::RecordStore;
use crate::results::CrawlSummary;
use crate::utils::pause;

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    ExhaustingMore,
    Scraping,
    Advancing,
    Done,
}

/// Drives a gallery crawl: press "more" until exhausted, scrape the page,
/// advance, and repeat until there is no next page.
///
/// Owns the browser session and the record store for the whole crawl.
pub struct Crawler<B: Browser, F: ImageFetcher> {
    browser: B,
    fetcher: F,
    store: RecordStore,
    config: HarvestConfig,
}

impl<B: Browser, F: ImageFetcher> Crawler<B, F> {
    pub fn new(browser: B, fetcher: F, config: HarvestConfig) -> Self {
        let store = RecordStore::new(&config.output_file);
        Self {
            browser,
            fetcher,
            store,
            config,
        }
    }

    /// Runs the crawl to completion and ends the browser session on every path
    pub async fn run(mut self) -> Result<CrawlSummary> {
        let result = self.crawl().await;

        if let Err(e) = self.browser.quit().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        result
    }

    async fn crawl(&mut self) -> Result<CrawlSummary> {
        self.prepare().await?;

        let mut summary = CrawlSummary::default();
        let mut state = CrawlState::ExhaustingMore;
        let mut page = 1;
        let mut more_clicks = 0;

        while state != CrawlState::Done {
            ::log::debug!("Page {}: {:?}", page, state);
            state = match state {
                CrawlState::ExhaustingMore => {
                    more_clicks = pagination::exhaust_more(&mut self.browser, &self.config).await;
                    CrawlState::Scraping
                }
                CrawlState::Scraping => {
                    let mut page_summary = ListingPass::new(
                        &mut self.browser,
                        &self.fetcher,
                        &mut self.store,
                        &self.config,
                    )
                    .run(page)
                    .await;
                    page_summary.more_clicks = more_clicks;
                    ::log::info!(
                        "Page {} done: {} recorded, {} skipped",
                        page,
                        page_summary.recorded,
                        page_summary.skipped
                    );
                    summary.pages.push(page_summary);
                    CrawlState::Advancing
                }
                CrawlState::Advancing => {
                    if self.config.max_pages.is_some_and(|max| page >= max) {
                        ::log::info!("Reached the limit of {} pages", page);
                        CrawlState::Done
                    } else {
                        match pagination::advance_page(&mut self.browser, &self.config).await {
                            Advance::Advanced => {
                                page += 1;
                                CrawlState::ExhaustingMore
                            }
                            Advance::NoMorePages => CrawlState::Done,
                        }
                    }
                }
                CrawlState::Done => CrawlState::Done,
            };
        }

        self.finish();
        Ok(summary)
    }

    /// Creates the image directory, writes the header row and opens the start page
    async fn prepare(&mut self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.images_dir).await?;

        if let Err(e) = self.store.save() {
            ::log::error!(
                "Error saving {}: {}",
                self.store.path().display(),
                e
            );
        }

        ::log::info!("Opening {}", self.config.start_url);
        self.browser.goto(&self.config.start_url).await?;
        pause(self.config.initial_delay()).await;
        Ok(())
    }

    fn finish(&self) {
        match self.store.save() {
            Ok(()) => ::log::info!(
                "Done. Images saved in '{}', data saved in '{}' ({} rows)",
                self.config.images_dir.display(),
                self.store.path().display(),
                self.store.len()
            ),
            Err(e) => ::log::error!(
                "Error saving {}: {}",
                self.store.path().display(),
                e
            ),
        }
    }
}
