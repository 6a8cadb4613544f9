use crate::browser::{self, Browser};
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::fetch::{self, ImageFetcher};
use crate::parsers;
use crate::records::RecordStore;
use crate::results::{
    DetailRecord, DownloadOutcome, GalleryItem, ItemOutcome, OutputRow, PageSummary,
};
use crate::utils::{absolute_url, image_file_name};

/// One entry in the listing grid
pub const ITEM_SELECTOR: &str = ".logo_item";
/// Title link inside an entry; carries the title and the detail URL
pub const TITLE_SELECTOR: &str = ".logo_title";
/// Image inside an entry
pub const IMAGE_SELECTOR: &str = ".theimg";
/// Content container on a detail page
pub const DETAIL_SELECTOR: &str = ".hook";

/// Scrapes every visible entry of the current listing page.
///
/// Borrows the session, fetcher and record store for a single pass.
pub struct ListingPass<'a, B: Browser, F: ImageFetcher> {
    browser: &'a mut B,
    fetcher: &'a F,
    store: &'a mut RecordStore,
    config: &'a HarvestConfig,
}

impl<'a, B: Browser, F: ImageFetcher> ListingPass<'a, B, F> {
    pub fn new(
        browser: &'a mut B,
        fetcher: &'a F,
        store: &'a mut RecordStore,
        config: &'a HarvestConfig,
    ) -> Self {
        Self {
            browser,
            fetcher,
            store,
            config,
        }
    }

    /// Processes each entry in listing order. A failing entry is logged and skipped.
    pub async fn run(mut self, page: usize) -> PageSummary {
        let mut summary = PageSummary::new(page);

        let entries = match self.browser.find_all(ITEM_SELECTOR).await {
            Ok(entries) => entries,
            Err(e) => {
                ::log::error!("Could not list logos on page {}: {:?}", page, e);
                return summary;
            }
        };
        ::log::info!("Found {} logos on the page.", entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let outcome = match self.scrape_entry(entry).await {
                Ok(row) => ItemOutcome::Recorded(row),
                Err(e) => {
                    ::log::error!("Error scraping logo #{} on page {}: {:?}", index + 1, page, e);
                    ItemOutcome::Skipped {
                        reason: e.to_string(),
                    }
                }
            };
            summary.record(&outcome);
        }

        summary
    }

    async fn scrape_entry(&mut self, entry: &B::Element) -> Result<OutputRow> {
        let item = self.resolve_item(entry).await?;
        let file_name = image_file_name(&item.image_url);

        let download = fetch::download_image(
            self.fetcher,
            &item.image_url,
            &self.config.images_dir.join(&file_name),
            &self.config.user_agent,
        )
        .await;
        log_download(&download, &file_name);

        let detail = self.visit_detail(&item.detail_url).await;
        let row = OutputRow::new(item.title, file_name, detail);
        if !download.has_file() {
            ::log::warn!(
                "Row for '{}' references {} which is not on disk",
                row.title,
                row.image_file_name
            );
        }

        match self.store.append(row.clone()) {
            Ok(()) => ::log::info!("Saved entry for: {}", row.title),
            Err(e) => ::log::error!(
                "Error saving row to {}: {}",
                self.store.path().display(),
                e
            ),
        }
        Ok(row)
    }

    /// Reads title, detail URL and image URL from a listing entry
    async fn resolve_item(&mut self, entry: &B::Element) -> Result<GalleryItem> {
        let title_el = self.browser.find_in(entry, TITLE_SELECTOR).await?;
        let title = self
            .browser
            .attr(&title_el, "title")
            .await?
            .ok_or_else(|| HarvestError::missing_attribute(TITLE_SELECTOR, "title"))?;
        let detail_url = self
            .browser
            .attr(&title_el, "href")
            .await?
            .ok_or_else(|| HarvestError::missing_attribute(TITLE_SELECTOR, "href"))?;

        let image_el = self.browser.find_in(entry, IMAGE_SELECTOR).await?;
        let src = self
            .browser
            .attr(&image_el, "src")
            .await?
            .ok_or_else(|| HarvestError::missing_attribute(IMAGE_SELECTOR, "src"))?;

        Ok(GalleryItem {
            title: title.trim().to_string(),
            detail_url: absolute_url(&detail_url, &self.config.site_origin),
            image_url: absolute_url(&src, &self.config.site_origin),
        })
    }

    /// Opens the detail page in its own browsing context and extracts its metadata.
    ///
    /// The context is closed and focus returned on every path; failures leave
    /// the defaults in place.
    async fn visit_detail(&mut self, detail_url: &str) -> DetailRecord {
        let origin = match self.browser.current_window().await {
            Ok(window) => window,
            Err(e) => {
                ::log::error!("Could not read the current window: {:?}", e);
                return DetailRecord::default();
            }
        };

        let extracted = self.extract_detail(detail_url).await;
        self.return_to(&origin).await;

        match extracted {
            Ok(detail) => detail,
            Err(HarvestError::Timeout(_)) => {
                ::log::warn!(
                    "Timeout waiting for detail page content, skipping description and tags."
                );
                DetailRecord::default()
            }
            Err(e) => {
                ::log::warn!("Error parsing detail page {}: {:?}", detail_url, e);
                DetailRecord::default()
            }
        }
    }

    async fn extract_detail(&mut self, detail_url: &str) -> Result<DetailRecord> {
        self.browser.open_window(detail_url).await?;
        let hook = browser::wait_for_element(
            self.browser,
            DETAIL_SELECTOR,
            self.config.detail_timeout(),
            self.config.poll_interval(),
        )
        .await?;
        let html = self.browser.inner_html(&hook).await?;
        Ok(parsers::extract_detail(&html))
    }

    /// Closes any detail context and switches back to the listing
    async fn return_to(&mut self, origin: &B::Window) {
        match self.browser.current_window().await {
            Ok(current) if current == *origin => {}
            Ok(_) => {
                if let Err(e) = self.browser.close_window().await {
                    ::log::warn!("Could not close detail window: {}", e);
                }
            }
            Err(e) => ::log::warn!("Could not read the current window: {}", e),
        }
        if let Err(e) = self.browser.switch_to(origin).await {
            ::log::error!("Could not switch back to the listing window: {}", e);
        }
    }
}

fn log_download(outcome: &DownloadOutcome, file_name: &str) {
    match outcome {
        DownloadOutcome::Downloaded { bytes } => {
            ::log::info!("Downloaded image: {} ({} bytes)", file_name, bytes)
        }
        DownloadOutcome::AlreadyPresent => ::log::info!("Image already exists: {}", file_name),
        DownloadOutcome::Rejected { status } => {
            ::log::warn!("Failed to download image ({}): {}", status, file_name)
        }
        DownloadOutcome::Errored(reason) => {
            ::log::warn!("Failed to download image {}: {}", file_name, reason)
        }
    }
}
