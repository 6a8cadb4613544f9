pub mod browser;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod fetch;
pub mod parsers;
pub mod records;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use results::{CrawlSummary, OutputRow};

use browser::WebDriverBrowser;
use crawlers::Crawler;
use fetch::HttpFetcher;
use std::path::PathBuf;

/// Builder for a gallery harvest against a live WebDriver session
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    /// Create a new Harvest starting from the given listing URL
    pub fn new(start_url: &str) -> Self {
        Self {
            config: HarvestConfig::new(start_url),
        }
    }

    /// Use a complete configuration
    pub fn with_config(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::with_config(HarvestConfig::from_file(path)?))
    }

    /// Directory receiving downloaded images
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.images_dir = dir.into();
        self
    }

    /// Output file for scraped rows
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = path.into();
        self
    }

    /// Stop after this many listing pages
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.config.max_pages = Some(pages);
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.config.webdriver_url = url.to_string();
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Connect to WebDriver and crawl until the gallery runs out of pages
    pub async fn run(self) -> Result<CrawlSummary> {
        self.config.validate()?;

        let fetcher = HttpFetcher::new(&self.config)?;
        let browser = WebDriverBrowser::connect(&self.config).await?;

        Crawler::new(browser, fetcher, self.config).run().await
    }
}
