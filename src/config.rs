use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Featured gallery listing, first page
pub const DEFAULT_START_URL: &str = "https://logopond.com/gallery/list/?gallery=featured&filter=";

/// Configuration for a gallery harvest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Listing page to start crawling from
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Origin prefixed to relative image URLs
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser window size as (width, height)
    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),

    /// Directory receiving downloaded images
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Tabular output file, rewritten after every record
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// User-Agent sent with image downloads
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How long to wait for the detail page content container
    #[serde(default = "default_wait_secs")]
    pub detail_timeout_secs: u64,

    /// How long to wait for the next-page button to become clickable
    #[serde(default = "default_wait_secs")]
    pub next_timeout_secs: u64,

    /// Interval between polls while waiting on a DOM condition
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Pause after scrolling a control into view
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause after a click that loads new content
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Pause before retrying an intercepted click
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause after opening the start URL
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Consecutive intercepted "more" clicks tolerated before giving up on the page
    #[serde(default = "default_max_intercepted_retries")]
    pub max_intercepted_retries: usize,

    /// Stop after this many listing pages
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Stop pressing "more" after this many successful clicks per page
    #[serde(default)]
    pub max_more_clicks: Option<usize>,
}

fn default_start_url() -> String {
    DEFAULT_START_URL.to_string()
}

fn default_site_origin() -> String {
    "https://logopond.com".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_window_size() -> (u32, u32) {
    (1920, 1080)
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("titles.csv")
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_wait_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_load_delay_ms() -> u64 {
    4000
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_initial_delay_ms() -> u64 {
    3000
}

fn default_max_intercepted_retries() -> usize {
    3
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            site_origin: default_site_origin(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            window_size: default_window_size(),
            images_dir: default_images_dir(),
            output_file: default_output_file(),
            user_agent: default_user_agent(),
            detail_timeout_secs: default_wait_secs(),
            next_timeout_secs: default_wait_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            load_delay_ms: default_load_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            initial_delay_ms: default_initial_delay_ms(),
            max_intercepted_retries: default_max_intercepted_retries(),
            max_pages: None,
            max_more_clicks: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.start_url)
            .map_err(|e| HarvestError::config(format!("start_url '{}': {e}", self.start_url)))?;
        url::Url::parse(&self.site_origin)
            .map_err(|e| HarvestError::config(format!("site_origin '{}': {e}", self.site_origin)))?;
        if self.user_agent.trim().is_empty() {
            return Err(HarvestError::config("user_agent is empty"));
        }
        if self.max_pages == Some(0) {
            return Err(HarvestError::config("max_pages must be at least 1"));
        }
        Ok(())
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn next_timeout(&self) -> Duration {
        Duration::from_secs(self.next_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_START_URL)
    }
}
