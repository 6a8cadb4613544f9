use serde::{Deserialize, Serialize};

/// Placeholder used when a detail page has no description label
pub const NO_DESCRIPTION: &str = "No description found";

/// One gallery entry as read from the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Trimmed title from the entry's title link
    pub title: String,

    /// Detail page for the entry
    pub detail_url: String,

    /// Absolute image URL
    pub image_url: String,
}

/// Metadata extracted from a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub description: String,
    pub tags: Vec<String>,
}

impl DetailRecord {
    /// Tags joined for display
    pub fn tags_string(&self) -> String {
        self.tags.join(", ")
    }
}

impl Default for DetailRecord {
    fn default() -> Self {
        Self {
            description: NO_DESCRIPTION.to_string(),
            tags: Vec::new(),
        }
    }
}

/// A row in the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub title: String,
    #[serde(rename = "original_img_name")]
    pub image_file_name: String,
    pub description: String,
    #[serde(rename = "tags_str")]
    pub tags: String,
}

impl OutputRow {
    pub fn new(title: String, image_file_name: String, detail: DetailRecord) -> Self {
        let tags = detail.tags_string();
        Self {
            title,
            image_file_name,
            description: detail.description,
            tags,
        }
    }

    /// Field values in header order
    pub fn as_record(&self) -> [&str; 4] {
        [
            &self.title,
            &self.image_file_name,
            &self.description,
            &self.tags,
        ]
    }
}

/// What happened to an entry's image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Fetched and written to disk
    Downloaded { bytes: usize },
    /// A file with the same name was already on disk; nothing was fetched
    AlreadyPresent,
    /// The server answered with a non-success status
    Rejected { status: u16 },
    /// The transfer or the write failed
    Errored(String),
}

impl DownloadOutcome {
    /// Whether the image file exists on disk after this outcome
    pub fn has_file(&self) -> bool {
        matches!(
            self,
            DownloadOutcome::Downloaded { .. } | DownloadOutcome::AlreadyPresent
        )
    }
}

/// Result of processing one gallery entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A row was appended to the record store
    Recorded(OutputRow),
    /// The entry could not be scraped; nothing was appended
    Skipped { reason: String },
}

/// Counts for one listing page pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub page: usize,
    pub more_clicks: usize,
    pub recorded: usize,
    pub skipped: usize,
}

impl PageSummary {
    pub fn new(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Recorded(_) => self.recorded += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Totals for a whole crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: Vec<PageSummary>,
}

impl CrawlSummary {
    pub fn recorded(&self) -> usize {
        self.pages.iter().map(|p| p.recorded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.pages.iter().map(|p| p.skipped).sum()
    }
}
