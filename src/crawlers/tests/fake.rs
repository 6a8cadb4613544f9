//! In-memory gallery used in place of a WebDriver session

use crate::browser::Browser;
use crate::config::HarvestConfig;
use crate::crawlers::items::{DETAIL_SELECTOR, IMAGE_SELECTOR, ITEM_SELECTOR, TITLE_SELECTOR};
use crate::crawlers::pagination::{MORE_SELECTOR, NEXT_SELECTOR};
use crate::error::{HarvestError, Result};
use crate::fetch::{FetchedImage, ImageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const MORE_CLASS: &str = "button large-2 medium-2 tween-3 small-4 large-centered";

#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub title: String,
    pub href: String,
    pub src: Option<String>,
}

impl FakeEntry {
    /// Entry whose title carries surrounding whitespace, as the live site's does
    pub fn new(name: &str) -> Self {
        Self {
            title: format!("  {name} "),
            href: format!("https://logopond.com/logos/{name}.html"),
            src: Some(format!("/logos/{name}.png")),
        }
    }

    /// Entry linking to its detail page by path only
    pub fn with_relative_href(mut self) -> Self {
        if let Some(path) = self.href.strip_prefix("https://logopond.com") {
            self.href = path.to_string();
        }
        self
    }

    pub fn without_image(mut self) -> Self {
        self.src = None;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub entries: Vec<FakeEntry>,
    /// Entries revealed by each "more" click, in order
    pub more: Vec<Vec<FakeEntry>>,
    pub has_more_button: bool,
}

impl FakePage {
    pub fn new(entries: Vec<FakeEntry>) -> Self {
        Self {
            entries,
            more: Vec::new(),
            has_more_button: true,
        }
    }

    pub fn with_more(mut self, batch: Vec<FakeEntry>) -> Self {
        self.more.push(batch);
        self
    }
}

/// What the fake observed, shared with the test after the browser is moved away
#[derive(Debug, Default)]
pub struct FakeLog {
    pub visited: Vec<String>,
    pub opened: Vec<String>,
    pub closed: usize,
    pub more_clicks: usize,
    pub intercepted_clicks: usize,
    pub next_clicks: usize,
    pub script_clicks: usize,
    pub max_open_windows: usize,
    pub quit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FakeElement {
    Entry(usize),
    Title(usize),
    Image(usize),
    More,
    Next,
    Hook,
}

pub struct FakeBrowser {
    pages: Vec<FakePage>,
    /// Inner HTML of the detail container, keyed by detail URL
    details: HashMap<String, String>,
    page: usize,
    loaded: usize,
    /// Open contexts; `None` is the listing
    windows: Vec<(usize, Option<String>)>,
    current: usize,
    next_window: usize,
    pub more_intercepts: usize,
    pub next_intercepted: bool,
    /// Number of upcoming window switches that fail
    pub switch_failures: usize,
    pub log: Arc<Mutex<FakeLog>>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<FakePage>) -> Self {
        let details = pages
            .iter()
            .flat_map(|p| p.entries.iter().chain(p.more.iter().flatten()))
            .map(|e| (detail_key(&e.href), detail_html(e.title.trim())))
            .collect();

        Self {
            pages,
            details,
            page: 0,
            loaded: 0,
            windows: vec![(0, None)],
            current: 0,
            next_window: 1,
            more_intercepts: 0,
            next_intercepted: false,
            switch_failures: 0,
            log: Arc::new(Mutex::new(FakeLog::default())),
        }
    }

    /// Drop the detail container for one entry so its page never finishes loading
    pub fn without_detail(mut self, href: &str) -> Self {
        self.details.remove(&detail_key(href));
        self
    }

    pub fn open_windows(&self) -> usize {
        self.windows.len()
    }

    fn current_page(&self) -> &FakePage {
        &self.pages[self.page]
    }

    fn visible(&self) -> Vec<&FakeEntry> {
        let page = self.current_page();
        page.entries
            .iter()
            .chain(page.more.iter().take(self.loaded).flatten())
            .collect()
    }

    fn detail_url(&self) -> Option<&String> {
        self.windows
            .iter()
            .find(|(id, _)| *id == self.current)
            .and_then(|(_, url)| url.as_ref())
    }

    fn on_listing(&self) -> bool {
        self.current == 0
    }

    fn advance(&mut self) {
        self.page += 1;
        self.loaded = 0;
        self.log.lock().unwrap().next_clicks += 1;
    }
}

/// Details are served by absolute URL, whatever form the listing links in
fn detail_key(href: &str) -> String {
    url::Url::parse("https://logopond.com")
        .and_then(|origin| origin.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

pub fn detail_html(name: &str) -> String {
    format!(
        "<strong>Description:</strong> About {name}.<br>\
         <strong>Tags:</strong> <a href='#'>{name}</a>, <a href='#'>logo</a><br>"
    )
}

fn not_found(selector: &str) -> HarvestError {
    HarvestError::ElementNotFound(selector.to_string())
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;
    type Window = usize;

    async fn goto(&mut self, url: &str) -> Result<()> {
        if self.on_listing() {
            self.log.lock().unwrap().visited.push(url.to_string());
            return Ok(());
        }
        // A fresh context is blank, so only absolute URLs can be loaded in it
        let url = url::Url::parse(url)?.to_string();
        let current = self.current;
        if let Some(window) = self.windows.iter_mut().find(|(id, _)| *id == current) {
            window.1 = Some(url.clone());
        }
        self.log.lock().unwrap().opened.push(url);
        Ok(())
    }

    async fn find(&mut self, selector: &str) -> Result<FakeElement> {
        if !self.on_listing() {
            let has_hook = self
                .detail_url()
                .is_some_and(|url| self.details.contains_key(url));
            return match selector {
                DETAIL_SELECTOR if has_hook => Ok(FakeElement::Hook),
                _ => Err(not_found(selector)),
            };
        }

        match selector {
            MORE_SELECTOR if self.current_page().has_more_button => Ok(FakeElement::More),
            NEXT_SELECTOR if self.page + 1 < self.pages.len() => Ok(FakeElement::Next),
            ITEM_SELECTOR if !self.visible().is_empty() => Ok(FakeElement::Entry(0)),
            _ => Err(not_found(selector)),
        }
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<FakeElement>> {
        if selector == ITEM_SELECTOR && self.on_listing() {
            return Ok((0..self.visible().len()).map(FakeElement::Entry).collect());
        }
        Ok(Vec::new())
    }

    async fn find_in(&mut self, parent: &FakeElement, selector: &str) -> Result<FakeElement> {
        let FakeElement::Entry(index) = parent else {
            return Err(not_found(selector));
        };
        let entry = self.visible()[*index].clone();
        match selector {
            TITLE_SELECTOR => Ok(FakeElement::Title(*index)),
            IMAGE_SELECTOR if entry.src.is_some() => Ok(FakeElement::Image(*index)),
            _ => Err(not_found(selector)),
        }
    }

    async fn attr(&mut self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        let value = match (element, name) {
            (FakeElement::Title(i), "title") => Some(self.visible()[*i].title.clone()),
            (FakeElement::Title(i), "href") => Some(self.visible()[*i].href.clone()),
            (FakeElement::Image(i), "src") => self.visible()[*i].src.clone(),
            (FakeElement::More, "class") => {
                if self.loaded >= self.current_page().more.len() {
                    Some(format!("{MORE_CLASS} disabled"))
                } else {
                    Some(MORE_CLASS.to_string())
                }
            }
            _ => None,
        };
        Ok(value)
    }

    async fn inner_html(&mut self, element: &FakeElement) -> Result<String> {
        match (element, self.detail_url()) {
            (FakeElement::Hook, Some(url)) => self
                .details
                .get(url)
                .cloned()
                .ok_or_else(|| not_found(DETAIL_SELECTOR)),
            _ => Err(not_found(DETAIL_SELECTOR)),
        }
    }

    async fn is_interactable(&mut self, _element: &FakeElement) -> Result<bool> {
        Ok(true)
    }

    async fn scroll_into_view(&mut self, _element: &FakeElement) -> Result<()> {
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> Result<()> {
        match element {
            FakeElement::More => {
                if self.more_intercepts > 0 {
                    self.more_intercepts -= 1;
                    self.log.lock().unwrap().intercepted_clicks += 1;
                    return Err(HarvestError::ClickIntercepted);
                }
                if self.loaded < self.current_page().more.len() {
                    self.loaded += 1;
                }
                self.log.lock().unwrap().more_clicks += 1;
            }
            FakeElement::Next => {
                if self.next_intercepted {
                    self.log.lock().unwrap().intercepted_clicks += 1;
                    return Err(HarvestError::ClickIntercepted);
                }
                self.advance();
            }
            _ => {}
        }
        Ok(())
    }

    async fn script_click(&mut self, element: &FakeElement) -> Result<()> {
        self.log.lock().unwrap().script_clicks += 1;
        if *element == FakeElement::Next {
            self.advance();
        }
        Ok(())
    }

    async fn current_window(&mut self) -> Result<usize> {
        Ok(self.current)
    }

    async fn new_window(&mut self) -> Result<usize> {
        let id = self.next_window;
        self.next_window += 1;
        self.windows.push((id, None));

        let mut log = self.log.lock().unwrap();
        log.max_open_windows = log.max_open_windows.max(self.windows.len());
        Ok(id)
    }

    async fn switch_to(&mut self, window: &usize) -> Result<()> {
        if self.switch_failures > 0 {
            self.switch_failures -= 1;
            return Err(not_found(&format!("window {window}")));
        }
        if self.windows.iter().any(|(id, _)| id == window) {
            self.current = *window;
            Ok(())
        } else {
            Err(not_found(&format!("window {window}")))
        }
    }

    async fn close_window(&mut self) -> Result<()> {
        let current = self.current;
        self.windows.retain(|(id, _)| *id != current);
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.log.lock().unwrap().quit = true;
        Ok(())
    }
}

/// Serves a small body for every URL, or a fixed status for selected URLs
#[derive(Default)]
pub struct FakeFetcher {
    pub statuses: HashMap<String, u16>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn failing(url: &str, status: u16) -> Self {
        let mut fetcher = Self::default();
        fetcher.statuses.insert(url.to_string(), status);
        fetcher
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _user_agent: &str) -> Result<FetchedImage> {
        self.calls.lock().unwrap().push(url.to_string());
        let status = self.statuses.get(url).copied().unwrap_or(200);
        Ok(FetchedImage {
            status,
            bytes: url.as_bytes().to_vec(),
        })
    }
}

/// Configuration writing into `dir` with every delay and timeout set to zero
pub fn test_config(dir: &Path) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.images_dir = dir.join("images");
    config.output_file = dir.join("titles.csv");
    config.detail_timeout_secs = 0;
    config.next_timeout_secs = 0;
    config.poll_interval_ms = 0;
    config.settle_delay_ms = 0;
    config.load_delay_ms = 0;
    config.retry_delay_ms = 0;
    config.initial_delay_ms = 0;
    config
}

/// Rows of the output file, header excluded
pub fn read_rows(path: &Path) -> Vec<crate::results::OutputRow> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .deserialize::<crate::results::OutputRow>()
        .map(|r| r.unwrap())
        .collect()
}
