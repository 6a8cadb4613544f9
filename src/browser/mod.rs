pub mod webdriver;

use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

pub use webdriver::WebDriverBrowser;

/// Browser capabilities the crawl depends on.
///
/// Selectors are CSS. Lookups that match nothing return
/// [`HarvestError::ElementNotFound`]; clicks that land on another element
/// return [`HarvestError::ClickIntercepted`].
#[async_trait]
pub trait Browser: Send {
    type Element: Clone + Send + Sync;
    type Window: Clone + PartialEq + Send + Sync;

    async fn goto(&mut self, url: &str) -> Result<()>;

    async fn find(&mut self, selector: &str) -> Result<Self::Element>;

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Find a descendant of `parent`
    async fn find_in(&mut self, parent: &Self::Element, selector: &str) -> Result<Self::Element>;

    async fn attr(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn inner_html(&mut self, element: &Self::Element) -> Result<String>;

    /// Displayed and enabled
    async fn is_interactable(&mut self, element: &Self::Element) -> Result<bool>;

    async fn scroll_into_view(&mut self, element: &Self::Element) -> Result<()>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    /// Click through script, bypassing overlays
    async fn script_click(&mut self, element: &Self::Element) -> Result<()>;

    async fn current_window(&mut self) -> Result<Self::Window>;

    /// Create a blank browsing context without switching to it
    async fn new_window(&mut self) -> Result<Self::Window>;

    /// Open `url` in a new browsing context and switch to it.
    ///
    /// If the switch fails, the new context is closed before the error is returned.
    async fn open_window(&mut self, url: &str) -> Result<Self::Window> {
        let origin = self.current_window().await?;
        let opened = self.new_window().await?;
        if let Err(e) = self.switch_to(&opened).await {
            discard_window(self, &opened, &origin).await;
            return Err(e);
        }
        self.goto(url).await?;
        Ok(opened)
    }

    async fn switch_to(&mut self, window: &Self::Window) -> Result<()>;

    /// Close the current browsing context; callers must switch afterwards
    async fn close_window(&mut self) -> Result<()>;

    /// End the session
    async fn quit(&mut self) -> Result<()>;
}

/// Closes `window` and refocuses `origin`, logging what cannot be undone
async fn discard_window<B: Browser + ?Sized>(
    browser: &mut B,
    window: &B::Window,
    origin: &B::Window,
) {
    match browser.switch_to(window).await {
        Ok(()) => {
            if let Err(e) = browser.close_window().await {
                ::log::warn!("Could not close unused window: {}", e);
            }
        }
        Err(e) => ::log::warn!("Could not reach unused window to close it: {}", e),
    }
    if let Err(e) = browser.switch_to(origin).await {
        ::log::error!("Could not switch back after opening a window: {}", e);
    }
}

/// Polls for an element matching `selector` until it appears or `timeout` elapses
pub async fn wait_for_element<B: Browser + ?Sized>(
    browser: &mut B,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<B::Element> {
    let deadline = Instant::now() + timeout;
    loop {
        match browser.find(selector).await {
            Ok(element) => return Ok(element),
            Err(HarvestError::ElementNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        if Instant::now() >= deadline {
            return Err(HarvestError::Timeout(format!("'{selector}' to appear")));
        }
        crate::utils::pause(poll).await;
    }
}

/// Polls until an element matching `selector` is present and interactable
pub async fn wait_for_interactable<B: Browser + ?Sized>(
    browser: &mut B,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<B::Element> {
    let deadline = Instant::now() + timeout;
    loop {
        match browser.find(selector).await {
            Ok(element) => {
                if browser.is_interactable(&element).await? {
                    return Ok(element);
                }
            }
            Err(HarvestError::ElementNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        if Instant::now() >= deadline {
            return Err(HarvestError::Timeout(format!("'{selector}' to be clickable")));
        }
        crate::utils::pause(poll).await;
    }
}
