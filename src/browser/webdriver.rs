use super::Browser;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::{Capabilities, WindowHandle};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

/// Local ports WebDriver servers commonly listen on
const FALLBACK_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// [`Browser`] backed by a `fantoccini` WebDriver session
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Connects to the configured WebDriver server, falling back to common local ports.
    ///
    /// Failure here is the one fatal error of a harvest.
    pub async fn connect(config: &HarvestConfig) -> Result<Self> {
        let capabilities = chrome_capabilities(config);
        let mut last_error = String::new();

        let candidates = std::iter::once(config.webdriver_url.as_str())
            .chain(FALLBACK_URLS.into_iter().filter(|url| *url != config.webdriver_url));

        for (attempt, url) in candidates.enumerate() {
            if attempt > 0 {
                ::log::info!("Trying fallback WebDriver URL: {}", url);
            }
            let mut builder = ClientBuilder::native();
            builder.capabilities(capabilities.clone());
            match builder.connect(url).await {
                Ok(client) => {
                    ::log::info!("Connected to WebDriver at {}", url);
                    let browser = Self { client };
                    if !config.headless {
                        if let Err(e) = browser.client.maximize_window().await {
                            ::log::warn!("Could not maximize browser window: {}", e);
                        }
                    }
                    return Ok(browser);
                }
                Err(e) => {
                    ::log::debug!("Failed to connect to WebDriver at {}: {}", url, e);
                    last_error = format!("{url}: {e}");
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(HarvestError::NewSession(last_error))
    }
}

/// Chrome options for the session
fn chrome_capabilities(config: &HarvestConfig) -> Capabilities {
    let (width, height) = config.window_size;
    let mut args = vec![
        format!("--window-size={width},{height}"),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
    ];
    if config.headless {
        args.insert(0, "--headless".to_string());
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

/// Maps WebDriver failures onto the errors the crawl branches on
fn classify(error: CmdError, selector: &str) -> HarvestError {
    if error.is_no_such_element() {
        return HarvestError::ElementNotFound(selector.to_string());
    }
    match error {
        CmdError::Standard(ref wd) if matches!(wd.error, ErrorStatus::ElementClickIntercepted) => {
            HarvestError::ClickIntercepted
        }
        CmdError::WaitTimeout => HarvestError::Timeout(selector.to_string()),
        other => {
            if other.to_string().contains("Unable to find session") {
                ::log::warn!("WebDriver session lost while handling '{}'", selector);
            }
            HarvestError::WebDriver(other)
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;
    type Window = WindowHandle;

    async fn goto(&mut self, url: &str) -> Result<()> {
        ::log::debug!("GOTO: {}", url);
        self.client.goto(url).await.map_err(|e| classify(e, url))
    }

    async fn find(&mut self, selector: &str) -> Result<Element> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| classify(e, selector))
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Element>> {
        self.client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| classify(e, selector))
    }

    async fn find_in(&mut self, parent: &Element, selector: &str) -> Result<Element> {
        parent
            .find(Locator::Css(selector))
            .await
            .map_err(|e| classify(e, selector))
    }

    async fn attr(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        element.attr(name).await.map_err(|e| classify(e, name))
    }

    async fn inner_html(&mut self, element: &Element) -> Result<String> {
        element.html(true).await.map_err(|e| classify(e, "innerHTML"))
    }

    async fn is_interactable(&mut self, element: &Element) -> Result<bool> {
        let displayed = element
            .is_displayed()
            .await
            .map_err(|e| classify(e, "displayed"))?;
        let enabled = element
            .is_enabled()
            .await
            .map_err(|e| classify(e, "enabled"))?;
        Ok(displayed && enabled)
    }

    async fn scroll_into_view(&mut self, element: &Element) -> Result<()> {
        self.client
            .execute(
                "arguments[0].scrollIntoView(true);",
                vec![serde_json::to_value(element)?],
            )
            .await
            .map_err(|e| classify(e, "scrollIntoView"))?;
        Ok(())
    }

    async fn click(&mut self, element: &Element) -> Result<()> {
        element.click().await.map_err(|e| classify(e, "click"))
    }

    async fn script_click(&mut self, element: &Element) -> Result<()> {
        self.client
            .execute("arguments[0].click();", vec![serde_json::to_value(element)?])
            .await
            .map_err(|e| classify(e, "script click"))?;
        Ok(())
    }

    async fn current_window(&mut self) -> Result<WindowHandle> {
        self.client
            .window()
            .await
            .map_err(|e| classify(e, "current window"))
    }

    async fn new_window(&mut self) -> Result<WindowHandle> {
        let opened = self
            .client
            .new_window(true)
            .await
            .map_err(|e| classify(e, "new window"))?;
        Ok(opened.handle)
    }

    async fn switch_to(&mut self, window: &WindowHandle) -> Result<()> {
        self.client
            .switch_to_window(window.clone())
            .await
            .map_err(|e| classify(e, "switch window"))
    }

    async fn close_window(&mut self) -> Result<()> {
        self.client
            .close_window()
            .await
            .map_err(|e| classify(e, "close window"))
    }

    async fn quit(&mut self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| classify(e, "close session"))
    }
}
