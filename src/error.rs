use thiserror::Error;

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Errors raised while driving the browser, fetching images or writing records.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// A WebDriver command failed for a reason not classified below
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// No WebDriver session could be created
    #[error("could not start a WebDriver session: {0}")]
    NewSession(String),

    /// No element matched the selector
    #[error("no element matches '{0}'")]
    ElementNotFound(String),

    /// An element was present but lacked a required attribute
    #[error("element '{selector}' has no '{attribute}' attribute")]
    MissingAttribute { selector: String, attribute: String },

    /// Another element (usually an overlay) received the click
    #[error("click was intercepted")]
    ClickIntercepted,

    /// A bounded wait ran out
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// HTTP transfer failed before a status was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the record file failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl HarvestError {
    pub fn missing_attribute(selector: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            selector: selector.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
