use crate::config::HarvestConfig;
use crate::error::Result;
use crate::results::DownloadOutcome;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::path::Path;

/// Status and body of a completed GET
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Unauthenticated image transfer
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// GET `url` with the given User-Agent header
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchedImage>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(8))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedImage { status, bytes })
    }
}

/// Downloads an image to `path` unless a file is already there.
///
/// Failures are reported in the outcome rather than returned; the caller
/// records the item either way.
pub async fn download_image<F: ImageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    path: &Path,
    user_agent: &str,
) -> DownloadOutcome {
    match tokio::fs::try_exists(path).await {
        Ok(true) => return DownloadOutcome::AlreadyPresent,
        Ok(false) => {}
        Err(e) => return DownloadOutcome::Errored(e.to_string()),
    }

    let image = match fetcher.fetch(url, user_agent).await {
        Ok(image) => image,
        Err(e) => return DownloadOutcome::Errored(e.to_string()),
    };
    if !image.is_success() {
        return DownloadOutcome::Rejected {
            status: image.status,
        };
    }

    match tokio::fs::write(path, &image.bytes).await {
        Ok(()) => DownloadOutcome::Downloaded {
            bytes: image.bytes.len(),
        },
        Err(e) => DownloadOutcome::Errored(e.to_string()),
    }
}
