use crate::browser::{self, Browser};
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::utils::pause;

/// "More" button under the listing grid
pub const MORE_SELECTOR: &str = "a.button.large-2.medium-2.tween-3.small-4.large-centered.medium-centered.tween-centered.small-centered";

/// "Next page" button
pub const NEXT_SELECTOR: &str = "a.button.large-4.medium-4.tween-4.small-4.lleft.mleft.tleft.sleft";

/// Result of trying to move to the next listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Advanced,
    NoMorePages,
}

enum MoreButton {
    Clicked,
    Disabled,
}

/// Presses "more" until the button disappears, disables itself or errors.
///
/// Returns the number of successful clicks. Never fails: every terminal
/// condition ends the loop and lets the crawl continue with scraping.
pub async fn exhaust_more<B: Browser + ?Sized>(browser: &mut B, config: &HarvestConfig) -> usize {
    let mut clicks = 0;
    let mut intercepted = 0;

    loop {
        if config.max_more_clicks.is_some_and(|max| clicks >= max) {
            ::log::info!("Reached the limit of {} 'More' clicks", clicks);
            break;
        }

        match press_more(browser, config).await {
            Ok(MoreButton::Clicked) => {
                clicks += 1;
                intercepted = 0;
                ::log::debug!("'More' clicked {} times", clicks);
            }
            Ok(MoreButton::Disabled) => {
                ::log::info!("'More' button is disabled.");
                break;
            }
            Err(HarvestError::ElementNotFound(_)) => {
                ::log::info!("No 'More' button found.");
                break;
            }
            Err(HarvestError::ClickIntercepted) => {
                intercepted += 1;
                if intercepted > config.max_intercepted_retries {
                    ::log::error!(
                        "'More' click intercepted {} times in a row, giving up on this page",
                        intercepted
                    );
                    break;
                }
                ::log::info!("Click intercepted, retrying...");
                pause(config.retry_delay()).await;
            }
            Err(e) => {
                ::log::error!("Error clicking 'More': {}", e);
                break;
            }
        }
    }

    clicks
}

async fn press_more<B: Browser + ?Sized>(
    browser: &mut B,
    config: &HarvestConfig,
) -> Result<MoreButton> {
    let button = browser.find(MORE_SELECTOR).await?;
    let class = browser.attr(&button, "class").await?.unwrap_or_default();
    if class.contains("disabled") {
        return Ok(MoreButton::Disabled);
    }

    browser.scroll_into_view(&button).await?;
    pause(config.settle_delay()).await;
    browser.click(&button).await?;
    pause(config.load_delay()).await;
    Ok(MoreButton::Clicked)
}

/// Waits for the "next page" button and follows it.
///
/// A missing button, or one that never becomes clickable, is the normal end
/// of the gallery and reports [`Advance::NoMorePages`].
pub async fn advance_page<B: Browser + ?Sized>(browser: &mut B, config: &HarvestConfig) -> Advance {
    let next = match browser::wait_for_interactable(
        browser,
        NEXT_SELECTOR,
        config.next_timeout(),
        config.poll_interval(),
    )
    .await
    {
        Ok(next) => next,
        Err(HarvestError::ElementNotFound(_)) => {
            ::log::info!("Reached last page.");
            return Advance::NoMorePages;
        }
        Err(HarvestError::Timeout(_)) => {
            ::log::info!("Timeout waiting for the next button.");
            return Advance::NoMorePages;
        }
        Err(e) => {
            ::log::error!("Error on next page: {}", e);
            return Advance::NoMorePages;
        }
    };

    ::log::info!("Navigating to next page...");
    if let Err(e) = follow(browser, &next, config).await {
        ::log::error!("Error on next page: {}", e);
        return Advance::NoMorePages;
    }
    pause(config.load_delay()).await;
    Advance::Advanced
}

async fn follow<B: Browser + ?Sized>(
    browser: &mut B,
    next: &B::Element,
    config: &HarvestConfig,
) -> Result<()> {
    browser.scroll_into_view(next).await?;
    pause(config.settle_delay()).await;

    match browser.click(next).await {
        Err(HarvestError::ClickIntercepted) => {
            ::log::warn!("Click intercepted, using JavaScript click.");
            browser.script_click(next).await
        }
        other => other,
    }
}
