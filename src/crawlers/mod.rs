pub mod crawler;
pub mod items;
pub mod pagination;

#[cfg(test)]
mod tests;

pub use crawler::{CrawlState, Crawler};
pub use items::ListingPass;
pub use pagination::{Advance, advance_page, exhaust_more};
