use clap::Parser;
use logo_harvest::{HarvestConfig, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "logo-harvest")]
#[command(about = "Downloads gallery logos and records their title, description and tags")]
#[command(version)]
pub struct Args {
    /// Listing page to start from (defaults to the featured gallery)
    pub start_url: Option<String>,

    /// JSON configuration file; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for downloaded images
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// WebDriver server URL (also read from WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<usize>,
}

impl Args {
    /// Config file (or defaults), then `WEBDRIVER_URL`, then command-line flags
    pub fn to_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        config.apply_env_overrides();

        if let Some(url) = &self.start_url {
            config.start_url = url.clone();
        }
        if let Some(dir) = &self.images_dir {
            config.images_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            config.output_file = output.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if self.headed {
            config.headless = false;
        }
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }

        config.validate()?;
        Ok(config)
    }
}
