use clap::Parser;
use logo_harvest::Harvest;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging, defaulting to progress messages
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL or --webdriver-url if not using {}",
        config.webdriver_url
    );
    ::log::info!("Starting harvest from: {}", config.start_url);

    let start_time = std::time::Instant::now();
    match Harvest::with_config(config).run().await {
        Ok(summary) => {
            ::log::info!(
                "Harvest complete - {} pages, {} rows recorded, {} entries skipped in {:.2} seconds",
                summary.pages.len(),
                summary.recorded(),
                summary.skipped(),
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Harvest aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
