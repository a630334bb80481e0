use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use restock_watcher::config::ScraperConfig;
use restock_watcher::notifier::{EmailConfig, EmailNotifier};
use restock_watcher::{AppConfig, HttpFetcher, RunOptions, Runner};

#[derive(Parser)]
#[command(name = "restock-watcher", version, about = "Watch product pages and email stock alerts")]
struct Cli {
    /// Product list (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Where the last seen status of each URL is kept
    #[arg(short, long, default_value = "last_status.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check every configured product once (default)
    Run {
        /// Classify and report without emailing or writing state
        #[arg(long)]
        dry_run: bool,
    },
    /// Classify a single URL and print its status
    Check { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restock_watcher=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run { dry_run: false });

    match command {
        Command::Check { url } => {
            let scraper = ScraperConfig::from_env()?;
            let runner = Runner::without_notifier(Box::new(HttpFetcher::new(&scraper)?), Duration::ZERO);
            let status = runner.check_url(&url).await;
            println!("{} {}", status, url);
        }
        Command::Run { dry_run } => {
            let config = AppConfig::load(&cli.config)
                .with_context(|| format!("Failed to load {}", cli.config.display()))?;
            let products = config.watch.products();
            info!("Watching {} product(s)", products.len());

            let notifier = EmailNotifier::new(EmailConfig::from_settings(&config.smtp, config.recipient()));
            let runner = Runner::new(
                Box::new(HttpFetcher::new(&config.scraper)?),
                Box::new(notifier),
                Duration::from_millis(config.scraper.delay_ms),
            );

            let report = runner
                .run(&products, &cli.state, RunOptions { dry_run })
                .await
                .with_context(|| format!("Failed to update {}", cli.state.display()))?;

            for check in &report.checks {
                info!(
                    "{}: {} -> {}{}",
                    check.product.label,
                    check.previous.map_or("none", |p| p.as_str()),
                    check.status,
                    if check.fetched { "" } else { " (fetch failed)" }
                );
            }

            info!(
                "Checked {} product(s), {} fetch failure(s), {} change(s)",
                report.products_checked,
                report.fetch_failures,
                report.events.len()
            );
        }
    }

    Ok(())
}
