use anyhow::Context;
use clap::Parser;
use sentibot::api::{AlpacaClient, GoogleNewsClient};
use sentibot::config::Settings;
use sentibot::execution::{CycleRunner, OrderMode};
use sentibot::sentiment::VaderModel;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sentiment-driven equity trading cycle")]
struct Cli {
    /// TOML settings file (optional; defaults and env vars apply without it)
    #[arg(long, default_value = "sentibot.toml")]
    config: PathBuf,

    /// Decide and log, but submit no orders
    #[arg(long)]
    dry_run: bool,

    /// Tracing filter, overrides RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.log_filter.as_deref());

    if let Err(e) = run(cli).await {
        tracing::error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(Some(&cli.config))
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    settings.validate(true)?;

    let mode = if cli.dry_run {
        OrderMode::DryRun
    } else {
        OrderMode::Live
    };

    tracing::info!(
        "🚀 Sentibot starting - {} tickers, {:?} mode, broker {}",
        settings.watchlist.len(),
        mode,
        settings.broker.trading_url
    );

    let call_timeout = settings.cycle.call_timeout();
    let broker = AlpacaClient::new(&settings.broker, call_timeout)?;
    let news = GoogleNewsClient::from_settings(&settings.news, call_timeout)?;

    let runner = CycleRunner::new(news, broker, VaderModel::new(), &settings, mode);
    let report = runner.run().await?;

    tracing::info!(
        "✓ Cycle finished: {} orders, {} failures, ${:.2} invested",
        report.orders_placed(),
        report.failures(),
        report.total_invested
    );

    Ok(())
}

fn setup_logging(cli_filter: Option<&str>) {
    let filter = match cli_filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentibot=info")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
