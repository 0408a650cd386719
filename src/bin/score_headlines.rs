use anyhow::Result;
use clap::Parser;
use sentibot::api::{GoogleNewsClient, NewsSource};
use sentibot::config::Settings;
use sentibot::sentiment::{VaderModel, SentimentAggregator, SentimentModel};
use std::path::PathBuf;

/// Print the headlines and scores the trading cycle would see for one company
#[derive(Parser, Debug)]
#[command(author, version, about = "Score recent headlines for a company")]
struct Args {
    /// Company name as searched on Google News, e.g. "Procter & Gamble"
    company: String,

    /// Number of headlines to score (defaults to news.headline_limit)
    #[arg(long)]
    limit: Option<usize>,

    #[arg(long, default_value = "sentibot.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("sentibot=info")
        .init();

    let args = Args::parse();
    let settings = Settings::load(Some(&args.config))?;
    settings.validate(false)?;

    let limit = args.limit.unwrap_or(settings.news.headline_limit);
    let news = GoogleNewsClient::from_settings(&settings.news, settings.cycle.call_timeout())?;
    let headlines = news.fetch_headlines(&args.company, limit).await?;

    let aggregator = SentimentAggregator::new(VaderModel::new());

    println!("\n📰 {} ({} headlines)\n", args.company, headlines.len());
    for headline in &headlines {
        println!(
            "  {:>7.3}  {}",
            aggregator.model().compound_score(headline),
            headline
        );
    }

    println!("\n📊 Aggregate score: {:.3}", aggregator.score(&headlines));

    Ok(())
}
