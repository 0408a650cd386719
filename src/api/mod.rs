pub mod alpaca;
pub mod google_news;

pub use alpaca::AlpacaClient;
pub use google_news::GoogleNewsClient;

use crate::error::{BrokerError, FetchError, OrderError};
use crate::models::{OrderConfirmation, OrderIntent, PortfolioSnapshot, PositionSnapshot};
use async_trait::async_trait;

/// Source of recent headlines for a company
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_headlines(&self, company: &str, limit: usize) -> Result<Vec<String>, FetchError>;
}

/// Brokerage account, market data and order entry
#[async_trait]
pub trait Broker: Send + Sync {
    async fn get_account(&self) -> Result<PortfolioSnapshot, BrokerError>;

    /// `Ok(None)` when nothing is held in `symbol`
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, BrokerError>;

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, BrokerError>;

    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderConfirmation, OrderError>;
}
