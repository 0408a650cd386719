use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An equity on the watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String, // Used as the news search query
}

impl WatchlistEntry {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Account state, fetched once at the start of a cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PortfolioSnapshot {
    pub cash_available: f64,
    pub total_value: f64,
}

/// Current holding in a symbol. No position is represented as quantity 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub quantity: u64,
    pub current_price: f64,
}

impl PositionSnapshot {
    pub fn flat(symbol: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: 0,
            current_price,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// A market order the engine wants placed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
}

impl OrderIntent {
    pub fn buy(symbol: impl Into<String>, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side: OrderSide::Buy,
            quantity,
        }
    }

    pub fn sell(symbol: impl Into<String>, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side: OrderSide::Sell,
            quantity,
        }
    }
}

/// Broker acknowledgement of a submitted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_position() {
        let position = PositionSnapshot::flat("AAPL", 190.0);

        assert_eq!(position.symbol, "AAPL");
        assert_eq!(position.quantity, 0);
        assert_eq!(position.current_price, 190.0);
    }

    #[test]
    fn test_order_side_wire_format() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }

    #[test]
    fn test_order_intent_constructors() {
        let buy = OrderIntent::buy("KO", 5);
        let sell = OrderIntent::sell("KO", 8);

        assert_eq!(buy.side, OrderSide::Buy);
        assert_eq!(buy.quantity, 5);
        assert_eq!(sell.side, OrderSide::Sell);
        assert_eq!(sell.symbol, "KO");
    }
}
