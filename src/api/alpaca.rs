use super::Broker;
use crate::config::BrokerSettings;
use crate::error::{BrokerError, OrderError};
use crate::models::{OrderConfirmation, OrderIntent, OrderSide, PortfolioSnapshot, PositionSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

const KEY_HEADER: &str = "APCA-API-KEY-ID";
const SECRET_HEADER: &str = "APCA-API-SECRET-KEY";

/// Client for the Alpaca trading and market data APIs
///
/// Orders are always market orders, good-til-cancelled.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    trading_url: String,
    data_url: String,
    key_id: String,
    secret_key: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct AccountResponse {
    cash: String,
    portfolio_value: String,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    symbol: String,
    qty: String,
    #[serde(default)]
    current_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestTradeResponse {
    trade: TradeData,
}

#[derive(Debug, Deserialize)]
struct TradeData {
    #[serde(rename = "p")]
    price: f64,
}

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: &'static str,
    client_order_id: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    client_order_id: String,
    symbol: String,
    side: OrderSide,
    #[serde(default)]
    qty: Option<String>,
    status: String,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn parse_decimal(field: &'static str, value: &str) -> Result<f64, BrokerError> {
    value.trim().parse::<f64>().map_err(|_| BrokerError::Parse {
        field,
        value: value.to_string(),
    })
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}

/// Connection and request-building failures happen before anything is sent.
/// Anything later (timeouts, dropped connections) leaves the order in doubt.
fn send_error(symbol: &str, e: reqwest::Error) -> OrderError {
    if e.is_connect() || e.is_builder() {
        OrderError::Transport {
            symbol: symbol.to_string(),
            source: e,
        }
    } else {
        OrderError::Unconfirmed {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        }
    }
}

// ============== Implementation ==============

impl AlpacaClient {
    pub fn new(settings: &BrokerSettings, timeout: Duration) -> Result<Self, BrokerError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            trading_url: settings.trading_url.trim_end_matches('/').to_string(),
            data_url: settings.data_url.trim_end_matches('/').to_string(),
            key_id: settings.key_id.clone(),
            secret_key: settings.secret_key.clone(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(KEY_HEADER, &self.key_id)
            .header(SECRET_HEADER, &self.secret_key)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
    ) -> Result<T, BrokerError> {
        tracing::debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response.text().await.unwrap_or_default());
            return Err(BrokerError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    fn position_quantity(symbol: &str, qty: &str) -> Result<u64, BrokerError> {
        let qty = parse_decimal("qty", qty)?;

        if qty < 0.0 {
            tracing::warn!(
                "{} is held short ({}), treating as no position",
                symbol,
                qty
            );
            return Ok(0);
        }

        // Fractional shares are truncated
        Ok(qty.trunc() as u64)
    }
}

#[async_trait]
impl Broker for AlpacaClient {
    /// Endpoint: GET /v2/account
    async fn get_account(&self) -> Result<PortfolioSnapshot, BrokerError> {
        let url = format!("{}/v2/account", self.trading_url);
        let account: AccountResponse = self.get_json(&url, "account").await?;

        Ok(PortfolioSnapshot {
            cash_available: parse_decimal("cash", &account.cash)?,
            total_value: parse_decimal("portfolio_value", &account.portfolio_value)?,
        })
    }

    /// Endpoint: GET /v2/positions/{symbol}
    ///
    /// Alpaca answers 404 when nothing is held.
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionSnapshot>, BrokerError> {
        let url = format!("{}/v2/positions/{}", self.trading_url, symbol);
        tracing::debug!("GET {}", url);

        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = error_message(response.text().await.unwrap_or_default());
            return Err(BrokerError::Status {
                endpoint: format!("positions/{}", symbol),
                status: status.as_u16(),
                message,
            });
        }

        let position: PositionResponse = response.json().await?;
        let current_price = match position.current_price.as_deref() {
            Some(price) => parse_decimal("current_price", price)?,
            None => 0.0,
        };

        Ok(Some(PositionSnapshot {
            quantity: Self::position_quantity(&position.symbol, &position.qty)?,
            symbol: position.symbol,
            current_price,
        }))
    }

    /// Endpoint: GET /v2/stocks/{symbol}/trades/latest (data API)
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, BrokerError> {
        let url = format!("{}/v2/stocks/{}/trades/latest", self.data_url, symbol);
        let latest: LatestTradeResponse = self.get_json(&url, "trades/latest").await?;
        let price = latest.trade.price;

        if !price.is_finite() || price <= 0.0 {
            return Err(BrokerError::Parse {
                field: "trade.p",
                value: price.to_string(),
            });
        }

        Ok(price)
    }

    /// Endpoint: POST /v2/orders
    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderConfirmation, OrderError> {
        let url = format!("{}/v2/orders", self.trading_url);
        let body = OrderRequest {
            symbol: &intent.symbol,
            qty: intent.quantity.to_string(),
            side: intent.side,
            order_type: "market",
            time_in_force: "gtc",
            client_order_id: Uuid::new_v4().to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(&intent.symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response.text().await.unwrap_or_default());
            return Err(OrderError::Rejected {
                symbol: intent.symbol.clone(),
                status: status.as_u16(),
                message,
            });
        }

        // From here on the broker has accepted the order
        let order: OrderResponse = response.json().await.map_err(|e| OrderError::Unconfirmed {
            symbol: intent.symbol.clone(),
            reason: format!("unreadable acknowledgement: {}", e),
        })?;
        let quantity = order
            .qty
            .as_deref()
            .and_then(|q| q.parse::<f64>().ok())
            .map(|q| q as u64)
            .unwrap_or(intent.quantity);

        Ok(OrderConfirmation {
            order_id: order.id,
            client_order_id: order.client_order_id,
            symbol: order.symbol,
            side: order.side,
            quantity,
            status: order.status,
            submitted_at: order.submitted_at,
        })
    }
}
