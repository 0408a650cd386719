use std::time::Duration;
use thiserror::Error;

/// News retrieval failed. The ticker is skipped, the cycle continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("news request for {query} failed with HTTP {status}")]
    Status { query: String, status: u16 },
    #[error("news transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed news feed: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Account, position or price lookup failed.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker {endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },
    #[error("broker transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unparseable broker field {field}: {value:?}")]
    Parse { field: &'static str, value: String },
}

/// Order submission failed.
///
/// `Rejected` and `Transport` mean nothing was invested. `Unconfirmed` means
/// the request left this process but no usable acknowledgement came back, so
/// the order may have been accepted.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order for {symbol} rejected with HTTP {status}: {message}")]
    Rejected {
        symbol: String,
        status: u16,
        message: String,
    },
    #[error("order for {symbol} never reached the broker: {source}")]
    Transport {
        symbol: String,
        source: reqwest::Error,
    },
    #[error("order for {symbol} sent but not confirmed: {reason}")]
    Unconfirmed { symbol: String, reason: String },
}

impl OrderError {
    pub fn may_have_filled(&self) -> bool {
        matches!(self, OrderError::Unconfirmed { .. })
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Everything that can go wrong while processing a single ticker.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl TickerError {
    /// The broker may have executed an order whose result never arrived
    pub fn may_have_filled(&self) -> bool {
        match self {
            TickerError::Order(e) => e.may_have_filled(),
            TickerError::Timeout { operation, .. } => *operation == ORDER_SUBMISSION,
            _ => false,
        }
    }
}

pub(crate) const ORDER_SUBMISSION: &str = "order submission";
