// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod risk;
pub mod sentiment;
pub mod strategy;

// Re-export commonly used types
pub use api::{Broker, NewsSource};
pub use config::Settings;
pub use error::{BrokerError, FetchError, OrderError, SettingsError, TickerError};
pub use models::*;
