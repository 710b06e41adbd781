//! Tradedesk Core - Simulated trading desk library.
//!
//! This crate provides the core functionality behind the trading dashboard:
//!
//! - **Ledger**: Buy/sell execution with average-cost-basis accounting
//! - **Price feed**: Random-walk simulation with bounded price history
//! - **Valuation**: Mark-to-market value and unrealized P&L
//! - **Session**: Per-session state and the scheduled feed ticker
//! - **Assistant**: Boundary to the text-generation collaborator
//!
//! # Example
//!
//! ```rust
//! use tradedesk_core::ledger::apply_trade;
//! use tradedesk_core::valuation::compute_valuation;
//! use tradedesk_core::{Portfolio, TradeOrder};
//!
//! let portfolio = Portfolio::with_cash(100_000.0);
//! let portfolio = apply_trade(&portfolio, &TradeOrder::buy("AAPL", 10.0, 150.0)).unwrap();
//! assert_eq!(portfolio.cash, 98_500.0);
//!
//! // No feed quotes: holdings are valued at cost
//! let valuation = compute_valuation(&portfolio, &[]);
//! assert_eq!(valuation.total_value, 100_000.0);
//! ```

pub mod assistant;
pub mod config;
pub mod feed;
pub mod ledger;
pub mod session;
pub mod types;
pub mod valuation;

// Re-export commonly used types
pub use types::{
    ApiResponse, Asset, AssetCategory, AssetKind, Holding, Portfolio, PriceHistory, PricePoint,
    Trade, TradeOrder, TradeSide, HISTORY_CAPACITY,
};

// Re-export main functionality
pub use config::{AssistantConfig, DashboardConfig};
pub use ledger::{apply_trade, TradeRejection};
pub use session::{spawn_price_feed, FeedHandle, MarketUpdate, SharedSession, TradingSession};
pub use valuation::{compute_valuation, Valuation, ValuationReport};

/// Error types for tradedesk-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Trade(#[from] TradeRejection),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Assistant unavailable: {0}")]
    Assistant(String),

    #[error("Price feed is not running")]
    FeedStopped,
}

/// Result type for tradedesk-core operations.
pub type Result<T> = std::result::Result<T, Error>;
