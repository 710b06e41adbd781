//! Trading sessions.
//!
//! The front-end owns a [`TradingSession`] (or a [`SharedSession`] when it is
//! driven from several tasks) and passes it explicitly; the ledger, feed and
//! valuation functions never reach for ambient state.

mod scheduler;
mod state;

pub use scheduler::{spawn_price_feed, FeedCommand, FeedHandle, MarketUpdate};
pub use state::{SharedSession, TradingSession};
