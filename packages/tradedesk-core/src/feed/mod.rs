//! Simulated price feed.
//!
//! - **Simulator**: pure random-walk tick over an asset snapshot
//! - **Seed**: the starting market with back-filled history

mod seed;
mod simulator;

pub use seed::{backfill_history, initial_market};
pub use simulator::{
    find_asset, next_price, price_of, tick, tick_asset, MAX_TICK_MOVE, PRICE_FLOOR,
};
