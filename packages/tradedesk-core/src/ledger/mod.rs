//! Cash and holdings ledger.
//!
//! Orders are applied as pure functions over a [`Portfolio`](crate::Portfolio)
//! snapshot; a rejected order leaves the caller's snapshot untouched.

mod engine;

pub use engine::{
    apply_trade, estimated_cost, execute_order, quote, validate_order, TradeRejection,
};
