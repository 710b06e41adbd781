//! Portfolio valuation.
//!
//! Query-only: everything here reads a portfolio and an asset snapshot and
//! returns numbers without touching either.

mod reporter;

pub use reporter::{compute_valuation, HoldingValuation, Valuation, ValuationReport};
