//! Mark-to-market valuation of a portfolio.

use crate::feed::price_of;
use crate::types::{Asset, Holding, Portfolio};
use serde::{Deserialize, Serialize};

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Valuation {
    /// Market value of holdings plus cash
    pub total_value: f64,
    /// Unrealized gain/loss in dollars
    pub total_pnl: f64,
    /// Unrealized gain/loss as a percentage of cost basis
    pub total_pnl_percent: f64,
}

/// Compute total value and unrealized P&L.
///
/// Holdings whose ticker the feed does not quote are valued at their average
/// cost, so they contribute no P&L.
pub fn compute_valuation(portfolio: &Portfolio, assets: &[Asset]) -> Valuation {
    let holdings_value: f64 = portfolio
        .holdings
        .iter()
        .map(|h| h.quantity * mark_price(h, assets))
        .sum();
    let total_cost = portfolio.total_cost();
    let total_pnl = holdings_value - total_cost;

    Valuation {
        total_value: holdings_value + portfolio.cash,
        total_pnl,
        total_pnl_percent: percent_of(total_pnl, total_cost),
    }
}

fn mark_price(holding: &Holding, assets: &[Asset]) -> f64 {
    price_of(&holding.ticker, assets).unwrap_or(holding.average_cost)
}

fn percent_of(amount: f64, base: f64) -> f64 {
    if base > 0.0 {
        (amount / base) * 100.0
    } else {
        0.0
    }
}

/// One row of the holdings table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingValuation {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: f64,
    /// Feed price, or the average cost when unquoted
    pub current_price: f64,
    /// True when `current_price` fell back to the average cost
    pub price_is_fallback: bool,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_percent: f64,
}

impl HoldingValuation {
    /// Value a single holding against the feed.
    pub fn new(holding: &Holding, assets: &[Asset]) -> Self {
        let quoted = price_of(&holding.ticker, assets);
        let current_price = quoted.unwrap_or(holding.average_cost);
        let market_value = holding.quantity * current_price;
        let total_cost = holding.total_cost();
        let unrealized_pnl = market_value - total_cost;

        Self {
            ticker: holding.ticker.clone(),
            quantity: holding.quantity,
            average_cost: holding.average_cost,
            current_price,
            price_is_fallback: quoted.is_none(),
            market_value,
            unrealized_pnl,
            unrealized_pnl_percent: percent_of(unrealized_pnl, total_cost),
        }
    }
}

/// Full valuation report: headline numbers plus per-holding detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    #[serde(flatten)]
    pub summary: Valuation,
    pub cash: f64,
    /// Total cost basis of all holdings
    pub total_cost: f64,
    /// Market value of holdings only
    pub holdings_value: f64,
    pub holdings: Vec<HoldingValuation>,
    pub holdings_in_profit: usize,
    pub holdings_in_loss: usize,
}

impl ValuationReport {
    /// Build the report for a portfolio against the current feed.
    pub fn new(portfolio: &Portfolio, assets: &[Asset]) -> Self {
        let holdings: Vec<HoldingValuation> = portfolio
            .holdings
            .iter()
            .map(|h| HoldingValuation::new(h, assets))
            .collect();

        let holdings_in_profit = holdings.iter().filter(|h| h.unrealized_pnl > 0.0).count();
        let holdings_in_loss = holdings.iter().filter(|h| h.unrealized_pnl < 0.0).count();

        Self {
            summary: compute_valuation(portfolio, assets),
            cash: portfolio.cash,
            total_cost: portfolio.total_cost(),
            holdings_value: holdings.iter().map(|h| h.market_value).sum(),
            holdings,
            holdings_in_profit,
            holdings_in_loss,
        }
    }

    /// Share of total value held in each holding, as a fraction.
    pub fn weights(&self) -> Vec<(String, f64)> {
        let total_value = self.summary.total_value;
        if total_value <= 0.0 {
            return Vec::new();
        }

        self.holdings
            .iter()
            .map(|h| (h.ticker.clone(), h.market_value / total_value))
            .collect()
    }

    /// Share of total value held as cash, as a fraction.
    pub fn cash_weight(&self) -> f64 {
        if self.summary.total_value <= 0.0 {
            return 0.0;
        }
        self.cash / self.summary.total_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetKind;
    use approx::assert_relative_eq;

    fn feed() -> Vec<Asset> {
        vec![
            Asset::new("AAPL", "Apple Inc.", 175.0, AssetKind::stock("2.8T", "52M")),
            Asset::new("GOOGL", "Alphabet Inc.", 90.0, AssetKind::stock("1.9T", "1.2M")),
        ]
    }

    fn two_holdings() -> Portfolio {
        let mut portfolio = Portfolio::with_cash(1000.0);
        portfolio.holdings.push(Holding::new("AAPL", 10.0, 150.0));
        portfolio.holdings.push(Holding::new("GOOGL", 5.0, 100.0));
        portfolio
    }

    #[test]
    fn test_empty_portfolio() {
        let valuation = compute_valuation(&Portfolio::with_cash(5000.0), &feed());

        assert_eq!(valuation.total_value, 5000.0);
        assert_eq!(valuation.total_pnl, 0.0);
        assert_eq!(valuation.total_pnl_percent, 0.0);
    }

    #[test]
    fn test_valuation() {
        let valuation = compute_valuation(&two_holdings(), &feed());

        assert_eq!(valuation.total_value, 3200.0); // 1750 + 450 + 1000 cash
        assert_eq!(valuation.total_pnl, 200.0); // (1750 - 1500) + (450 - 500)
        assert_relative_eq!(valuation.total_pnl_percent, 10.0); // 200 / 2000
    }

    #[test]
    fn test_unquoted_holding_is_flat() {
        let mut portfolio = Portfolio::with_cash(0.0);
        portfolio.holdings.push(Holding::new("DELISTED", 4.0, 25.0));

        let valuation = compute_valuation(&portfolio, &feed());
        assert_eq!(valuation.total_value, 100.0);
        assert_eq!(valuation.total_pnl, 0.0);

        let row = HoldingValuation::new(&portfolio.holdings[0], &feed());
        assert!(row.price_is_fallback);
        assert_eq!(row.current_price, 25.0);
    }

    #[test]
    fn test_valuation_does_not_mutate() {
        let portfolio = two_holdings();
        let assets = feed();
        let _ = compute_valuation(&portfolio, &assets);
        let _ = ValuationReport::new(&portfolio, &assets);

        assert_eq!(portfolio, two_holdings());
        assert_eq!(assets, feed());
    }

    #[test]
    fn test_report_breakdown() {
        let report = ValuationReport::new(&two_holdings(), &feed());

        assert_eq!(report.total_cost, 2000.0);
        assert_eq!(report.holdings_value, 2200.0);
        assert_eq!(report.holdings_in_profit, 1); // AAPL
        assert_eq!(report.holdings_in_loss, 1); // GOOGL

        let apple = &report.holdings[0];
        assert_eq!(apple.market_value, 1750.0);
        assert_eq!(apple.unrealized_pnl, 250.0);
        // 250 / 1500 = 16.67%
        assert_relative_eq!(apple.unrealized_pnl_percent, 16.666666666666668, epsilon = 1e-9);
    }

    #[test]
    fn test_weights() {
        let mut portfolio = Portfolio::with_cash(0.0);
        portfolio.holdings.push(Holding::new("AAPL", 10.0, 100.0));
        portfolio.holdings.push(Holding::new("GOOGL", 10.0, 100.0));
        let assets = vec![
            Asset::new("AAPL", "Apple Inc.", 100.0, AssetKind::stock("2.8T", "52M")),
            Asset::new("GOOGL", "Alphabet Inc.", 100.0, AssetKind::stock("1.9T", "1.2M")),
        ];

        let report = ValuationReport::new(&portfolio, &assets);
        let weights = report.weights();

        assert_eq!(weights.len(), 2);
        assert_relative_eq!(weights[0].1, 0.5); // 50% each
        assert_relative_eq!(weights[1].1, 0.5);
        assert_eq!(report.cash_weight(), 0.0);
    }
}
