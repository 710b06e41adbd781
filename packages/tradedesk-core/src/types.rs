//! Core data types for the trading desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::feed::PRICE_FLOOR;
use crate::Error;

/// Maximum number of price samples kept per asset.
pub const HISTORY_CAPACITY: usize = 50;

/// A single (timestamp, price) sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: DateTime<Utc>, price: f64) -> Self {
        Self { time, price }
    }
}

/// Sliding window of recent prices, oldest first.
///
/// Holds at most [`HISTORY_CAPACITY`] samples; pushing onto a full window
/// evicts the oldest sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PriceHistory {
    points: VecDeque<PricePoint>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, evicting from the front once over capacity.
    pub fn push(&mut self, point: PricePoint) {
        self.points.push_back(point);
        while self.points.len() > HISTORY_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

}

impl FromIterator<PricePoint> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        let mut history = Self::new();
        for point in iter {
            history.push(point);
        }
        history
    }
}

/// Asset class tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Stock,
    Commodity,
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetCategory::Stock => f.write_str("Stock"),
            AssetCategory::Commodity => f.write_str("Commodity"),
        }
    }
}

/// Category-specific asset metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AssetKind {
    #[serde(rename_all = "camelCase")]
    Stock { market_cap: String, volume: String },
    Commodity { unit: String },
}

impl AssetKind {
    pub fn stock(market_cap: &str, volume: &str) -> Self {
        AssetKind::Stock {
            market_cap: market_cap.to_string(),
            volume: volume.to_string(),
        }
    }

    pub fn commodity(unit: &str) -> Self {
        AssetKind::Commodity {
            unit: unit.to_string(),
        }
    }

    pub fn category(&self) -> AssetCategory {
        match self {
            AssetKind::Stock { .. } => AssetCategory::Stock,
            AssetKind::Commodity { .. } => AssetCategory::Commodity,
        }
    }
}

/// A tradable instrument quoted by the price feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Ticker symbol (uppercase, unique within a feed)
    pub ticker: String,
    /// Display name
    pub name: String,
    /// Current price, never below [`PRICE_FLOOR`]
    pub price: f64,
    /// Price delta from the previous tick
    pub change: f64,
    /// Price delta from the previous tick, in percent
    pub change_percent: f64,
    /// Recent price samples
    pub history: PriceHistory,
    /// Stock or commodity metadata
    #[serde(flatten)]
    pub kind: AssetKind,
}

impl Asset {
    /// Create an asset quoted at `price`, raised to [`PRICE_FLOOR`] if lower.
    pub fn new(ticker: &str, name: &str, price: f64, kind: AssetKind) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            name: name.to_string(),
            price: price.max(PRICE_FLOOR),
            change: 0.0,
            change_percent: 0.0,
            history: PriceHistory::new(),
            kind,
        }
    }

    /// Set the last delta shown alongside the price.
    pub fn with_change(mut self, change: f64, change_percent: f64) -> Self {
        self.change = change;
        self.change_percent = change_percent;
        self
    }

    pub fn with_history(mut self, history: PriceHistory) -> Self {
        self.history = history;
        self
    }

    pub fn category(&self) -> AssetCategory {
        self.kind.category()
    }
}

/// Units of one asset owned by the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Ticker symbol (uppercase)
    pub ticker: String,
    /// Units held, always > 0
    pub quantity: f64,
    /// Weighted-average price paid per unit
    pub average_cost: f64,
}

impl Holding {
    pub fn new(ticker: &str, quantity: f64, average_cost: f64) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            quantity,
            average_cost,
        }
    }

    /// Total amount paid for the units still held.
    pub fn total_cost(&self) -> f64 {
        self.quantity * self.average_cost
    }
}

/// Cash plus holdings. At most one holding per ticker.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Portfolio {
    /// Holdings in the order they were first bought
    pub holdings: Vec<Holding>,
    /// Cash balance, never negative
    pub cash: f64,
}

impl Portfolio {
    /// Create an empty portfolio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a portfolio with initial cash and no holdings.
    pub fn with_cash(cash: f64) -> Self {
        Self {
            cash,
            ..Default::default()
        }
    }

    /// Starting state of every session.
    pub fn seeded() -> Self {
        Self {
            holdings: vec![
                Holding::new("AAPL", 10.0, 150.0),
                Holding::new("GOOGL", 5.0, 2800.0),
                Holding::new("XAUUSD", 2.0, 2300.0),
            ],
            cash: 100_000.0,
        }
    }

    /// Find a holding by ticker (case insensitive).
    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        let ticker_upper = ticker.trim().to_uppercase();
        self.holdings.iter().find(|h| h.ticker == ticker_upper)
    }

    /// Units held of `ticker`, zero when not held.
    pub fn quantity_of(&self, ticker: &str) -> f64 {
        self.holding(ticker).map(|h| h.quantity).unwrap_or(0.0)
    }

    /// Total cost basis of all holdings.
    pub fn total_cost(&self) -> f64 {
        self.holdings.iter().map(|h| h.total_cost()).sum()
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.write_str("BUY"),
            TradeSide::Sell => f.write_str("SELL"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(Error::InvalidArgument(format!(
                "unknown trade side '{other}', expected buy or sell"
            ))),
        }
    }
}

/// An order to be applied to the ledger. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeOrder {
    pub ticker: String,
    pub quantity: f64,
    /// Price per unit at execution
    pub price: f64,
    pub side: TradeSide,
}

impl TradeOrder {
    pub fn new(ticker: &str, quantity: f64, price: f64, side: TradeSide) -> Self {
        Self {
            ticker: ticker.to_string(),
            quantity,
            price,
            side,
        }
    }

    pub fn buy(ticker: &str, quantity: f64, price: f64) -> Self {
        Self::new(ticker, quantity, price, TradeSide::Buy)
    }

    pub fn sell(ticker: &str, quantity: f64, price: f64) -> Self {
        Self::new(ticker, quantity, price, TradeSide::Sell)
    }

    /// Cash moved by this order.
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}

/// An executed trade, kept in the session's trade log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: f64,
    /// Price per unit at execution
    pub price: f64,
    /// Total value of the trade
    pub value: f64,
    /// Realized P&L against the average cost (sells only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Record an executed order.
    pub fn from_order(order: &TradeOrder) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: order.ticker.trim().to_uppercase(),
            side: order.side,
            quantity: order.quantity,
            price: order.price,
            value: order.value(),
            pnl: None,
            executed_at: Utc::now(),
        }
    }

    /// Attach realized P&L to a closing trade.
    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.pnl = Some(pnl);
        self
    }
}

/// JSON envelope for front-end responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_history_evicts_oldest() {
        let start = Utc::now();
        let mut history = PriceHistory::new();
        for i in 0..(HISTORY_CAPACITY + 5) {
            history.push(PricePoint::new(start + Duration::seconds(i as i64), i as f64 + 1.0));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.first().unwrap().price, 6.0);
        assert_eq!(history.last().unwrap().price, (HISTORY_CAPACITY + 5) as f64);
    }

    #[test]
    fn test_asset_category() {
        let gold = Asset::new("xauusd", "Gold", 2350.55, AssetKind::commodity("per troy ounce"));
        assert_eq!(gold.ticker, "XAUUSD");
        assert_eq!(gold.category(), AssetCategory::Commodity);

        let apple = Asset::new("AAPL", "Apple Inc.", 172.45, AssetKind::stock("2.8T", "52M"));
        assert_eq!(apple.category(), AssetCategory::Stock);
    }

    #[test]
    fn test_asset_serializes_type_tag() {
        let apple = Asset::new("AAPL", "Apple Inc.", 172.45, AssetKind::stock("2.8T", "52M"));
        let json = serde_json::to_value(&apple).unwrap();

        assert_eq!(json["type"], "Stock");
        assert_eq!(json["marketCap"], "2.8T");
        assert_eq!(json["changePercent"], 0.0);
    }

    #[test]
    fn test_asset_price_floor() {
        let zero = Asset::new("X", "Zero", 0.0, AssetKind::commodity("unit"));
        let negative = Asset::new("Y", "Negative", -12.0, AssetKind::commodity("unit"));
        let nan = Asset::new("Z", "NaN", f64::NAN, AssetKind::commodity("unit"));

        assert_eq!(zero.price, PRICE_FLOOR);
        assert_eq!(negative.price, PRICE_FLOOR);
        assert_eq!(nan.price, PRICE_FLOOR);
    }

    #[test]
    fn test_portfolio_lookup_case_insensitive() {
        let portfolio = Portfolio::seeded();
        assert!(portfolio.holding("aapl").is_some());
        assert!(portfolio.holding(" aapl ").is_some());
        assert_eq!(portfolio.quantity_of("GOOGL"), 5.0);
        assert_eq!(portfolio.quantity_of("MSFT"), 0.0);
    }

    #[test]
    fn test_portfolio_total_cost() {
        let mut portfolio = Portfolio::new();
        portfolio.holdings.push(Holding::new("AAPL", 10.0, 150.0));
        portfolio.holdings.push(Holding::new("GOOGL", 5.0, 100.0));

        assert_eq!(portfolio.total_cost(), 2000.0); // 1500 + 500
    }

    #[test]
    fn test_trade_side_from_str() {
        assert_eq!("BUY".parse::<TradeSide>().unwrap(), TradeSide::Buy);
        assert_eq!(" sell ".parse::<TradeSide>().unwrap(), TradeSide::Sell);
        assert!(matches!("hold".parse::<TradeSide>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_trade_from_order() {
        let trade = Trade::from_order(&TradeOrder::buy("aapl", 10.0, 150.0));
        assert_eq!(trade.ticker, "AAPL");
        assert_eq!(trade.value, 1500.0);
        assert!(trade.pnl.is_none());
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
