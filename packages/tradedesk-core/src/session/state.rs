//! Trading session state.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::assistant::PortfolioSnapshot;
use crate::config::DashboardConfig;
use crate::feed::{self, find_asset};
use crate::ledger::{execute_order, quote, TradeRejection};
use crate::types::{Asset, Portfolio, Trade, TradeOrder, TradeSide};
use crate::valuation::{compute_valuation, Valuation, ValuationReport};

/// Everything one trader's dashboard shows: portfolio, quoted assets and the
/// trades executed so far. Lives for the process; nothing is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct TradingSession {
    /// Session identifier
    pub id: Uuid,
    portfolio: Portfolio,
    assets: Vec<Asset>,
    trades: Vec<Trade>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the portfolio or feed last changed
    pub updated_at: DateTime<Utc>,
}

impl TradingSession {
    /// Create a session over an explicit portfolio and asset set.
    pub fn from_parts(portfolio: Portfolio, assets: Vec<Asset>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            portfolio,
            assets,
            trades: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }

    /// Create the standard starting session: seeded holdings and market.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_parts(Portfolio::seeded(), feed::initial_market(Utc::now(), rng))
    }

    /// Create a seeded session with the cash from `config`.
    pub fn from_config<R: Rng + ?Sized>(config: &DashboardConfig, rng: &mut R) -> Self {
        let mut session = Self::seeded(rng);
        session.portfolio.cash = config.starting_cash;
        session
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Trades executed in this session, oldest first.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Find a quoted asset by ticker.
    pub fn asset(&self, ticker: &str) -> Option<&Asset> {
        find_asset(ticker, &self.assets)
    }

    /// Apply an order. On rejection the portfolio is left exactly as it was.
    pub fn execute(&mut self, order: &TradeOrder) -> Result<Trade, TradeRejection> {
        match execute_order(&self.portfolio, order) {
            Ok((portfolio, trade)) => {
                tracing::info!(
                    "Executed {} {} {} @ {:.2}",
                    trade.side,
                    trade.quantity,
                    trade.ticker,
                    trade.price
                );
                self.portfolio = portfolio;
                self.trades.push(trade.clone());
                self.updated_at = Utc::now();
                Ok(trade)
            }
            Err(rejection) => {
                tracing::warn!("Rejected {} {}: {}", order.side, order.ticker, rejection);
                Err(rejection)
            }
        }
    }

    /// Apply an order at the asset's current feed price.
    pub fn market_order(
        &mut self,
        ticker: &str,
        quantity: f64,
        side: TradeSide,
    ) -> Result<Trade, TradeRejection> {
        let order = quote(ticker, quantity, side, &self.assets)?;
        self.execute(&order)
    }

    /// Advance the feed by one tick.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) {
        self.assets = feed::tick(&self.assets, rng, now);
        self.updated_at = now;
        tracing::debug!("Feed ticked {} assets", self.assets.len());
    }

    pub fn valuation(&self) -> Valuation {
        compute_valuation(&self.portfolio, &self.assets)
    }

    pub fn report(&self) -> ValuationReport {
        ValuationReport::new(&self.portfolio, &self.assets)
    }

    /// Read-only view handed to the assistant.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot::from(&self.portfolio)
    }
}

/// A session shared between the feed task and trade submitters.
///
/// Every mutation happens under one lock, so a trade and a tick never
/// interleave and concurrent trades cannot lose each other's updates.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<TradingSession>>,
}

impl SharedSession {
    pub fn new(session: TradingSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TradingSession> {
        // Mutations replace whole values, so a poisoned session is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn execute(&self, order: &TradeOrder) -> Result<Trade, TradeRejection> {
        self.lock().execute(order)
    }

    pub fn market_order(
        &self,
        ticker: &str,
        quantity: f64,
        side: TradeSide,
    ) -> Result<Trade, TradeRejection> {
        self.lock().market_order(ticker, quantity, side)
    }

    /// Advance the feed and return the new asset snapshot.
    pub fn advance<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Asset> {
        let mut session = self.lock();
        session.advance(rng, now);
        session.assets.clone()
    }

    pub fn portfolio(&self) -> Portfolio {
        self.lock().portfolio.clone()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.lock().assets.clone()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.lock().trades.clone()
    }

    pub fn valuation(&self) -> Valuation {
        self.lock().valuation()
    }

    pub fn report(&self) -> ValuationReport {
        self.lock().report()
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        self.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HISTORY_CAPACITY;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::thread;

    fn session() -> TradingSession {
        TradingSession::seeded(&mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_seeded_session() {
        let session = session();

        assert_eq!(session.portfolio().cash, 100_000.0);
        assert_eq!(session.portfolio().holding_count(), 3);
        assert_eq!(session.assets().len(), 9);
        assert!(session.trades().is_empty());
        assert!(session
            .assets()
            .iter()
            .all(|a| a.history.len() == HISTORY_CAPACITY));
    }

    #[test]
    fn test_from_config_sets_cash() {
        let config = DashboardConfig {
            starting_cash: 500.0,
            ..Default::default()
        };
        let session = TradingSession::from_config(&config, &mut StdRng::seed_from_u64(2));
        assert_eq!(session.portfolio().cash, 500.0);
    }

    #[test]
    fn test_execute_records_trade() {
        let mut session = session();
        let trade = session.execute(&TradeOrder::buy("MSFT", 2.0, 300.0)).unwrap();

        assert_eq!(trade.ticker, "MSFT");
        assert_eq!(session.trades().len(), 1);
        assert_eq!(session.portfolio().cash, 99_400.0);
    }

    #[test]
    fn test_rejection_keeps_state() {
        let mut session = session();
        let before = session.portfolio().clone();

        let result = session.execute(&TradeOrder::sell("AAPL", 50.0, 170.0));

        assert!(matches!(result, Err(TradeRejection::InsufficientShares { .. })));
        assert_eq!(session.portfolio(), &before);
        assert!(session.trades().is_empty());
    }

    #[test]
    fn test_market_order_uses_feed_price() {
        let mut session = session();
        let price = session.asset("NVDA").unwrap().price;

        let trade = session.market_order("nvda", 1.0, TradeSide::Buy).unwrap();
        assert_eq!(trade.price, price);

        let unknown = session.market_order("ZZZZ", 1.0, TradeSide::Buy);
        assert!(matches!(unknown, Err(TradeRejection::InvalidOrder(_))));
    }

    #[test]
    fn test_advance_leaves_portfolio_alone() {
        let mut session = session();
        let before = session.portfolio().clone();
        let old_prices: Vec<f64> = session.assets().iter().map(|a| a.price).collect();

        session.advance(&mut StdRng::seed_from_u64(4), Utc::now());

        assert_eq!(session.portfolio(), &before);
        let new_prices: Vec<f64> = session.assets().iter().map(|a| a.price).collect();
        assert_ne!(old_prices, new_prices);
    }

    #[test]
    fn test_snapshot_matches_portfolio() {
        let session = session();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.cash, session.portfolio().cash);
        assert_eq!(snapshot.holdings, session.portfolio().holdings);
    }

    #[test]
    fn test_concurrent_trades_are_not_lost() {
        let shared = SharedSession::new(TradingSession::from_parts(
            Portfolio::with_cash(10_000.0),
            Vec::new(),
        ));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared.execute(&TradeOrder::buy("WTI", 1.0, 1.0)).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let portfolio = shared.portfolio();
        assert_eq!(portfolio.quantity_of("WTI"), 200.0);
        assert_eq!(portfolio.cash, 9_800.0);
        assert_eq!(shared.trades().len(), 200);
    }
}
