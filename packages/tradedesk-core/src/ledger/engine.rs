//! Trade execution against a portfolio snapshot.

use crate::feed::price_of;
use crate::types::{Asset, Holding, Portfolio, Trade, TradeOrder, TradeSide};
use serde::Serialize;

/// Why an order was not applied. The portfolio is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum TradeRejection {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Insufficient funds. Need ${required:.2}, have ${available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Cannot sell {requested} of {ticker}, only have {held}")]
    InsufficientShares {
        ticker: String,
        requested: f64,
        held: f64,
    },

    #[error("No holding for {0}")]
    NoSuchHolding(String),
}

/// Check order preconditions without looking at any portfolio.
pub fn validate_order(order: &TradeOrder) -> Result<(), TradeRejection> {
    if order.ticker.trim().is_empty() {
        return Err(TradeRejection::InvalidOrder(
            "ticker must not be empty".to_string(),
        ));
    }
    if !order.quantity.is_finite() || order.quantity <= 0.0 {
        return Err(TradeRejection::InvalidOrder(format!(
            "quantity must be positive, got {}",
            order.quantity
        )));
    }
    if !order.price.is_finite() || order.price <= 0.0 {
        return Err(TradeRejection::InvalidOrder(format!(
            "price must be positive, got {}",
            order.price
        )));
    }
    Ok(())
}

/// Apply an order and return the resulting portfolio.
///
/// Buys merge into an existing holding with cost averaging:
/// - New quantity = old quantity + bought quantity
/// - New avg cost = (old_qty * old_cost + qty * price) / new_qty
///
/// Sells credit `quantity * price` and keep the average cost of what remains.
/// A holding sold down to exactly zero is removed.
pub fn apply_trade(portfolio: &Portfolio, order: &TradeOrder) -> Result<Portfolio, TradeRejection> {
    execute_order(portfolio, order).map(|(next, _)| next)
}

/// Like [`apply_trade`], also returning the executed [`Trade`] record.
pub fn execute_order(
    portfolio: &Portfolio,
    order: &TradeOrder,
) -> Result<(Portfolio, Trade), TradeRejection> {
    validate_order(order)?;

    match order.side {
        TradeSide::Buy => buy(portfolio, order),
        TradeSide::Sell => sell(portfolio, order),
    }
}

fn buy(portfolio: &Portfolio, order: &TradeOrder) -> Result<(Portfolio, Trade), TradeRejection> {
    let cost = order.value();
    if portfolio.cash < cost {
        return Err(TradeRejection::InsufficientFunds {
            required: cost,
            available: portfolio.cash,
        });
    }

    let ticker = order.ticker.trim().to_uppercase();
    let mut next = portfolio.clone();
    next.cash -= cost;

    if let Some(holding) = next.holdings.iter_mut().find(|h| h.ticker == ticker) {
        let total_quantity = holding.quantity + order.quantity;
        holding.average_cost = (holding.total_cost() + cost) / total_quantity;
        holding.quantity = total_quantity;
    } else {
        next.holdings
            .push(Holding::new(&ticker, order.quantity, order.price));
    }

    Ok((next, Trade::from_order(order)))
}

fn sell(portfolio: &Portfolio, order: &TradeOrder) -> Result<(Portfolio, Trade), TradeRejection> {
    let ticker = order.ticker.trim().to_uppercase();

    let idx = portfolio
        .holdings
        .iter()
        .position(|h| h.ticker == ticker)
        .ok_or_else(|| TradeRejection::NoSuchHolding(ticker.clone()))?;

    let held = &portfolio.holdings[idx];
    if held.quantity < order.quantity {
        return Err(TradeRejection::InsufficientShares {
            ticker,
            requested: order.quantity,
            held: held.quantity,
        });
    }

    let proceeds = order.value();
    let pnl = proceeds - order.quantity * held.average_cost;
    let remaining = held.quantity - order.quantity;

    let mut next = portfolio.clone();
    next.cash += proceeds;
    if remaining == 0.0 {
        next.holdings.remove(idx);
    } else {
        next.holdings[idx].quantity = remaining;
    }

    Ok((next, Trade::from_order(order).with_pnl(pnl)))
}

/// Price an order at the feed's current quote for `ticker`.
///
/// The returned order is what the trade panel previews and then submits;
/// its [`TradeOrder::value`] is the estimated cost.
pub fn quote(
    ticker: &str,
    quantity: f64,
    side: TradeSide,
    assets: &[Asset],
) -> Result<TradeOrder, TradeRejection> {
    let price = price_of(ticker, assets).ok_or_else(|| {
        TradeRejection::InvalidOrder(format!("no price quoted for '{}'", ticker.trim()))
    })?;
    Ok(TradeOrder::new(ticker, quantity, price, side))
}

/// Estimated cash needed (or received) for `quantity` units at `price`.
pub fn estimated_cost(quantity: f64, price: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity * price
    } else {
        0.0
    }
}
