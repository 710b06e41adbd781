//! Starting market for a session.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::simulator::next_price;
use crate::types::{Asset, AssetKind, PriceHistory, PricePoint, HISTORY_CAPACITY};

/// Back-fill a full history window ending just before `now`, one sample per
/// minute, walking from `base_price`.
pub fn backfill_history<R: Rng + ?Sized>(
    base_price: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> PriceHistory {
    let mut price = base_price;
    (0..HISTORY_CAPACITY)
        .map(|i| {
            price = next_price(price, rng);
            let minutes_ago = (HISTORY_CAPACITY - i) as i64;
            PricePoint::new(now - Duration::minutes(minutes_ago), price)
        })
        .collect()
}

/// The stocks and commodities quoted at session start.
pub fn initial_market<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<Asset> {
    let stocks = [
        ("AAPL", "Apple Inc.", 172.45, 1.25, 0.73, "2.8T", "52M"),
        ("GOOGL", "Alphabet Inc.", 2854.32, -12.55, -0.44, "1.9T", "1.2M"),
        ("MSFT", "Microsoft Corp.", 304.87, 2.10, 0.69, "2.3T", "25M"),
        ("AMZN", "Amazon.com, Inc.", 3412.98, 25.43, 0.75, "1.7T", "2.8M"),
        ("TSLA", "Tesla, Inc.", 780.59, -15.21, -1.91, "780B", "30M"),
        ("NVDA", "NVIDIA Corp.", 220.15, 5.67, 2.64, "550B", "45M"),
    ];
    let commodities = [
        ("XAUUSD", "Gold", 2350.55, 15.30, 0.65, "per troy ounce"),
        ("XAGUSD", "Silver", 28.75, -0.25, -0.86, "per troy ounce"),
        ("WTI", "Crude Oil", 85.43, 1.12, 1.33, "per barrel"),
    ];

    let mut assets = Vec::with_capacity(stocks.len() + commodities.len());

    for (ticker, name, price, change, pct, cap, volume) in stocks {
        assets.push(
            Asset::new(ticker, name, price, AssetKind::stock(cap, volume))
                .with_change(change, pct)
                .with_history(backfill_history(price, now, rng)),
        );
    }
    for (ticker, name, price, change, pct, unit) in commodities {
        assets.push(
            Asset::new(ticker, name, price, AssetKind::commodity(unit))
                .with_change(change, pct)
                .with_history(backfill_history(price, now, rng)),
        );
    }

    assets
}
