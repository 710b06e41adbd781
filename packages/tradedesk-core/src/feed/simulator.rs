//! Random-walk price simulation.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::types::{Asset, PricePoint};

/// Largest move per tick as a fraction of the current price (±half of this).
pub const MAX_TICK_MOVE: f64 = 0.01;

/// Prices never drop below this.
pub const PRICE_FLOOR: f64 = 0.01;

/// Draw the next price of a random walk starting at `price`.
///
/// The step is `uniform(-0.5, 0.5) * price * MAX_TICK_MOVE`, floored at
/// [`PRICE_FLOOR`].
pub fn next_price<R: Rng + ?Sized>(price: f64, rng: &mut R) -> f64 {
    let delta = rng.gen_range(-0.5_f64..0.5) * price * MAX_TICK_MOVE;
    (price + delta).max(PRICE_FLOOR)
}

/// Advance one asset by a single tick.
pub fn tick_asset<R: Rng + ?Sized>(asset: &Asset, rng: &mut R, now: DateTime<Utc>) -> Asset {
    let old_price = asset.price;
    let new_price = next_price(old_price, rng);
    let change = new_price - old_price;

    let mut next = asset.clone();
    next.price = new_price;
    next.change = change;
    next.change_percent = if old_price > 0.0 {
        (change / old_price) * 100.0
    } else {
        0.0
    };
    next.history.push(PricePoint::new(now, new_price));
    next
}

/// Advance every asset by one tick, independently of each other.
pub fn tick<R: Rng + ?Sized>(assets: &[Asset], rng: &mut R, now: DateTime<Utc>) -> Vec<Asset> {
    assets.iter().map(|a| tick_asset(a, rng, now)).collect()
}

/// Find an asset by ticker (case insensitive).
pub fn find_asset<'a>(ticker: &str, assets: &'a [Asset]) -> Option<&'a Asset> {
    let ticker_upper = ticker.trim().to_uppercase();
    assets.iter().find(|a| a.ticker == ticker_upper)
}

/// Current price of `ticker`, if the feed quotes it.
pub fn price_of(ticker: &str, assets: &[Asset]) -> Option<f64> {
    find_asset(ticker, assets).map(|a| a.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetKind, HISTORY_CAPACITY};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn silver() -> Asset {
        Asset::new("XAGUSD", "Silver", 28.75, AssetKind::commodity("per troy ounce"))
    }

    #[test]
    fn test_step_is_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let next = next_price(100.0, &mut rng);
            assert!((99.5..=100.5).contains(&next), "step out of range: {next}");
        }
    }

    #[test]
    fn test_price_never_hits_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut assets = vec![Asset::new("PENNY", "Penny", PRICE_FLOOR, AssetKind::stock("1M", "1K"))];

        for _ in 0..10_000 {
            assets = tick(&assets, &mut rng, Utc::now());
            assert!(assets[0].price > 0.0);
            assert!(assets[0].price >= PRICE_FLOOR);
        }
    }

    #[test]
    fn test_tick_updates_change_and_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let before = silver();
        let now = Utc::now();
        let after = tick_asset(&before, &mut rng, now);

        assert_relative_eq!(after.change, after.price - before.price);
        assert_relative_eq!(after.change_percent, after.change / before.price * 100.0);
        assert_eq!(after.history.len(), 1);
        assert_eq!(after.history.last().unwrap().time, now);
        assert_eq!(after.history.last().unwrap().price, after.price);
        // Input snapshot untouched
        assert_eq!(before.price, 28.75);
        assert!(before.history.is_empty());
    }

    #[test]
    fn test_zero_price_ticks_to_finite_percent() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut broken = silver();
        broken.price = 0.0;

        let after = tick_asset(&broken, &mut rng, Utc::now());
        assert_eq!(after.price, PRICE_FLOOR);
        assert_eq!(after.change_percent, 0.0);
        assert!(after.change.is_finite());

        let again = tick_asset(&after, &mut rng, Utc::now());
        assert!(again.change_percent.is_finite());
    }

    #[test]
    fn test_history_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut assets = vec![silver()];
        for _ in 0..(HISTORY_CAPACITY * 3) {
            assets = tick(&assets, &mut rng, Utc::now());
        }
        assert_eq!(assets[0].history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_seeded_ticks_are_reproducible() {
        let now = Utc::now();
        let a = tick(&[silver()], &mut StdRng::seed_from_u64(99), now);
        let b = tick(&[silver()], &mut StdRng::seed_from_u64(99), now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_price_lookup() {
        let assets = vec![silver()];
        assert_eq!(price_of("xagusd", &assets), Some(28.75));
        assert_eq!(price_of("WTI", &assets), None);
    }
}
