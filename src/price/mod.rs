use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::model::TokenQuote;

pub mod coingecko;
pub mod dexscreener;
pub mod jupiter;

/// Coin-level USD price for a chain's native asset. Infallible by contract:
/// implementations fall back to a configured default price when the feed is
/// down or empty, so the native holding never silently vanishes from a
/// valuation.
#[async_trait]
pub trait NativePriceOracle: Send + Sync {
    async fn native_price_usd(&self) -> Decimal;
}

/// Per-asset USD quote keyed by contract/mint address. `None` means the
/// price is unknown; callers must surface that explicitly instead of
/// substituting zero.
#[async_trait]
pub trait TokenPriceOracle: Send + Sync {
    async fn token_quote(&self, asset_id: &str) -> Option<TokenQuote>;
}
