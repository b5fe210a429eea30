use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::NativePriceOracle;
use crate::config::Config;

/// Coin-level price feed backed by the CoinGecko simple-price endpoint.
/// Keyed by CoinGecko coin id ("ethereum", "solana"), independent of any
/// wallet. Falls back to a configured default price on any failure so the
/// native asset always values.
#[derive(Debug, Clone)]
pub struct CoinGeckoPriceSource {
    http_client: Client,
    base_url: String,
    coin_id: String,
    fallback_price_usd: Decimal,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
}

impl CoinGeckoPriceSource {
    pub fn new(config: &Config, coin_id: &str, fallback_price_usd: Decimal) -> Self {
        Self {
            http_client: config.http_client.clone(),
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            coin_id: coin_id.to_string(),
            fallback_price_usd,
        }
    }

    async fn fetch_price(&self) -> Option<Decimal> {
        let url = Url::parse(&format!("{}/simple/price", self.base_url)).ok()?;
        let response = self
            .http_client
            .get(url)
            .query(&[("ids", self.coin_id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        // A well-formed body with no matching coin is treated like a failure
        let body: HashMap<String, SimplePriceEntry> = response.json().await.ok()?;
        let usd = body.get(&self.coin_id)?.usd?;
        Decimal::from_f64(usd)
    }
}

#[async_trait]
impl NativePriceOracle for CoinGeckoPriceSource {
    #[instrument(skip(self), fields(coin_id = %self.coin_id))]
    async fn native_price_usd(&self) -> Decimal {
        match self.fetch_price().await {
            Some(price) => {
                debug!(price = %price, "Retrieved native coin price");
                price
            }
            None => {
                warn!(
                    fallback = %self.fallback_price_usd,
                    "Native coin price lookup failed, using fallback"
                );
                self.fallback_price_usd
            }
        }
    }
}
