use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::TokenPriceOracle;
use crate::config::Config;
use crate::model::TokenQuote;

/// Token-level price feed backed by the DexScreener token endpoint, keyed by
/// contract address. The first listed pair supplies the unit price; its FDV
/// stands in for market cap.
#[derive(Debug, Clone)]
pub struct DexScreenerPriceSource {
    http_client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<PairEntry>>,
}

#[derive(Debug, Deserialize)]
struct PairEntry {
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    fdv: Option<f64>,
}

impl DexScreenerPriceSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: config.http_client.clone(),
            base_url: config.dexscreener_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_quote(&self, asset_id: &str) -> Option<TokenQuote> {
        let url = Url::parse(&format!("{}/{}", self.base_url, asset_id)).ok()?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        let body: TokenPairsResponse = response.json().await.ok()?;

        // No listed pair means no price, not a zero price
        let pair = body.pairs?.into_iter().next()?;
        let unit_price_usd = Decimal::from_str(pair.price_usd?.as_str()).ok()?;
        let market_cap_usd = pair.fdv.and_then(Decimal::from_f64);
        Some(TokenQuote {
            unit_price_usd,
            market_cap_usd,
        })
    }
}

#[async_trait]
impl TokenPriceOracle for DexScreenerPriceSource {
    #[instrument(skip(self))]
    async fn token_quote(&self, asset_id: &str) -> Option<TokenQuote> {
        match self.fetch_quote(asset_id).await {
            Some(quote) => {
                debug!(price = %quote.unit_price_usd, "Retrieved token quote");
                Some(quote)
            }
            None => {
                warn!(asset_id, "Token price unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "0xaaa0000000000000000000000000000000000001";

    fn source_for(server: &MockServer) -> DexScreenerPriceSource {
        DexScreenerPriceSource {
            http_client: Client::new(),
            base_url: server.uri(),
        }
    }

    #[tokio::test]
    async fn takes_price_and_fdv_from_first_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pairs": [
                    { "priceUsd": "0.00003456", "fdv": 1234567.0 },
                    { "priceUsd": "0.00009999", "fdv": 1.0 }
                ]
            })))
            .mount(&server)
            .await;

        let quote = source_for(&server).token_quote(TOKEN).await.unwrap();
        assert_eq!(quote.unit_price_usd, dec!(0.00003456));
        assert_eq!(quote.market_cap_usd, Some(dec!(1234567)));
    }

    #[tokio::test]
    async fn empty_pair_list_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{TOKEN}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "pairs": [] })),
            )
            .mount(&server)
            .await;

        assert!(source_for(&server).token_quote(TOKEN).await.is_none());
    }

    #[tokio::test]
    async fn request_failure_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{TOKEN}")))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert!(source_for(&server).token_quote(TOKEN).await.is_none());
    }
}
