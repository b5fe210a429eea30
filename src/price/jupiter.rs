use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::TokenPriceOracle;
use crate::config::Config;
use crate::model::TokenQuote;

/// Token-level price feed backed by the Jupiter price API, keyed by mint
/// address. Jupiter quotes a unit price only; it carries no market cap.
#[derive(Debug, Clone)]
pub struct JupiterPriceSource {
    http_client: Client,
    price_url: String,
}

#[derive(Debug, Deserialize)]
struct JupiterPriceResponse {
    data: Option<JupiterPriceData>,
}

#[derive(Debug, Deserialize)]
struct JupiterPriceData {
    price: Option<f64>,
}

impl JupiterPriceSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: config.http_client.clone(),
            price_url: config.jupiter_price_url.clone(),
        }
    }

    async fn fetch_price(&self, asset_id: &str) -> Option<Decimal> {
        let url = Url::parse(&self.price_url).ok()?;
        let response = self
            .http_client
            .get(url)
            .query(&[("id", asset_id)])
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        let body: JupiterPriceResponse = response.json().await.ok()?;
        Decimal::from_f64(body.data?.price?)
    }
}

#[async_trait]
impl TokenPriceOracle for JupiterPriceSource {
    #[instrument(skip(self))]
    async fn token_quote(&self, asset_id: &str) -> Option<TokenQuote> {
        match self.fetch_price(asset_id).await {
            Some(unit_price_usd) => {
                debug!(price = %unit_price_usd, "Retrieved token price");
                Some(TokenQuote {
                    unit_price_usd,
                    market_cap_usd: None,
                })
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn source_for(server: &MockServer) -> JupiterPriceSource {
        JupiterPriceSource {
            http_client: Client::new(),
            price_url: server.uri(),
        }
    }

    #[tokio::test]
    async fn returns_price_without_market_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("id", MINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "id": MINT, "price": 0.0002 }
            })))
            .mount(&server)
            .await;

        let quote = source_for(&server).token_quote(MINT).await.unwrap();
        assert_eq!(quote.unit_price_usd, dec!(0.0002));
        assert_eq!(quote.market_cap_usd, None);
    }

    #[tokio::test]
    async fn missing_data_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        assert!(source_for(&server).token_quote(MINT).await.is_none());
    }
}
