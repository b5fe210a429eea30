use std::str::FromStr;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::ChainBalanceSource;
use crate::chain::Chain;
use crate::config::Config;
use crate::error::{SourceError, ValuationError};
use crate::model::TokenBalance;

/// EVM balance source backed by the Moralis deep-index REST API.
#[derive(Debug, Clone)]
pub struct MoralisBalanceSource {
    http_client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct NativeBalanceResponse {
    /// Raw wei amount as a decimal string.
    balance: String,
}

#[derive(Debug, Deserialize)]
struct Erc20BalanceEntry {
    token_address: String,
    name: Option<String>,
    symbol: Option<String>,
    decimals: u8,
    /// Raw amount in the token's smallest unit, as a decimal string.
    balance: String,
}

impl MoralisBalanceSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: config.http_client.clone(),
            base_url: config.moralis_base_url.trim_end_matches('/').to_string(),
            api_key: config.moralis_api_key.clone(),
        }
    }

    /// Convert a raw integer amount string to a Decimal in human units.
    /// Amounts can exceed u128, so go through U256 and unit formatting.
    fn units_to_decimal(raw: &str, decimals: u8) -> Decimal {
        let amount = U256::from_dec_str(raw).unwrap_or_else(|_| {
            warn!("Failed to parse raw amount: {}", raw);
            U256::zero()
        });
        let formatted = ethers::utils::format_units(amount, decimals as usize).unwrap_or_else(|_| {
            warn!("Failed to format raw amount: {}", amount);
            "0".to_string()
        });
        Decimal::from_str(&formatted).unwrap_or(Decimal::ZERO)
    }
}

#[async_trait]
impl ChainBalanceSource for MoralisBalanceSource {
    fn chain(&self) -> Chain {
        Chain::Evm
    }

    fn validate_address(&self, address: &str) -> Result<(), ValuationError> {
        if !address.starts_with("0x") || address.len() != 42 {
            return Err(ValuationError::InvalidAddress {
                address: address.to_string(),
                reason: "expected 0x followed by 40 hex characters".to_string(),
            });
        }
        Address::from_str(address).map_err(|_| ValuationError::InvalidAddress {
            address: address.to_string(),
            reason: "not valid hex".to_string(),
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_native_balance(&self, address: &str) -> Result<Decimal, SourceError> {
        let url = Url::parse(&format!("{}/{}/balance", self.base_url, address))
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        let response = self
            .http_client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let body: NativeBalanceResponse = response.json().await?;

        let balance = Self::units_to_decimal(&body.balance, self.chain().native_decimals());
        debug!(balance = %balance, "Retrieved native balance");
        Ok(balance)
    }

    #[instrument(skip(self))]
    async fn fetch_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, SourceError> {
        let url = Url::parse(&format!("{}/{}/erc20", self.base_url, address))
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        let response = self
            .http_client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let entries: Vec<Erc20BalanceEntry> = response.json().await?;

        let balances: Vec<TokenBalance> = entries
            .into_iter()
            .filter_map(|entry| {
                let raw_balance = Self::units_to_decimal(&entry.balance, entry.decimals);
                if raw_balance <= Decimal::ZERO {
                    return None;
                }
                Some(TokenBalance {
                    asset_id: entry.token_address,
                    raw_balance,
                    decimals: entry.decimals,
                    name: entry.name.filter(|n| !n.is_empty()),
                    symbol: entry.symbol.filter(|s| !s.is_empty()),
                })
            })
            .collect();
        debug!(count = balances.len(), "Retrieved token balances with non-zero amount");
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326";

    fn source_for(server: &MockServer) -> MoralisBalanceSource {
        MoralisBalanceSource {
            http_client: Client::new(),
            base_url: server.uri(),
            api_key: "test-key".to_string(),
        }
    }

    #[test]
    fn normalizes_raw_amount_by_reported_decimals() {
        assert_eq!(
            MoralisBalanceSource::units_to_decimal("123450000", 8),
            dec!(1.2345)
        );
        assert_eq!(
            MoralisBalanceSource::units_to_decimal("2500000000000000000", 18),
            dec!(2.5)
        );
    }

    #[test]
    fn unparseable_amount_becomes_zero() {
        assert_eq!(
            MoralisBalanceSource::units_to_decimal("not-a-number", 18),
            Decimal::ZERO
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        let source = MoralisBalanceSource {
            http_client: Client::new(),
            base_url: String::new(),
            api_key: String::new(),
        };
        assert!(source.validate_address(WALLET).is_ok());
        assert!(source.validate_address("0x1234").is_err());
        assert!(source.validate_address("1f9090aaE28b8a3dCeaDf281B0F12828e676c326").is_err());
        assert!(source
            .validate_address("0xZZ9090aaE28b8a3dCeaDf281B0F12828e676c326")
            .is_err());
    }

    #[tokio::test]
    async fn fetches_native_balance_in_eth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{WALLET}/balance")))
            .and(header("X-API-Key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "balance": "2500000000000000000"
                })),
            )
            .mount(&server)
            .await;

        let source = source_for(&server);
        let balance = source.fetch_native_balance(WALLET).await.unwrap();
        assert_eq!(balance, dec!(2.5));
    }

    #[tokio::test]
    async fn drops_zero_token_balances_at_the_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{WALLET}/erc20")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "token_address": "0xaaa0000000000000000000000000000000000001",
                    "name": "Alpha",
                    "symbol": "ALP",
                    "decimals": 6,
                    "balance": "1500000"
                },
                {
                    "token_address": "0xbbb0000000000000000000000000000000000002",
                    "name": "Beta",
                    "symbol": "BET",
                    "decimals": 18,
                    "balance": "0"
                }
            ])))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let balances = source.fetch_token_balances(WALLET).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset_id, "0xaaa0000000000000000000000000000000000001");
        assert_eq!(balances[0].raw_balance, dec!(1.5));
        assert_eq!(balances[0].name.as_deref(), Some("Alpha"));
    }

    #[tokio::test]
    async fn surfaces_transport_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{WALLET}/balance")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = source_for(&server);
        assert!(source.fetch_native_balance(WALLET).await.is_err());
    }
}
