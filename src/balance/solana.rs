use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use super::ChainBalanceSource;
use crate::chain::Chain;
use crate::config::Config;
use crate::error::{SourceError, ValuationError};
use crate::model::TokenBalance;

const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Solana balance source speaking JSON-RPC directly: `getBalance` for
/// lamports and `getTokenAccountsByOwner` (jsonParsed) for SPL holdings.
#[derive(Debug, Clone)]
pub struct SolanaRpcBalanceSource {
    http_client: Client,
    rpc_url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResult<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedTokenAccount {
    account: TokenAccount,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    data: TokenAccountData,
}

#[derive(Debug, Deserialize)]
struct TokenAccountData {
    parsed: ParsedAccountData,
}

#[derive(Debug, Deserialize)]
struct ParsedAccountData {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
struct TokenAccountInfo {
    mint: String,
    #[serde(rename = "tokenAmount")]
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    /// Raw amount in the mint's smallest unit, as a decimal string.
    amount: String,
    decimals: u8,
}

impl SolanaRpcBalanceSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: config.http_client.clone(),
            rpc_url: config.solana_rpc_url.clone(),
        }
    }

    async fn rpc_call<T: serde::de::DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<T, SourceError> {
        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let rpc: RpcResponse<T> = response.json().await?;
        if let Some(err) = rpc.error {
            return Err(SourceError::Malformed(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }
        rpc.result
            .ok_or_else(|| SourceError::Malformed("rpc response missing result".to_string()))
    }

    /// Normalize a raw integer amount by the mint's reported decimal count.
    fn scaled_amount(raw: &str, decimals: u8) -> Decimal {
        let Ok(amount) = raw.parse::<i128>() else {
            warn!("Failed to parse raw token amount: {}", raw);
            return Decimal::ZERO;
        };
        // Decimal supports at most 28 fractional digits
        if decimals > 28 {
            warn!(decimals, "Token decimals exceed representable scale");
            return Decimal::ZERO;
        }
        Decimal::from_i128_with_scale(amount, decimals as u32)
    }
}

#[async_trait]
impl ChainBalanceSource for SolanaRpcBalanceSource {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    fn validate_address(&self, address: &str) -> Result<(), ValuationError> {
        let decoded = bs58::decode(address)
            .into_vec()
            .map_err(|_| ValuationError::InvalidAddress {
                address: address.to_string(),
                reason: "not valid base58".to_string(),
            })?;
        if decoded.len() != 32 {
            return Err(ValuationError::InvalidAddress {
                address: address.to_string(),
                reason: "base58 payload is not a 32-byte public key".to_string(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_native_balance(&self, address: &str) -> Result<Decimal, SourceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address],
        });
        let result: RpcResult<u64> = self.rpc_call(body).await?;

        let balance = Decimal::from_i128_with_scale(
            result.value as i128,
            self.chain().native_decimals() as u32,
        );
        debug!(balance = %balance, "Retrieved SOL balance");
        Ok(balance)
    }

    #[instrument(skip(self))]
    async fn fetch_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, SourceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTokenAccountsByOwner",
            "params": [
                address,
                { "programId": SPL_TOKEN_PROGRAM_ID },
                { "encoding": "jsonParsed" }
            ],
        });
        let result: RpcResult<Vec<KeyedTokenAccount>> = self.rpc_call(body).await?;

        let balances: Vec<TokenBalance> = result
            .value
            .into_iter()
            .filter_map(|keyed| {
                let info = keyed.account.data.parsed.info;
                let raw_balance = Self::scaled_amount(&info.token_amount.amount, info.token_amount.decimals);
                if raw_balance <= Decimal::ZERO {
                    return None;
                }
                Some(TokenBalance {
                    asset_id: info.mint,
                    raw_balance,
                    decimals: info.token_amount.decimals,
                    // The RPC reports no metadata; the token-list resolver
                    // fills names in downstream.
                    name: None,
                    symbol: None,
                })
            })
            .collect();
        debug!(count = balances.len(), "Retrieved SPL token balances with non-zero amount");
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WALLET: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn source_for(server: &MockServer) -> SolanaRpcBalanceSource {
        SolanaRpcBalanceSource {
            http_client: Client::new(),
            rpc_url: server.uri(),
        }
    }

    #[test]
    fn normalizes_lamports_and_token_amounts() {
        assert_eq!(SolanaRpcBalanceSource::scaled_amount("123450000", 8), dec!(1.2345));
        assert_eq!(SolanaRpcBalanceSource::scaled_amount("2500000000", 9), dec!(2.5));
        assert_eq!(SolanaRpcBalanceSource::scaled_amount("garbage", 9), Decimal::ZERO);
    }

    #[test]
    fn rejects_malformed_addresses() {
        let source = SolanaRpcBalanceSource {
            http_client: Client::new(),
            rpc_url: String::new(),
        };
        assert!(source.validate_address(WALLET).is_ok());
        // 0/O/I/l are not base58 characters
        assert!(source.validate_address("0OIl").is_err());
        // valid base58 but too short to be a public key
        assert!(source.validate_address("abc").is_err());
    }

    #[tokio::test]
    async fn fetches_sol_balance_from_lamports() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({"method": "getBalance"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": 2500000000u64 }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let balance = source.fetch_native_balance(WALLET).await.unwrap();
        assert_eq!(balance, dec!(2.5));
    }

    #[tokio::test]
    async fn parses_token_accounts_and_drops_zero_amounts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(
                serde_json::json!({"method": "getTokenAccountsByOwner"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": [
                    { "pubkey": "acc1", "account": { "data": { "program": "spl-token", "parsed": {
                        "type": "account",
                        "info": {
                            "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                            "tokenAmount": { "amount": "500", "decimals": 2, "uiAmountString": "5" }
                        }
                    } }, "executable": false } },
                    { "pubkey": "acc2", "account": { "data": { "program": "spl-token", "parsed": {
                        "type": "account",
                        "info": {
                            "mint": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
                            "tokenAmount": { "amount": "0", "decimals": 5, "uiAmountString": "0" }
                        }
                    } }, "executable": false } }
                ] }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let balances = source.fetch_token_balances(WALLET).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset_id, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(balances[0].raw_balance, dec!(5));
        assert_eq!(balances[0].name, None);
    }

    #[tokio::test]
    async fn rpc_error_is_a_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "Invalid param" }
            })))
            .mount(&server)
            .await;

        let source = source_for(&server);
        assert!(source.fetch_native_balance(WALLET).await.is_err());
    }
}
