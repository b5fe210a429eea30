use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::balance::ChainBalanceSource;
use crate::chain::Chain;
use crate::error::ValuationError;
use crate::metadata::{placeholder_name, TokenMetadata, TokenMetadataResolver};
use crate::model::{Holding, PortfolioResult, TokenBalance};
use crate::price::{NativePriceOracle, TokenPriceOracle};

/// The valuation aggregator: merges balances, prices, and metadata for one
/// wallet into an ordered, filtered portfolio.
///
/// The engine is chain-agnostic; the EVM and Solana pipelines are two
/// wirings of the same capability set. Each `valuate` call is independent
/// and stateless, so identical upstream data always produces an identical
/// result.
pub struct ValuationEngine {
    balance_source: Arc<dyn ChainBalanceSource>,
    native_oracle: Arc<dyn NativePriceOracle>,
    token_oracle: Arc<dyn TokenPriceOracle>,
    metadata_resolver: Arc<dyn TokenMetadataResolver>,
    materiality_threshold_usd: Decimal,
}

impl ValuationEngine {
    pub fn new(
        balance_source: Arc<dyn ChainBalanceSource>,
        native_oracle: Arc<dyn NativePriceOracle>,
        token_oracle: Arc<dyn TokenPriceOracle>,
        metadata_resolver: Arc<dyn TokenMetadataResolver>,
        materiality_threshold_usd: Decimal,
    ) -> Self {
        Self {
            balance_source,
            native_oracle,
            token_oracle,
            metadata_resolver,
            materiality_threshold_usd,
        }
    }

    /// Value every asset the wallet holds.
    ///
    /// Fails only for a malformed address or a completely unreachable
    /// balance source; per-asset gaps (missing price, unknown metadata)
    /// degrade to partial data on that holding.
    #[instrument(skip(self), fields(chain = %self.balance_source.chain()))]
    pub async fn valuate(&self, address: &str) -> Result<PortfolioResult, ValuationError> {
        self.balance_source.validate_address(address)?;

        let (native, tokens) = tokio::join!(
            self.balance_source.fetch_native_balance(address),
            self.balance_source.fetch_token_balances(address),
        );
        let (native_balance, token_balances) = match (native, tokens) {
            (Err(native_err), Err(token_err)) => {
                return Err(ValuationError::BalanceSourceUnavailable {
                    reason: format!("native fetch: {native_err}; token fetch: {token_err}"),
                });
            }
            (native, tokens) => {
                let native_balance = match native {
                    Ok(balance) => Some(balance),
                    Err(err) => {
                        warn!(error = %err, "Native balance unavailable, treating as absent");
                        None
                    }
                };
                let token_balances = match tokens {
                    Ok(balances) => balances,
                    Err(err) => {
                        warn!(error = %err, "Token balances unavailable, treating as empty");
                        Vec::new()
                    }
                };
                (native_balance, token_balances)
            }
        };

        // All remaining lookups are mutually independent once the asset ids
        // are known; fan them out and join before assembly.
        let asset_ids: Vec<String> = token_balances
            .iter()
            .map(|token| token.asset_id.clone())
            .collect();
        let (native_price, quotes, resolved) = tokio::join!(
            self.native_oracle.native_price_usd(),
            join_all(
                asset_ids
                    .iter()
                    .map(|asset_id| self.token_oracle.token_quote(asset_id))
            ),
            self.metadata_resolver.resolve(&asset_ids),
        );

        let chain = self.balance_source.chain();
        let mut holdings = Vec::new();

        if let Some(balance) = native_balance.filter(|balance| *balance > Decimal::ZERO) {
            let value = balance * native_price;
            if value > self.materiality_threshold_usd {
                holdings.push(Holding {
                    display_name: chain.native_display_name().to_string(),
                    asset_id: chain.native_asset_id().to_string(),
                    raw_balance: balance,
                    unit_price_usd: Some(native_price),
                    market_cap_usd: None,
                    dollar_value: Some(value),
                });
            }
        }

        for (token, quote) in token_balances.into_iter().zip(quotes) {
            let display_name = display_name_for(chain, &token, &resolved);
            match quote {
                Some(quote) => {
                    let value = token.raw_balance * quote.unit_price_usd;
                    if value > self.materiality_threshold_usd {
                        holdings.push(Holding {
                            display_name,
                            asset_id: token.asset_id,
                            raw_balance: token.raw_balance,
                            unit_price_usd: Some(quote.unit_price_usd),
                            market_cap_usd: quote.market_cap_usd,
                            dollar_value: Some(value),
                        });
                    }
                }
                // An untracked holding is still reported, with explicit
                // unknown markers and no contribution to the total
                None => holdings.push(Holding {
                    display_name,
                    asset_id: token.asset_id,
                    raw_balance: token.raw_balance,
                    unit_price_usd: None,
                    market_cap_usd: None,
                    dollar_value: None,
                }),
            }
        }

        // Stable descending sort; unknown values order as zero but stay None
        holdings.sort_by(|a, b| b.sort_value().cmp(&a.sort_value()));
        let total_value_usd: Decimal = holdings.iter().filter_map(|h| h.dollar_value).sum();

        info!(
            holdings = holdings.len(),
            total_value_usd = %total_value_usd,
            "Valuation complete"
        );
        Ok(PortfolioResult {
            holdings,
            total_value_usd,
        })
    }
}

fn display_name_for(
    chain: Chain,
    token: &TokenBalance,
    resolved: &HashMap<String, TokenMetadata>,
) -> String {
    let (name, symbol) = match (&token.name, resolved.get(&token.asset_id)) {
        (Some(name), _) => (name.clone(), token.symbol.clone()),
        (None, Some(meta)) => (
            meta.name.clone(),
            (!meta.symbol.is_empty()).then(|| meta.symbol.clone()),
        ),
        (None, None) => (placeholder_name(chain, &token.asset_id), None),
    };
    match symbol {
        Some(symbol) if !symbol.is_empty() => format!("{name} ({symbol})"),
        _ => name,
    }
}
