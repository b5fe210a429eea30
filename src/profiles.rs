use std::sync::Arc;

use crate::balance::moralis::MoralisBalanceSource;
use crate::balance::solana::SolanaRpcBalanceSource;
use crate::chain::Chain;
use crate::config::Config;
use crate::engine::ValuationEngine;
use crate::metadata::{NullMetadataResolver, TokenListResolver};
use crate::price::coingecko::CoinGeckoPriceSource;
use crate::price::dexscreener::DexScreenerPriceSource;
use crate::price::jupiter::JupiterPriceSource;

/// Wire up the valuation engine for a chain. Both chains run the same
/// pipeline; only the source/oracle/resolver implementations differ.
pub fn engine_for(chain: Chain, config: &Config) -> ValuationEngine {
    match chain {
        Chain::Evm => ValuationEngine::new(
            Arc::new(MoralisBalanceSource::new(config)),
            Arc::new(CoinGeckoPriceSource::new(
                config,
                "ethereum",
                config.eth_fallback_price_usd,
            )),
            Arc::new(DexScreenerPriceSource::new(config)),
            Arc::new(NullMetadataResolver),
            config.materiality_threshold_usd,
        ),
        Chain::Solana => ValuationEngine::new(
            Arc::new(SolanaRpcBalanceSource::new(config)),
            Arc::new(CoinGeckoPriceSource::new(
                config,
                "solana",
                config.sol_fallback_price_usd,
            )),
            Arc::new(JupiterPriceSource::new(config)),
            Arc::new(TokenListResolver::new(config)),
            config.materiality_threshold_usd,
        ),
    }
}
