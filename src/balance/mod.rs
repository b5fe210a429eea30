use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::chain::Chain;
use crate::error::{SourceError, ValuationError};
use crate::model::TokenBalance;

pub mod moralis;
pub mod solana;

/// Chain-specific balance lookup: one native-coin query, one token query.
///
/// Implementations validate addresses before touching the network, normalize
/// every amount by the asset's own decimal count, and drop zero balances at
/// the source. A transport failure is returned as-is; the engine decides
/// whether it degrades ("wallet has nothing of this kind") or aborts the
/// valuation (both fetches down).
#[async_trait]
pub trait ChainBalanceSource: Send + Sync {
    fn chain(&self) -> Chain;

    /// Syntactic address check. Fails fast with `InvalidAddress`; no network
    /// calls are made for a malformed address.
    fn validate_address(&self, address: &str) -> Result<(), ValuationError>;

    /// Native-coin balance in human units (wei/lamports already divided out).
    async fn fetch_native_balance(&self, address: &str) -> Result<Decimal, SourceError>;

    /// All fungible-token balances with amount > 0 after normalization.
    async fn fetch_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, SourceError>;
}
