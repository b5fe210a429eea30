use rust_decimal::Decimal;

/// One token position as reported by a balance source, already normalized by
/// the token's own decimal count and filtered to amounts > 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    /// Contract address (EVM) or mint address (Solana).
    pub asset_id: String,
    pub raw_balance: Decimal,
    pub decimals: u8,
    /// Name/symbol when the balance source already supplies them (the EVM
    /// indexer does, the Solana RPC does not).
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// A USD quote for one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenQuote {
    pub unit_price_usd: Decimal,
    /// Fully diluted valuation where the oracle reports one; used as the
    /// market-cap surrogate.
    pub market_cap_usd: Option<Decimal>,
}

/// One valued asset line in the final portfolio. `None` means the datum is
/// unknown, not zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub display_name: String,
    /// Native-coin sentinel or contract/mint address; unique within one
    /// valuation result.
    pub asset_id: String,
    /// Normalized balance, always > 0.
    pub raw_balance: Decimal,
    pub unit_price_usd: Option<Decimal>,
    pub market_cap_usd: Option<Decimal>,
    pub dollar_value: Option<Decimal>,
}

impl Holding {
    /// Value used for ordering only. An unknown value sorts as zero but the
    /// stored `dollar_value` stays `None`.
    pub fn sort_value(&self) -> Decimal {
        self.dollar_value.unwrap_or(Decimal::ZERO)
    }
}

/// Holdings ordered by descending dollar value plus the portfolio total.
/// Built fresh per valuation request; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResult {
    pub holdings: Vec<Holding>,
    pub total_value_usd: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn unknown_value_sorts_as_zero() {
        let holding = Holding {
            display_name: "X".to_string(),
            asset_id: "0xabc".to_string(),
            raw_balance: dec!(5),
            unit_price_usd: None,
            market_cap_usd: None,
            dollar_value: None,
        };
        assert_eq!(holding.sort_value(), Decimal::ZERO);
        assert_eq!(holding.dollar_value, None);
    }
}
