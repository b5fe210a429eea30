use std::fmt;
use std::str::FromStr;

/// Chains the valuation pipeline knows how to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Evm,
    Solana,
}

impl Chain {
    /// Decimal exponent of the chain's native coin. Protocol constants:
    /// wei -> ETH is 18, lamports -> SOL is 9.
    pub fn native_decimals(&self) -> u8 {
        match self {
            Chain::Evm => 18,
            Chain::Solana => 9,
        }
    }

    /// Display name for the native holding line.
    pub fn native_display_name(&self) -> &'static str {
        match self {
            Chain::Evm => "Ethereum (ETH)",
            Chain::Solana => "Solana (SOL)",
        }
    }

    /// Sentinel asset id for the native coin. Never collides with a
    /// contract/mint address (those are hex or base58).
    pub fn native_asset_id(&self) -> &'static str {
        match self {
            Chain::Evm => "Native ETH",
            Chain::Solana => "Native SOL",
        }
    }

    /// Label used when synthesizing a placeholder name for an unnamed token.
    pub fn token_kind_label(&self) -> &'static str {
        match self {
            Chain::Evm => "ERC-20 Token",
            Chain::Solana => "SPL Token",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Evm => write!(f, "evm"),
            Chain::Solana => write!(f, "solana"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" | "eth" | "ethereum" => Ok(Chain::Evm),
            "sol" | "solana" => Ok(Chain::Solana),
            other => Err(format!("unknown chain: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chain_aliases() {
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Evm);
        assert_eq!("Ethereum".parse::<Chain>().unwrap(), Chain::Evm);
        assert_eq!("sol".parse::<Chain>().unwrap(), Chain::Solana);
        assert!("dogecoin".parse::<Chain>().is_err());
    }

    #[test]
    fn native_constants() {
        assert_eq!(Chain::Evm.native_decimals(), 18);
        assert_eq!(Chain::Solana.native_decimals(), 9);
        assert_ne!(Chain::Evm.native_asset_id(), Chain::Solana.native_asset_id());
    }
}
