use thiserror::Error;

/// Fatal valuation failures. Everything else (a missing price, a token the
/// registry doesn't know) degrades to partial data on the affected asset.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// The wallet address does not match the chain's address syntax.
    /// Reported before any network call.
    #[error("invalid wallet address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The primary balance source is completely unreachable: both the
    /// native-balance and the token-balance fetch failed.
    #[error("balance source unavailable: {reason}")]
    BalanceSourceUnavailable { reason: String },
}

/// Transport- or shape-level failure talking to one upstream endpoint.
/// Balance sources and oracles return these; the engine decides whether a
/// given failure degrades or aborts.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Malformed(String),
}
