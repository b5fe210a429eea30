use std::env;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;

const DEFAULT_MORALIS_BASE_URL: &str = "https://deep-index.moralis.io/api/v2";
const DEFAULT_DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com/latest/dex/tokens";
const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_JUPITER_PRICE_URL: &str = "https://price.jup.ag/v1/price";
const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_TOKEN_LIST_URL: &str =
    "https://raw.githubusercontent.com/solana-labs/token-list/main/src/tokens/solana.tokenlist.json";

/// Process-wide configuration, loaded once at startup and read-only after.
/// Endpoints and credentials for every upstream the pipeline talks to.
pub struct Config {
    pub http_client: Client,
    pub moralis_api_key: String,
    pub moralis_base_url: String,
    pub dexscreener_base_url: String,
    pub coingecko_base_url: String,
    pub jupiter_price_url: String,
    pub solana_rpc_url: String,
    pub token_list_url: String,
    /// Holdings with a known value at or below this are dropped.
    pub materiality_threshold_usd: Decimal,
    pub eth_fallback_price_usd: Decimal,
    pub sol_fallback_price_usd: Decimal,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let timeout_secs = env_parse("HTTP_TIMEOUT_SECS", 5u64);
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Config {
            http_client,
            moralis_api_key: env::var("MORALIS_API_KEY").unwrap_or_default(),
            moralis_base_url: env_or("MORALIS_BASE_URL", DEFAULT_MORALIS_BASE_URL),
            dexscreener_base_url: env_or("DEXSCREENER_BASE_URL", DEFAULT_DEXSCREENER_BASE_URL),
            coingecko_base_url: env_or("COINGECKO_BASE_URL", DEFAULT_COINGECKO_BASE_URL),
            jupiter_price_url: env_or("JUPITER_PRICE_URL", DEFAULT_JUPITER_PRICE_URL),
            solana_rpc_url: env_or("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            token_list_url: env_or("TOKEN_LIST_URL", DEFAULT_TOKEN_LIST_URL),
            materiality_threshold_usd: env_parse("MATERIALITY_THRESHOLD_USD", Decimal::from(5)),
            eth_fallback_price_usd: env_parse("ETH_FALLBACK_PRICE_USD", Decimal::from(1800)),
            sol_fallback_price_usd: env_parse("SOL_FALLBACK_PRICE_USD", Decimal::from(150)),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
