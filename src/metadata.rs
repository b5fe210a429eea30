use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::chain::Chain;
use crate::config::Config;

/// Human-readable name and symbol for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
}

/// Maps token identifiers to names when the balance source does not already
/// supply them. Identifiers missing from the returned map get a synthesized
/// placeholder downstream, so a resolver failure is never fatal.
#[async_trait]
pub trait TokenMetadataResolver: Send + Sync {
    async fn resolve(&self, asset_ids: &[String]) -> HashMap<String, TokenMetadata>;
}

/// Resolver for sources that already return full metadata (the EVM indexer
/// includes names and symbols in the balance response).
#[derive(Debug, Clone, Default)]
pub struct NullMetadataResolver;

#[async_trait]
impl TokenMetadataResolver for NullMetadataResolver {
    async fn resolve(&self, _asset_ids: &[String]) -> HashMap<String, TokenMetadata> {
        HashMap::new()
    }
}

/// Resolver backed by the canonical Solana Labs token list. Fetches the
/// registry once per call and matches entries by exact mint address.
#[derive(Debug, Clone)]
pub struct TokenListResolver {
    http_client: Client,
    token_list_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenListFile {
    tokens: Vec<TokenListEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenListEntry {
    address: String,
    name: String,
    symbol: String,
}

impl TokenListResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: config.http_client.clone(),
            token_list_url: config.token_list_url.clone(),
        }
    }

    async fn fetch_token_list(&self) -> Option<Vec<TokenListEntry>> {
        let url = Url::parse(&self.token_list_url).ok()?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;
        let body: TokenListFile = response.json().await.ok()?;
        Some(body.tokens)
    }
}

#[async_trait]
impl TokenMetadataResolver for TokenListResolver {
    #[instrument(skip(self, asset_ids), fields(requested = asset_ids.len()))]
    async fn resolve(&self, asset_ids: &[String]) -> HashMap<String, TokenMetadata> {
        if asset_ids.is_empty() {
            return HashMap::new();
        }
        let Some(entries) = self.fetch_token_list().await else {
            warn!("Token registry unavailable, holdings keep placeholder names");
            return HashMap::new();
        };

        let wanted: HashSet<&str> = asset_ids.iter().map(String::as_str).collect();
        let resolved: HashMap<String, TokenMetadata> = entries
            .into_iter()
            .filter(|entry| wanted.contains(entry.address.as_str()))
            .map(|entry| {
                (
                    entry.address,
                    TokenMetadata {
                        name: entry.name,
                        symbol: entry.symbol,
                    },
                )
            })
            .collect();
        debug!(resolved = resolved.len(), "Resolved token metadata from registry");
        resolved
    }
}

/// Placeholder name for a token the registry doesn't know: the chain's token
/// kind plus a truncated identifier, so the UI never shows a blank name.
pub fn placeholder_name(chain: Chain, asset_id: &str) -> String {
    let truncated = if asset_id.len() > 8 {
        format!("{}...{}", &asset_id[..4], &asset_id[asset_id.len() - 4..])
    } else {
        asset_id.to_string()
    };
    format!("{} ({})", chain.token_kind_label(), truncated)
}
