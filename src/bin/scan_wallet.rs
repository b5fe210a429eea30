use std::env;

use tracing::info;

use wallet_scanner::chain::Chain;
use wallet_scanner::config::Config;
use wallet_scanner::logging;
use wallet_scanner::profiles;
use wallet_scanner::render;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment variables from .env file before logging reads them
    dotenvy::dotenv().ok();
    logging::init_logging();

    let mut args = env::args().skip(1);
    let (Some(chain_arg), Some(address)) = (args.next(), args.next()) else {
        eprintln!("Usage: scan_wallet <evm|solana> <wallet-address>");
        std::process::exit(2);
    };
    let chain: Chain = chain_arg.parse().map_err(|e: String| eyre::eyre!(e))?;

    // Load configuration (endpoints, credentials, threshold)
    let config = Config::load();
    info!(%chain, %address, "Scanning wallet");

    let engine = profiles::engine_for(chain, &config);
    let result = engine.valuate(&address).await?;

    println!("{}", render::render_portfolio_text(&result, config.materiality_threshold_usd));
    Ok(())
}
