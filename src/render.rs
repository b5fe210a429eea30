//! Presentation boundary: every value stays an unformatted `Decimal` until
//! it crosses into this module.

use rust_decimal::prelude::*;

use crate::model::{Holding, PortfolioResult};

/// Dollar amounts render with 2 fractional digits and thousands separators.
pub fn format_usd(value: Decimal) -> String {
    format!("${}", format_grouped(value, 2))
}

/// Unit prices render with 6 fractional digits, extended to 10 below
/// 0.0001 so sub-cent altcoin prices don't read as $0.00.
pub fn format_price_usd(price: Decimal) -> String {
    let precision = if price < dec!(0.0001) { 10 } else { 6 };
    format!("${}", format_grouped(price, precision))
}

/// Balances render with 4 fractional digits.
pub fn format_balance(balance: Decimal) -> String {
    format_grouped(balance, 4)
}

/// Chat-style text rendering of a portfolio: one block per holding, ordered
/// as valued, with an explicit total line. An empty result renders as a
/// "nothing above the threshold" message, distinct from an error.
pub fn render_portfolio_text(result: &PortfolioResult, threshold_usd: Decimal) -> String {
    if result.holdings.is_empty() {
        return format!(
            "No holdings found with a value greater than {}.",
            format_usd(threshold_usd)
        );
    }

    let mut message = String::new();
    for holding in &result.holdings {
        message.push_str(&render_holding(holding));
        message.push('\n');
    }
    message.push_str(&format!(
        "Total Portfolio Value: {}",
        format_usd(result.total_value_usd)
    ));
    message
}

fn render_holding(holding: &Holding) -> String {
    let price = holding
        .unit_price_usd
        .map(format_price_usd)
        .unwrap_or_else(|| "N/A".to_string());
    let market_cap = holding
        .market_cap_usd
        .map(format_usd)
        .unwrap_or_else(|| "N/A".to_string());
    let value = holding
        .dollar_value
        .map(format_usd)
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "- {}\n  Asset: {}\n  Balance: {}\n  Price (USD): {}\n  Market Cap (USD): {}\n  Dollar Value (USD): {}\n",
        holding.display_name,
        holding.asset_id,
        format_balance(holding.raw_balance),
        price,
        market_cap,
        value,
    )
}

/// Fixed-point rendering with thousands separators in the integer part.
fn format_grouped(value: Decimal, decimal_places: u32) -> String {
    let text = format!("{:.*}", decimal_places as usize, value.round_dp(decimal_places));
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(text.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
