//! Message rendering for the Telegram surface.

use chrono::Duration;

use crate::domain::{CurrencyCode, Pair, Rate, Snapshot};

/// Render the rates message sent for a snapshot.
///
/// Buy/sell values are rounded to two decimals for display only; change
/// detection upstream always works at full fetched precision.
#[must_use]
pub fn rates_message(snapshot: &Snapshot) -> String {
    // Kyiv is UTC+3.
    let date = (snapshot.fetched_at + Duration::hours(3)).format("%d/%m/%Y");

    let mut message = format!("Here are the latest currency rates as of {date}:");
    for rate in &snapshot.rates {
        message.push('\n');
        message.push_str(&rate_line(rate));
    }
    message
}

/// Render a snapshot that could not be refreshed.
#[must_use]
pub fn stale_rates_message(snapshot: &Snapshot) -> String {
    let mut message = rates_message(snapshot);
    message.push_str("\n\n⚠️ Could not refresh — these rates may be out of date.");
    message
}

/// The reply when a refresh failed and nothing is cached.
#[must_use]
pub fn fetch_failed_message() -> String {
    "Failed to fetch exchange rates. Please try again later.".to_string()
}

/// The `/start` confirmation.
#[must_use]
pub fn subscribed_message() -> String {
    "You are subscribed to rate change notifications. Use /rates to fetch current rates.".to_string()
}

fn rate_line(rate: &Rate) -> String {
    format!(
        "{} {:.2} / {:.2}",
        pair_emoji(rate.pair),
        rate.buy.round_dp(2),
        rate.sell.round_dp(2)
    )
}

fn pair_emoji(pair: Pair) -> &'static str {
    match (pair.base, pair.quote) {
        (CurrencyCode::USD, CurrencyCode::UAH) => "\u{1F1FA}\u{1F1F8}",
        (CurrencyCode::EUR, CurrencyCode::UAH) => "\u{1F1EA}\u{1F1FA}",
        (CurrencyCode::GBP, CurrencyCode::UAH) => "\u{1F1EC}\u{1F1E7}",
        (CurrencyCode::PLN, CurrencyCode::UAH) => "\u{1F1F5}\u{1F1F1}",
        _ => "\u{1F4B1}",
    }
}
