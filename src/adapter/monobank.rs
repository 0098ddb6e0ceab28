//! Monobank rate source.
//!
//! Fetches the public currency list from the Monobank API and converts it
//! into domain rate records. The API is aggressively rate limited (one
//! request per few minutes), which is why HTTP 429 gets its own error kind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::SourceConfig;
use crate::domain::{CurrencyCode, Pair, Rate};
use crate::error::FetchError;
use crate::port::RateSource;

/// One row of the Monobank `/bank/currency` response.
///
/// Rows carry either a buy/sell spread or only a cross rate; only spread
/// rows are usable here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyRow {
    currency_code_a: u16,
    currency_code_b: u16,
    /// Unix seconds at which the bank observed the quote.
    date: i64,
    rate_buy: Option<Decimal>,
    rate_sell: Option<Decimal>,
    #[allow(dead_code)]
    rate_cross: Option<Decimal>,
}

/// [`RateSource`] backed by the Monobank public currency API.
pub struct MonobankSource {
    client: reqwest::Client,
    url: String,
    filter: Vec<Pair>,
}

impl MonobankSource {
    /// Build a source from configuration.
    ///
    /// The HTTP client carries the configured fetch timeout so a hung
    /// upstream call cannot stall a polling tick.
    ///
    /// # Errors
    ///
    /// Returns an error when the pair filter is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &SourceConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            filter: config.pair_filter()?,
        })
    }
}

#[async_trait]
impl RateSource for MonobankSource {
    async fn fetch(&self) -> Result<Vec<Rate>, FetchError> {
        debug!(url = %self.url, "fetching exchange rates");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(classify_request_error)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::RateLimited),
            status if !status.is_success() => {
                return Err(FetchError::Upstream {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let rows: Vec<CurrencyRow> = response.json().await.map_err(classify_request_error)?;
        let rates = convert_rows(rows, &self.filter);

        if rates.is_empty() {
            return Err(FetchError::NoData);
        }

        debug!(rates = rates.len(), "fetched exchange rates");
        Ok(rates)
    }
}

fn classify_request_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(error)
    }
}

/// Convert upstream rows into domain rates.
///
/// Keeps only rows whose pair is in the filter and which carry both a buy
/// and a sell value; the first row per pair wins, so the result holds at
/// most one rate per pair.
fn convert_rows(rows: Vec<CurrencyRow>, filter: &[Pair]) -> Vec<Rate> {
    let mut rates: Vec<Rate> = Vec::with_capacity(filter.len());

    for row in rows {
        let pair = Pair::new(
            CurrencyCode::new(row.currency_code_a),
            CurrencyCode::new(row.currency_code_b),
        );
        if !filter.contains(&pair) {
            continue;
        }
        if rates.iter().any(|r| r.pair == pair) {
            continue;
        }
        let (Some(buy), Some(sell)) = (row.rate_buy, row.rate_sell) else {
            continue;
        };
        rates.push(Rate {
            pair,
            buy,
            sell,
            observed_at: observed_at(row.date),
        });
    }

    rates
}

fn observed_at(unix_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_secs, 0).unwrap_or_else(Utc::now)
}
