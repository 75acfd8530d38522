//! Conversion engine: fetch a rate table and price an amount with it.

use super::currency::{Amount, CurrencyCode};
use super::rates::RateTableProvider;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

/// Everything a single conversion needs, captured when the user asks for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub generation: u64,
    pub amount: Amount,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub converted_amount: String,
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Error fetching exchange rate for {base}: {reason:#}")]
    RateFetch {
        base: CurrencyCode,
        reason: anyhow::Error,
    },
    #[error("Rate not found for {to} in {from} rate table")]
    RateNotFound { from: CurrencyCode, to: CurrencyCode },
}

/// Renders exactly two fraction digits, rounding the exact binary value
/// of `value` to the nearest cent. Exact half-cent ties round away from
/// zero.
pub fn format_amount(value: f64) -> String {
    if is_half_cent_tie(value) {
        let cents = (value * 100.0 + 0.5 * value.signum()).trunc();
        return format!("{:.2}", cents / 100.0);
    }
    format!("{value:.2}")
}

// A binary value lies exactly halfway between two cents only when it is an
// odd multiple of 1/8 (0.125, 0.375, ...). Those products are exact.
fn is_half_cent_tie(value: f64) -> bool {
    let eighths = value * 8.0;
    value.is_finite() && eighths.fract() == 0.0 && (eighths / 2.0).fract() != 0.0
}

pub fn convert_amount(amount: Amount, rate: f64) -> String {
    format_amount(amount.as_number() * rate)
}

pub async fn convert(
    provider: &dyn RateTableProvider,
    request: &ConversionRequest,
) -> Result<Quote, ConversionError> {
    let table = provider
        .fetch_rates(&request.from)
        .await
        .map_err(|reason| ConversionError::RateFetch {
            base: request.from.clone(),
            reason,
        })?;

    let rate = table
        .rate_for(&request.to)
        .ok_or_else(|| ConversionError::RateNotFound {
            from: request.from.clone(),
            to: request.to.clone(),
        })?;
    debug!(from = %request.from, to = %request.to, rate, "Found exchange rate");

    Ok(Quote {
        from: request.from.clone(),
        to: request.to.clone(),
        rate,
        converted_amount: convert_amount(request.amount, rate),
        as_of: table.date,
    })
}
