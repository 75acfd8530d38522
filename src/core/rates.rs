//! Exchange-rate tables and the provider abstraction

use super::currency::CurrencyCode;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A snapshot of rates anchored at a base currency, as returned by
/// `GET <endpoint>/latest/{base}`.
///
/// Only `rates` matters for conversion. It is kept as a raw JSON value so
/// that a missing or oddly shaped table is reported per lookup instead of
/// failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub rates: Option<Value>,
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

impl RateTable {
    fn rate_map(&self) -> Option<&Map<String, Value>> {
        self.rates.as_ref().and_then(Value::as_object)
    }

    /// Currency codes in the order the source listed them.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        self.rate_map()
            .map(|m| m.keys().cloned().map(CurrencyCode::from).collect())
            .unwrap_or_default()
    }

    /// The rate for `code`, if present and numeric.
    pub fn rate_for(&self, code: &CurrencyCode) -> Option<f64> {
        self.rate_map()
            .and_then(|m| m.get(code.as_str()))
            .and_then(Value::as_f64)
    }
}

#[async_trait]
pub trait RateTableProvider: Send + Sync {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable>;
}
