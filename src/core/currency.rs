//! Currency codes and user-entered amounts

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A short currency identifier such as `USD`.
///
/// User input goes through [`FromStr`], which trims and uppercases it.
/// Codes read from a rate table are kept verbatim via [`From<String>`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code.is_empty() {
            bail!("Currency code must not be empty");
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("Invalid currency code: {}", s.trim());
        }
        Ok(CurrencyCode(code))
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        CurrencyCode(code)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        CurrencyCode(code.to_string())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The quantity to convert. An empty amount is a valid transient state
/// and counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amount(Option<f64>);

impl Amount {
    pub const EMPTY: Amount = Amount(None);

    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            bail!("Amount must be a finite number");
        }
        if value < 0.0 {
            bail!("Amount must not be negative");
        }
        Ok(Amount(Some(value)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// Numeric value used for computation.
    pub fn as_number(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl FromStr for Amount {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::EMPTY);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid amount: {}", trimmed))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => Ok(()),
        }
    }
}
