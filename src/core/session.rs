//! Converter session state and the transitions that mutate it.
//!
//! All mutation goes through the methods here, one per event: catalog
//! loaded, field edited, conversion requested, conversion settled.

use super::catalog::CurrencyCatalog;
use super::conversion::{ConversionError, ConversionRequest, Quote};
use super::currency::{Amount, CurrencyCode};
use anyhow::{Result, bail};
use tracing::{debug, error};

/// Initial selection and amount for a new session.
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub amount: Amount,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            amount: Amount::new(1.0).unwrap_or_default(),
            from: "USD".into(),
            to: "INR".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    amount: Amount,
    from: CurrencyCode,
    to: CurrencyCode,
    catalog: CurrencyCatalog,
    quote: Option<Quote>,
    generation: u64,
}

impl Session {
    pub fn new(defaults: SessionDefaults) -> Self {
        Self {
            amount: defaults.amount,
            from: defaults.from,
            to: defaults.to,
            catalog: CurrencyCatalog::default(),
            quote: None,
            generation: 0,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn from_currency(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn to_currency(&self) -> &CurrencyCode {
        &self.to
    }

    pub fn catalog(&self) -> &CurrencyCatalog {
        &self.catalog
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn rate(&self) -> Option<f64> {
        self.quote.as_ref().map(|q| q.rate)
    }

    /// Formatted result of the last conversion, or empty.
    pub fn converted_amount(&self) -> &str {
        self.quote
            .as_ref()
            .map_or("", |q| q.converted_amount.as_str())
    }

    /// `💱 1 FROM = RATE TO`, present only while a rate is known.
    pub fn status_line(&self) -> Option<String> {
        self.quote
            .as_ref()
            .map(|q| format!("💱 1 {} = {} {}", q.from, q.rate, q.to))
    }

    /// Installs the catalog, then moves each side of the selection to the
    /// first catalog entry if it is no longer selectable.
    pub fn catalog_loaded(&mut self, catalog: CurrencyCatalog) {
        if let Some(first) = catalog.first() {
            if !catalog.contains(&self.from) {
                debug!(from = %self.from, corrected = %first, "Source currency not in catalog");
                self.from = first.clone();
            }
            if !catalog.contains(&self.to) {
                debug!(to = %self.to, corrected = %first, "Target currency not in catalog");
                self.to = first.clone();
            }
        }
        self.catalog = catalog;
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }

    pub fn select_from(&mut self, code: CurrencyCode) -> Result<()> {
        self.check_selectable(&code)?;
        self.from = code;
        Ok(())
    }

    pub fn select_to(&mut self, code: CurrencyCode) -> Result<()> {
        self.check_selectable(&code)?;
        self.to = code;
        Ok(())
    }

    // Until the catalog arrives any well-formed code is accepted; the
    // correction step fixes it up afterwards.
    fn check_selectable(&self, code: &CurrencyCode) -> Result<()> {
        if !self.catalog.is_empty() && !self.catalog.contains(code) {
            bail!("Unsupported currency: {}", code);
        }
        Ok(())
    }

    /// Snapshots the current selection into a new request. Only the most
    /// recently issued request may update the session.
    pub fn begin_conversion(&mut self) -> ConversionRequest {
        self.generation += 1;
        ConversionRequest {
            generation: self.generation,
            amount: self.amount,
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }

    /// Applies the outcome of a conversion. Returns `false` when the
    /// outcome belongs to a superseded request and was ignored.
    pub fn conversion_settled(
        &mut self,
        request: &ConversionRequest,
        outcome: Result<Quote, ConversionError>,
    ) -> bool {
        if request.generation != self.generation {
            debug!(
                generation = request.generation,
                latest = self.generation,
                "Ignoring stale conversion response"
            );
            return false;
        }

        match outcome {
            Ok(quote) => self.quote = Some(quote),
            Err(e) => {
                match &e {
                    ConversionError::RateNotFound { from, to } => {
                        error!(%from, %to, "Rate not found for {} in response", to)
                    }
                    ConversionError::RateFetch { .. } => {
                        error!(error = %e, "Error fetching exchange rate")
                    }
                }
                self.quote = None;
            }
        }
        true
    }
}
