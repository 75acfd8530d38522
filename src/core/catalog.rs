//! The set of currencies a user may select from.

use super::currency::CurrencyCode;
use super::rates::RateTableProvider;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Used whenever the reference snapshot is unavailable or empty.
pub const DEFAULT_CURRENCIES: [&str; 5] = ["USD", "INR", "EUR", "GBP", "JPY"];

/// Base currency of the snapshot the catalog is derived from.
pub const REFERENCE_BASE: &str = "USD";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch currency list: {0:#}")]
    Fetch(anyhow::Error),
    #[error("No currency codes found in response")]
    Empty,
}

/// Ordered list of selectable currency codes, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrencyCatalog {
    codes: Vec<CurrencyCode>,
}

impl CurrencyCatalog {
    pub fn new(codes: Vec<CurrencyCode>) -> Self {
        Self { codes }
    }

    pub fn fallback() -> Self {
        Self::new(DEFAULT_CURRENCIES.iter().map(|c| (*c).into()).collect())
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.codes.contains(code)
    }

    pub fn first(&self) -> Option<&CurrencyCode> {
        self.codes.first()
    }

    pub fn codes(&self) -> &[CurrencyCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Builds the catalog from the reference snapshot.
    pub async fn fetch(provider: &dyn RateTableProvider) -> Result<Self, CatalogError> {
        let table = provider
            .fetch_rates(&REFERENCE_BASE.into())
            .await
            .map_err(CatalogError::Fetch)?;
        let codes = table.codes();
        if codes.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(codes))
    }

    /// Like [`CurrencyCatalog::fetch`], but never fails: any error is
    /// logged and replaced by the default list.
    pub async fn load(provider: &dyn RateTableProvider) -> Self {
        match Self::fetch(provider).await {
            Ok(catalog) => {
                debug!(count = catalog.len(), "Loaded currency catalog");
                catalog
            }
            Err(e @ CatalogError::Empty) => {
                warn!("{e}. Falling back to common list.");
                Self::fallback()
            }
            Err(e @ CatalogError::Fetch(_)) => {
                error!(error = %e, "Error fetching currency list");
                Self::fallback()
            }
        }
    }
}
