//! Core converter logic: value types, catalog, conversion engine, session

pub mod catalog;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod log;
pub mod rates;
pub mod session;

// Re-export main types for cleaner imports
pub use catalog::CurrencyCatalog;
pub use conversion::{ConversionError, ConversionRequest, Quote};
pub use currency::{Amount, CurrencyCode};
pub use rates::{RateTable, RateTableProvider};
pub use session::{Session, SessionDefaults};
