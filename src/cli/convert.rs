use super::{ui, view};
use crate::core::conversion;
use crate::core::{CurrencyCatalog, RateTableProvider, Session, SessionDefaults};
use anyhow::{Context, Result};
use std::io::Write;

/// Overrides for a one-shot conversion. Anything left out keeps the
/// configured default.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub amount: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Loads the catalog, applies `args` and runs a single conversion.
///
/// Invalid input is an error. A failed rate lookup is not: the returned
/// session simply has no rate and an empty converted amount.
pub async fn convert_once(
    provider: &dyn RateTableProvider,
    defaults: SessionDefaults,
    args: &ConvertArgs,
) -> Result<Session> {
    let mut session = Session::new(defaults);

    let catalog = CurrencyCatalog::load(provider).await;
    session.catalog_loaded(catalog);

    if let Some(amount) = &args.amount {
        session.set_amount(amount.parse()?);
    }
    if let Some(from) = &args.from {
        session
            .select_from(from.parse()?)
            .context("Invalid source currency")?;
    }
    if let Some(to) = &args.to {
        session
            .select_to(to.parse()?)
            .context("Invalid target currency")?;
    }

    let request = session.begin_conversion();
    let outcome = conversion::convert(provider, &request).await;
    session.conversion_settled(&request, outcome);
    Ok(session)
}

pub async fn run<W: Write>(
    provider: &dyn RateTableProvider,
    defaults: SessionDefaults,
    args: &ConvertArgs,
    out: &mut W,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = convert_once(provider, defaults, args).await;
    pb.finish_and_clear();

    writeln!(out, "{}", view::render(&result?))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ExchangeRateApiProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CATALOG_JSON: &str = r#"{"base": "USD", "rates": {"USD": 1, "INR": 83.1, "EUR": 0.91}}"#;

    async fn mount(server: &MockServer, base: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn args(amount: &str, from: &str, to: &str) -> ConvertArgs {
        ConvertArgs {
            amount: Some(amount.to_string()),
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_convert_once() {
        let server = MockServer::start().await;
        mount(&server, "USD", 200, CATALOG_JSON).await;
        mount(&server, "EUR", 200, r#"{"rates": {"INR": 91.5, "USD": 1.1}}"#).await;
        let provider = ExchangeRateApiProvider::new(&server.uri()).unwrap();

        let session = convert_once(
            &provider,
            SessionDefaults::default(),
            &args("4", "eur", "INR"),
        )
        .await
        .unwrap();
        assert_eq!(session.rate(), Some(91.5));
        assert_eq!(session.converted_amount(), "366.00");
        assert_eq!(
            session.status_line().as_deref(),
            Some("💱 1 EUR = 91.5 INR")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_defaults_are_used() {
        let server = MockServer::start().await;
        mount(&server, "USD", 200, CATALOG_JSON).await;
        let provider = ExchangeRateApiProvider::new(&server.uri()).unwrap();

        let session = convert_once(&provider, SessionDefaults::default(), &ConvertArgs::default())
            .await
            .unwrap();
        assert_eq!(session.rate(), Some(83.1));
        assert_eq!(session.converted_amount(), "83.10");
    }

    #[test_log::test(tokio::test)]
    async fn test_unsupported_currency_is_rejected() {
        let server = MockServer::start().await;
        mount(&server, "USD", 200, CATALOG_JSON).await;
        let provider = ExchangeRateApiProvider::new(&server.uri()).unwrap();

        let result = convert_once(
            &provider,
            SessionDefaults::default(),
            &args("1", "USD", "CHF"),
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Invalid target currency");
        assert_eq!(err.root_cause().to_string(), "Unsupported currency: CHF");
    }

    #[test_log::test(tokio::test)]
    async fn test_rate_failure_degrades_silently() {
        let server = MockServer::start().await;
        mount(&server, "USD", 200, CATALOG_JSON).await;
        mount(&server, "EUR", 500, "").await;
        let provider = ExchangeRateApiProvider::new(&server.uri()).unwrap();

        let session = convert_once(
            &provider,
            SessionDefaults::default(),
            &args("10", "EUR", "USD"),
        )
        .await
        .unwrap();
        assert!(session.rate().is_none());
        assert_eq!(session.converted_amount(), "");
        assert!(session.status_line().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_catalog_failure_uses_fallback() {
        let server = MockServer::start().await;
        mount(&server, "USD", 500, "").await;
        mount(&server, "GBP", 200, r#"{"rates": {"JPY": 190.25}}"#).await;
        let provider = ExchangeRateApiProvider::new(&server.uri()).unwrap();

        let session = convert_once(
            &provider,
            SessionDefaults::default(),
            &args("", "GBP", "JPY"),
        )
        .await
        .unwrap();
        assert_eq!(session.catalog().len(), 5);
        assert_eq!(session.rate(), Some(190.25));
        assert_eq!(session.converted_amount(), "0.00");
    }
}
