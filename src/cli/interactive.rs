use super::ui::{self, StyleType};
use super::view;
use crate::core::conversion::{self, ConversionError};
use crate::core::{
    Amount, ConversionRequest, CurrencyCatalog, CurrencyCode, Quote, RateTableProvider, Session,
    SessionDefaults,
};
use anyhow::{Result, anyhow, bail};
use futures::StreamExt;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::FuturesUnordered;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
Commands:
  amount [VALUE]   set the amount (no value clears it)
  from CODE        set the source currency
  to CODE          set the target currency
  convert          fetch the latest rate and convert
  show             show the current state
  list             list available currencies
  help             show this help
  quit             leave";

#[derive(Debug, PartialEq)]
enum Command {
    Amount(Amount),
    From(CurrencyCode),
    To(CurrencyCode),
    Convert,
    Show,
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word.to_lowercase().as_str() {
            "amount" | "a" => Command::Amount(rest.parse()?),
            "from" | "f" => Command::From(required(rest, "from")?.parse()?),
            "to" | "t" => Command::To(required(rest, "to")?.parse()?),
            "convert" | "c" => Command::Convert,
            "show" | "s" => Command::Show,
            "list" | "l" => Command::List,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("Unknown command: {other}. Type 'help' for a list of commands."),
        };
        Ok(command)
    }
}

fn required<'a>(value: &'a str, command: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(anyhow!("Usage: {command} CODE"));
    }
    Ok(value)
}

type Settled = (ConversionRequest, Result<Quote, ConversionError>);

/// Drives a session from line-oriented `input`, writing views to `out`.
///
/// The catalog fetch and every conversion run concurrently with input
/// handling, so fields can be edited while requests are outstanding. The
/// session ends on `quit`, or at end of input once outstanding requests
/// have settled.
pub async fn run_session<R, W>(
    provider: &dyn RateTableProvider,
    defaults: SessionDefaults,
    input: R,
    out: &mut W,
) -> Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::new(defaults);
    let mut lines = input.lines();
    let mut input_open = true;

    let catalog_load = CurrencyCatalog::load(provider);
    tokio::pin!(catalog_load);
    let mut catalog_pending = true;

    let mut in_flight: FuturesUnordered<BoxFuture<'_, Settled>> = FuturesUnordered::new();

    writeln!(out, "{}", ui::style_text("Currency Converter", StyleType::Title))?;
    writeln!(out, "{}\n", ui::style_text(HELP, StyleType::Subtle))?;
    writeln!(out, "{}", view::render(&session))?;

    loop {
        if !input_open && !catalog_pending && in_flight.is_empty() {
            break;
        }

        tokio::select! {
            catalog = &mut catalog_load, if catalog_pending => {
                catalog_pending = false;
                session.catalog_loaded(catalog);
                writeln!(out, "{}", view::render(&session))?;
            }
            Some((request, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                if session.conversion_settled(&request, outcome) {
                    writeln!(out, "{}", view::render(&session))?;
                }
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("End of input");
                    input_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        writeln!(out, "{}", ui::style_text(&e.to_string(), StyleType::Error))?;
                        continue;
                    }
                };

                let applied = match command {
                    Command::Amount(amount) => {
                        session.set_amount(amount);
                        Ok(true)
                    }
                    Command::From(code) => session.select_from(code).map(|_| true),
                    Command::To(code) => session.select_to(code).map(|_| true),
                    Command::Convert => {
                        let request = session.begin_conversion();
                        debug!(generation = request.generation, "Conversion requested");
                        in_flight.push(
                            async move {
                                let outcome = conversion::convert(provider, &request).await;
                                (request, outcome)
                            }
                            .boxed(),
                        );
                        Ok(false)
                    }
                    Command::Show => Ok(true),
                    Command::List => {
                        if session.catalog().is_empty() {
                            writeln!(out, "{}", ui::style_text("Currencies are still loading", StyleType::Subtle))?;
                        } else {
                            writeln!(out, "{}", session.catalog().display_as_table())?;
                        }
                        Ok(false)
                    }
                    Command::Help => {
                        writeln!(out, "{HELP}")?;
                        Ok(false)
                    }
                    Command::Quit => break,
                };

                match applied {
                    Ok(true) => writeln!(out, "{}", view::render(&session))?,
                    Ok(false) => {}
                    Err(e) => writeln!(out, "{}", ui::style_text(&e.to_string(), StyleType::Error))?,
                }
            }
        }
    }

    Ok(session)
}

/// Runs a session on stdin.
pub async fn run<W: Write>(
    provider: &dyn RateTableProvider,
    defaults: SessionDefaults,
    out: &mut W,
) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_session(provider, defaults, stdin, out).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateTable;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves fixed tables per base, optionally after a delay.
    struct ScriptedProvider {
        responses: Vec<(&'static str, u64, Option<&'static str>)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<(&'static str, u64, Option<&'static str>)>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RateTableProvider for ScriptedProvider {
        async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable> {
            self.calls.lock().unwrap().push(base.to_string());
            let (_, delay_ms, body) = self
                .responses
                .iter()
                .find(|(b, _, _)| *base == *b)
                .copied()
                .ok_or_else(|| anyhow!("HTTP error: 404 Not Found for base: {base}"))?;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            match body {
                Some(body) => Ok(serde_json::from_str(body)?),
                None => Err(anyhow!("HTTP error: 500 Internal Server Error for base: {base}")),
            }
        }
    }

    const USD_TABLE: &str = r#"{"rates": {"USD": 1, "INR": 83.1, "EUR": 0.91}}"#;

    async fn drive(provider: &ScriptedProvider, script: &str) -> (Session, String) {
        console::set_colors_enabled(false);
        let mut out = Vec::new();
        let session = run_session(
            provider,
            SessionDefaults::default(),
            tokio::io::BufReader::new(script.as_bytes()),
            &mut out,
        )
        .await
        .unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "amount 10".parse::<Command>().unwrap(),
            Command::Amount("10".parse().unwrap())
        );
        assert_eq!("amount".parse::<Command>().unwrap(), Command::Amount(Amount::EMPTY));
        assert_eq!(
            "FROM eur".parse::<Command>().unwrap(),
            Command::From("EUR".parse().unwrap())
        );
        assert_eq!("  c ".parse::<Command>().unwrap(), Command::Convert);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert!("to".parse::<Command>().is_err());
        assert!("amount ten".parse::<Command>().is_err());
        assert!("swap".parse::<Command>().is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_session_converts() {
        let provider = ScriptedProvider::new(vec![("USD", 0, Some(USD_TABLE))]);
        let (session, out) = drive(&provider, "amount 10\nto EUR\nconvert\n").await;

        assert_eq!(session.rate(), Some(0.91));
        assert_eq!(session.converted_amount(), "9.10");
        assert!(out.contains("💱 1 USD = 0.91 EUR"));
    }

    #[test_log::test(tokio::test)]
    async fn test_catalog_loads_once() {
        let provider = ScriptedProvider::new(vec![("USD", 0, Some(USD_TABLE))]);
        let (session, _) = drive(&provider, "show\nshow\n").await;

        assert_eq!(session.catalog().len(), 3);
        assert_eq!(*provider.calls.lock().unwrap(), vec!["USD".to_string()]);
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_input_is_reported_and_ignored() {
        let provider = ScriptedProvider::new(vec![("USD", 0, Some(USD_TABLE))]);
        let (session, out) = drive(&provider, "amount -5\nbogus\namount 3\n").await;

        assert_eq!(session.amount().value(), Some(3.0));
        assert!(out.contains("Amount must not be negative"));
        assert!(out.contains("Unknown command: bogus"));
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_conversion_clears_result() {
        let provider = ScriptedProvider::new(vec![
            ("USD", 0, Some(USD_TABLE)),
            ("EUR", 0, None),
        ]);
        let (session, _) = drive(&provider, "convert\nfrom EUR\nconvert\n").await;

        assert!(session.rate().is_none());
        assert_eq!(session.converted_amount(), "");
        assert!(session.status_line().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_stale_response_does_not_overwrite() {
        let provider = ScriptedProvider::new(vec![
            ("USD", 0, Some(USD_TABLE)),
            ("EUR", 100, Some(r#"{"rates": {"INR": 91.5}}"#)),
        ]);
        let (session, out) =
            drive(&provider, "from EUR\nconvert\nfrom USD\nconvert\n").await;

        assert_eq!(session.rate(), Some(83.1));
        assert_eq!(session.status_line().as_deref(), Some("💱 1 USD = 83.1 INR"));
        assert!(!out.contains("91.5"));
    }

    #[test_log::test(tokio::test)]
    async fn test_quit_stops_immediately() {
        let provider = ScriptedProvider::new(vec![("USD", 0, Some(USD_TABLE))]);
        let (session, _) = drive(&provider, "quit\namount 99\n").await;
        assert_eq!(session.amount().value(), Some(1.0));
    }
}
