pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::convert::ConvertArgs;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::io::Write;
use tracing::{debug, info};

pub enum AppCommand {
    Currencies,
    Convert(ConvertArgs),
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    run_command_with_output(command, config_path, &mut std::io::stdout()).await
}

/// Like [`run_command`], but writes the rendered output to `out`.
pub async fn run_command_with_output<W: Write>(
    command: AppCommand,
    config_path: Option<&str>,
    out: &mut W,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let defaults = config.defaults.to_session_defaults()?;
    let provider = providers::ExchangeRateApiProvider::with_retry(
        &config.providers.exchangerate_api.base_url,
        config.retry,
    )?;

    match command {
        AppCommand::Currencies => cli::currencies::run(&provider, out).await,
        AppCommand::Convert(args) => cli::convert::run(&provider, defaults, &args, out).await,
        AppCommand::Interactive => cli::interactive::run(&provider, defaults, out).await,
    }
}
