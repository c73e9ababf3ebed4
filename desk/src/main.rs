// lensflow-desk/src/main.rs

mod commands;
mod config;
mod errors;
mod services;
mod state;

use crate::commands::Cli;
use crate::config::AppConfig;
use crate::state::AppState;

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::WARN.into())
    .from_env_lossy(); // RUST_LOG overrides
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_span_events(FmtSpan::CLOSE);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("loading desk configuration")?);
  let app_state = AppState::build(app_config).context("building backend clients")?;
  commands::dispatch(&app_state, cli.command).await?;
  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  // Only the log format is read before the full configuration.
  dotenvy::dotenv().ok();
  let json = std::env::var("LENSFLOW_LOG_JSON").map(|v| v == "true").unwrap_or(false);
  init_tracing(json);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      let code = e
        .downcast_ref::<errors::AppError>()
        .map(errors::AppError::exit_code)
        .unwrap_or(1);
      tracing::error!(error = %e, "Command failed.");
      eprintln!("error: {:#}", e);
      ExitCode::from(code as u8)
    }
  }
}
