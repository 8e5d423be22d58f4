mod api;
mod app;
mod approval;
mod cache;
mod commands;
mod config;
mod coordinator;
mod error;
mod event;
mod logging;
mod store;
#[cfg(test)]
mod testing;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "txview")]
#[command(about = "A terminal client for reviewing and approving employee transactions")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/txview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Employee id to filter by on startup
  #[arg(short, long)]
  employee: Option<String>,

  /// Simulated transport latency in milliseconds
  #[arg(long)]
  latency_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line overrides
  if let Some(employee) = args.employee {
    config.default_employee = Some(employee);
  }
  if let Some(latency_ms) = args.latency_ms {
    config.transport.latency_ms = latency_ms;
  }

  let (_log_guard, log_path) = logging::init(&config.logging)?;
  info!(?config, "starting txview");

  // Initialize and run the app
  let mut app = app::App::new(config, Some(log_path))?;
  app.run().await?;

  Ok(())
}
