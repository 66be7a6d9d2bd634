mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use connman_lite::config::{self, CliArgs, Config};
use connman_lite::ConnmanManager;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = CliArgs::parse();
    color_eyre::install()?;

    if cli.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let config = config::load(&cli).wrap_err("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config)?;

    info!("connman-lite starting");

    // No degraded mode: without the daemon there is nothing to do
    let bus = config.bus()?;
    let mut manager = ConnmanManager::connect(bus)
        .await
        .wrap_err_with(|| format!("Failed to reach ConnMan on the {} bus", bus.resolve()))?;

    let Some(command) = cli.command else {
        info!("No command given, exiting");
        return Ok(ExitCode::SUCCESS);
    };

    commands::run(&mut manager, command, cli.json).await
}

/// Initialize tracing to stderr, or to the configured log file
fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if let Some(path) = config.log_file() {
        let file = std::fs::File::create(path)
            .wrap_err_with(|| format!("Failed to create log file {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}
