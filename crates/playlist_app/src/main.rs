mod cli;
mod platform;

use anyhow::Context;
use clap::Parser;
use engine_logging::engine_info;

use cli::Cli;
use platform::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) =
        AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_overrides(&mut config);

    platform::logging::initialize(config.log_destination, &config.log_level);
    match source {
        Some(path) => engine_info!("Loaded configuration from {:?}", path),
        None => engine_info!("No configuration file, using defaults"),
    }
    platform::run_app(config, cli.url)
}
