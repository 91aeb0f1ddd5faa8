//! Robotagent CLI Binary

use anyhow::Context;
use clap::Parser;
use robotagent::logging;
use robotagent::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context = CliContext::new(&cli.config, cli.log_level.clone())
        .context("initializing configuration")?;
    logging::init_logging(Some(&context.settings().system), cli.log_file.clone())
        .context("initializing logging")?;

    let output = context.execute(&cli.command)?;
    println!("{}", output);
    Ok(())
}
