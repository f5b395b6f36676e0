//! Command dispatch.

use super::command::{Cli, Commands, ConfigCommand};
use super::{config, opportunities, output, scan, settle, sweep};
use crate::app::{AppContext, Config};
use crate::error::Result;

/// Load configuration, set up output and logging, and run the command.
pub async fn run(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));

    let config = Config::discover(cli.config.as_deref())?;
    config.init_logging();

    match cli.command {
        Commands::Config(ConfigCommand::Validate) => config::execute_validate(&config),
        Commands::Config(ConfigCommand::Show) => config::execute_show(&config),
        Commands::Scan(args) => scan::execute(&AppContext::open(config)?, &args).await,
        Commands::Opportunities(args) => {
            opportunities::execute(&AppContext::open(config)?, &args).await
        }
        Commands::Settle(args) => settle::execute(&AppContext::open(config)?, &args).await,
        Commands::Sweep => sweep::execute(&AppContext::open(config)?).await,
    }
}
