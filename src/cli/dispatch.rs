use anyhow::Result;

use super::env::CliArgs;
use super::info::cmd_info;
use super::runtime::LoadedConfig;
use super::scan::cmd_scan;
use super::watch::cmd_watch;
use crate::cli::commands::Commands;

pub async fn dispatch(cli: &CliArgs, loaded: &LoadedConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Scan(args) => cmd_scan(args, &loaded.config, cli.output).await,
        Commands::Watch(args) => cmd_watch(args, &loaded.config, cli.output).await,
        Commands::Info => cmd_info(loaded, cli.output).await,
    }
}
