//! kpisync CLI - score ad-network exports and sync them to a spreadsheet

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, process, sheets, sync};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Sync(args) => sync::execute(args, &cli.global).await,
        cli::Commands::Process(args) => process::execute(args, &cli.global).await,
        cli::Commands::Sheets(args) => sheets::execute(args, &cli.global).await,
        cli::Commands::Check => check::execute(&cli.global).await,
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
