// billow-focusd - Focus Mode session engine for Billow
mod cli;
mod core;
mod domain;
mod infrastructure;

use clap::Parser;
use cli::args::Args;
use cli::commands::execute_command;
use domain::error::FocusError;

#[tokio::main]
async fn main() -> Result<(), FocusError> {
    let args = Args::parse();

    match execute_command(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
