use std::process::ExitCode;

use clap::Parser;

use crate::cli::{App, Commands};

mod cli;
mod cmd;
mod config;
mod logging;
mod manifest;
mod report;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app = App::parse();
    logging::init(app.verbose)?;

    match &app.cmd {
        Commands::Fetch(arg) => cmd::fetch::run(app.config.as_deref(), arg).await,
        Commands::Scan(arg) => cmd::scan::run(arg),
    }
}
