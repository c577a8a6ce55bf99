use std::process::ExitCode;

use clap::Parser as _;
use restcheck::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    restcheck::logging::init();
    cli::execute(Cli::parse()).await
}
