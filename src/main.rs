use std::process::ExitCode;

use clap::Parser;
use codepaste_lib::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match codepaste_lib::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
