mod cli;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    pondwatch_lib::init_tracing();

    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
