use std::process::ExitCode;

use clap::Parser;
use coinshop::cli::{self, Cli};
use coinshop::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli::status_code(&err) >= 500 {
                tracing::error!(error = ?err, "command failed");
            }
            eprintln!("error ({}): {}", cli::status_code(&err), cli::public_message(&err));
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
