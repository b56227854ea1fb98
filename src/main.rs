// src/main.rs

use std::process::ExitCode;

use fleetrun::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("fleetrun error: {err:?}");
        return ExitCode::FAILURE;
    }

    match fleetrun::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            eprintln!("fleetrun error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
