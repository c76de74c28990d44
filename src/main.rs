use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use k8s_ticket_report::{app, Args, SystemEnvironment, DEFAULT_OUTPUT_FILE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match app::run(&args, &SystemEnvironment, Path::new(DEFAULT_OUTPUT_FILE)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
