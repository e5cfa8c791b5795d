pub mod core;
mod commands;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub use commands::{
    execute, package, publish, release_archives, usage, Command, Invocation, PackageReport,
    PublishTarget,
};

/// Entry point for the `mod-deploy` binary.
pub async fn run() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mod_deploy_lib=debug")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage());
            return ExitCode::from(2);
        }
    };

    tracing::info!("mod-deploy {} starting...", env!("CARGO_PKG_VERSION"));

    match execute(invocation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
