//! Stencil CLI - command-line interface for template package management.

mod commands;
mod error;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use stencil::logging::{default_log_dir, default_log_file, init_logging};

use crate::commands::{dispatch, Cli};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    // Ctrl-C cancels the in-flight operation instead of killing the
    // process mid-write.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            signal_cancel.cancel();
        }
    });

    if let Err(e) = dispatch(cli, cancel).await {
        e.exit();
    }
}
