//! CLI commands for managing template packages.
//!
//! Commands follow a handler pattern with trait-based output:
//!
//! - `args`: clap-derived argument types
//! - `traits`: the `Output` abstraction and shared `CommandContext`
//! - `handlers`: business logic per subcommand
//!
//! Handlers depend only on the context, so tests drive them with a
//! recording output and a temp-dir install root.

mod args;
mod handlers;
mod traits;

pub use args::{Cli, Commands};

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use stencil::config::InstallerConfig;
use stencil::feed::HttpFeedClient;
use stencil::installer::{FileNameReader, PackageInstaller, SourceRegistry};

use crate::error::CliError;
use traits::{CommandContext, ConsoleOutput};

/// Default installation directory: `~/.stencil/packages`.
fn default_install_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stencil")
        .join("packages")
}

/// Wire up the installer and run the requested command.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let install_dir = cli.install_dir.unwrap_or_else(default_install_dir);

    let config = InstallerConfig::new(&install_dir);
    let client = HttpFeedClient::with_timeout(config.http_timeout)
        .with_default_feeds(config.default_feeds.clone());
    let installer = PackageInstaller::new(config, FileNameReader::new(), client.clone(), client);
    let registry = SourceRegistry::in_root(&install_dir);
    let output = ConsoleOutput;

    let ctx = CommandContext {
        installer: &installer,
        registry: &registry,
        output: &output,
        cancel,
    };

    match cli.command {
        Commands::Install {
            identifier,
            version,
            feeds,
        } => handlers::install(identifier, version, feeds, &ctx).await,
        Commands::Remove { identifier } => handlers::remove(identifier, &ctx).await,
        Commands::Update {
            identifier,
            version,
        } => handlers::update(identifier, version, &ctx).await,
        Commands::Check => handlers::check(&ctx).await,
        Commands::List { verbose } => handlers::list(verbose, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_install_dir_shape() {
        let dir = default_install_dir();
        assert!(dir.ends_with(PathBuf::from(".stencil").join("packages")));
    }
}
