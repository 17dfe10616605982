//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and appropriate exit codes.

use std::fmt;
use std::process;

use stencil::installer::InstallerError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// An installer operation failed
    Installer(InstallerError),
    /// The named package is not installed
    NotInstalled(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Installer(InstallerError::InvalidSource { .. }) => {
                eprintln!();
                eprintln!("Check that the feed URI is correct and reachable.");
            }
            CliError::Installer(InstallerError::DownloadFailed { .. }) => {
                eprintln!();
                eprintln!("A staged archive may already exist at the destination;");
                eprintln!("use 'stencil list' to inspect installed packages.");
            }
            CliError::NotInstalled(_) => {
                eprintln!();
                eprintln!("Use 'stencil list' to see installed packages.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Installer(e) => write!(f, "{}", e),
            CliError::NotInstalled(identifier) => {
                write!(f, "Package '{}' is not installed", identifier)
            }
        }
    }
}

impl From<InstallerError> for CliError {
    fn from(e: InstallerError) -> Self {
        CliError::Installer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CliError::NotInstalled("acme.webapi".to_string());
        assert_eq!(err.to_string(), "Package 'acme.webapi' is not installed");

        let err = CliError::Installer(InstallerError::Generic("boom".to_string()));
        assert_eq!(err.to_string(), "boom");
    }
}
