//! Output abstraction and shared command context.

use tokio_util::sync::CancellationToken;

use stencil::feed::HttpFeedClient;
use stencil::installer::{FileNameReader, PackageInstaller, SourceRegistry};

/// Installer type the CLI wires up.
pub type CliInstaller = PackageInstaller<FileNameReader, HttpFeedClient, HttpFeedClient>;

/// Trait for writing messages to the user.
///
/// Handlers produce output through this abstraction instead of
/// `println!` directly, so tests can capture what a command printed.
pub trait Output {
    /// Print a line of text.
    fn println(&self, message: &str);

    /// Print an empty line.
    fn newline(&self) {
        self.println("");
    }

    /// Print a section header.
    fn header(&self, title: &str) {
        self.println(title);
        self.println(&"=".repeat(title.len()));
    }

    /// Print an indented line.
    fn indented(&self, message: &str) {
        self.println(&format!("  {}", message));
    }
}

/// Console-backed output.
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn println(&self, message: &str) {
        println!("{}", message);
    }
}

/// Everything a command handler needs to run.
pub struct CommandContext<'a> {
    /// The wired-up installer.
    pub installer: &'a CliInstaller,
    /// Registry of installed sources in the install root.
    pub registry: &'a SourceRegistry,
    /// Where user-facing messages go.
    pub output: &'a dyn Output,
    /// Cancellation for long-running operations (Ctrl-C).
    pub cancel: CancellationToken,
}

#[cfg(test)]
pub mod test_support {
    use super::Output;
    use std::sync::Mutex;

    /// Output that records every printed line.
    #[derive(Default)]
    pub struct RecordingOutput {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingOutput {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl Output for RecordingOutput {
        fn println(&self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }
    }
}
