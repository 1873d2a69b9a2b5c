//! Domain-specific errors for the bundling pipeline.

use std::fmt;
use std::io;

use zibundle_schema::SpecError;

/// A failed external command: how it was invoked and how it exited.
#[derive(Debug)]
pub struct ToolFailure {
    /// Rendered command line.
    pub command: String,
    /// Exit code, or `None` when the tool was killed by a signal.
    pub code: Option<i32>,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "`{}` exited with code {}", self.command, code),
            None => write!(f, "`{}` was terminated by a signal", self.command),
        }
    }
}

/// Errors that abort a bundling run.
///
/// A failed availability probe is deliberately absent: it is a signal that
/// sets the compile flag, not an error. Everything here is fatal and
/// propagates untranslated; the child's own diagnostics on stderr are the
/// user-visible explanation.
#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    /// A tool binary could not be spawned at all.
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        /// Program name or path that failed to spawn.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The override archive could not be unpacked.
    #[error("Override archive extraction failed: {0}")]
    Extraction(ToolFailure),

    /// Pre-downloading sources for a dependency failed (Windows-class
    /// probe path).
    #[error("Source predownload failed: {0}")]
    Download(ToolFailure),

    /// The autocompile driver failed.
    #[error("Compile step failed: {0}")]
    Compile(ToolFailure),

    /// The final selection export failed.
    #[error("Selection export failed: {0}")]
    Selection(ToolFailure),

    /// The gather tool failed to materialize resolved packages.
    #[error("Artifact gathering failed: {0}")]
    Gather(ToolFailure),

    /// The output archive could not be created.
    #[error("Archive packaging failed: {0}")]
    Package(ToolFailure),

    /// A dependency spec was malformed.
    #[error("Invalid dependency spec: {0}")]
    Spec(#[from] SpecError),

    /// The manifest file could not be read or parsed.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Filesystem trouble inside the working directory.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_display() {
        let failure = ToolFailure {
            command: "0install select --version 1.0.0 http://e.net/f.xml".to_string(),
            code: Some(1),
        };
        assert_eq!(
            failure.to_string(),
            "`0install select --version 1.0.0 http://e.net/f.xml` exited with code 1"
        );

        let signalled = ToolFailure {
            command: "0install run".to_string(),
            code: None,
        };
        assert!(signalled.to_string().contains("terminated by a signal"));
    }
}
