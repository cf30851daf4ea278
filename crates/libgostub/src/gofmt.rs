//! Post-processing of stub text with the Go toolchain's formatters.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use tracing::debug;

use crate::error::{Result, StubError};

/// An external formatter binary that reads source on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoFormatter {
    /// `goimports`, which also prunes unused imports.
    Goimports(PathBuf),
    /// `gofmt`.
    Gofmt(PathBuf),
}

impl GoFormatter {
    /// Find a formatter on `PATH`, preferring `goimports`.
    pub fn detect() -> Option<Self> {
        if let Ok(path) = which::which("goimports") {
            return Some(Self::Goimports(path));
        }
        which::which("gofmt").ok().map(Self::Gofmt)
    }

    /// Path of the binary.
    pub fn path(&self) -> &Path {
        match self {
            Self::Goimports(path) | Self::Gofmt(path) => path,
        }
    }

    /// Run the formatter over `source`.
    ///
    /// A non-zero exit is an error carrying the formatter's stderr.
    pub fn format(&self, source: &str) -> Result<String> {
        debug!(formatter = %self.path().display(), "formatting stub");
        let mut child = Command::new(self.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StubError::Format(format!("failed to run {}: {e}", self.path().display())))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| StubError::Format("failed to open formatter stdin".to_string()))?;
        let input = source.to_string();
        let writer = thread::spawn(move || {
            let result = stdin.write_all(input.as_bytes());
            // Dropping stdin signals EOF to the formatter.
            drop(stdin);
            result
        });

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| StubError::Format("formatter input thread panicked".to_string()))?;

        // A formatter that exits early closes the pipe; its status explains why.
        if !output.status.success() {
            return Err(StubError::Format(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        written?;
        String::from_utf8(output.stdout)
            .map_err(|e| StubError::Format(format!("formatter produced invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_text_through_the_binary() {
        let formatter = GoFormatter::Gofmt(which::which("cat").unwrap());
        let source = "package geo\n\ntype Embedme interface{}\n";
        assert_eq!(formatter.format(source).unwrap(), source);
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let formatter = GoFormatter::Gofmt(which::which("false").unwrap());
        assert!(matches!(
            formatter.format("package geo\n"),
            Err(StubError::Format(_))
        ));
    }

    #[test]
    fn missing_binary_is_an_error() {
        let formatter = GoFormatter::Goimports(PathBuf::from("/nonexistent/goimports"));
        assert!(matches!(formatter.format(""), Err(StubError::Format(_))));
    }
}
