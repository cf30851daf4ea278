//! Reading and writing `go.mod` module files.

use std::{fs, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, StubError};

/// Name of the module file.
pub const MODULE_FILE: &str = "go.mod";

/// Matches the module directive, optionally quoted.
static MODULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?\s*(?://.*)?$"#).expect("valid module regex")
});
/// Matches the go version directive.
static GO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*go\s+(\S+)").expect("valid go directive regex"));

/// The parts of a module file a stub tree needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    /// Module path.
    pub module: String,
    /// Go language version, when declared.
    pub go_version: Option<String>,
}

impl ModuleFile {
    /// Parse the module and go directives out of module file text.
    pub fn parse(content: &str) -> Result<Self> {
        let module = MODULE_RE
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| StubError::ModuleFile("no module directive found".to_string()))?;
        let go_version = GO_RE
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        Ok(Self { module, go_version })
    }

    /// Read `go.mod` from `dir`.
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(MODULE_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| StubError::ModuleFile(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Module file text for the stub tree.
    pub fn render(&self) -> String {
        let mut out = format!("module {}\n", self.module);
        if let Some(version) = &self.go_version {
            out.push_str(&format!("\ngo {version}\n"));
        }
        out
    }

    /// Write the module file into `dir`, creating it if needed.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MODULE_FILE);
        let write_error = |source| StubError::OutputWrite {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(write_error)?;
        fs::write(&path, self.render()).map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parses_directives() {
        let file = ModuleFile::parse(
            "// leading comment\nmodule github.com/acme/geo // trailing\n\ngo 1.22\n\nrequire (\n\tgolang.org/x/mod v0.14.0\n)\n",
        )
        .unwrap();
        assert_eq!(file.module, "github.com/acme/geo");
        assert_eq!(file.go_version.as_deref(), Some("1.22"));

        let quoted = ModuleFile::parse("module \"example.com/q\"\n").unwrap();
        assert_eq!(quoted.module, "example.com/q");
        assert_eq!(quoted.go_version, None);
    }

    #[test]
    fn missing_module_is_an_error() {
        assert!(matches!(
            ModuleFile::parse("go 1.21\n"),
            Err(StubError::ModuleFile(_))
        ));
        let dir = TempDir::new().unwrap();
        assert!(ModuleFile::read(dir.path()).is_err());
    }

    #[test]
    fn round_trips_through_disk() -> Result<()> {
        let src = TempDir::new()?;
        fs::write(src.path().join(MODULE_FILE), "module example.com/geo\n\ngo 1.21\n")?;
        let out = TempDir::new()?;
        let target = out.path().join("stubs");

        ModuleFile::read(src.path())?.write(&target)?;
        assert_eq!(
            fs::read_to_string(target.join(MODULE_FILE))?,
            "module example.com/geo\n\ngo 1.21\n"
        );
        Ok(())
    }
}
