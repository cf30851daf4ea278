//! Loading of package declaration trees.
//!
//! The trees are produced by an external Go front end, one JSON document per
//! file. A document holds either a single package or an array of packages:
//!
//! ```json
//! {
//!   "name": "geo",
//!   "path": "example.com/geo",
//!   "files": [
//!     { "name": "geo.go", "imports": [{"path": "time"}], "decls": [] },
//!     { "name": "geo_test.go", "test": true, "decls": [] }
//!   ]
//! }
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    ast::{Declaration, Import, Package},
    error::{Result, StubError},
};

/// Suffix that makes a directory pattern recursive.
const RECURSIVE_SUFFIX: &str = "/...";

/// Resolves package-selection patterns into packages.
pub trait PackageLoader {
    /// Load the packages selected by `patterns`, deduplicated by path.
    ///
    /// With `include_tests`, declarations from test files are included.
    fn load(&self, patterns: &[String], include_tests: bool) -> Result<Vec<Package>>;
}

/// Collapse packages sharing a canonical path.
///
/// The last entry for a path wins. The result is ordered by path.
pub fn dedup_packages<I: IntoIterator<Item = Package>>(packages: I) -> Vec<Package> {
    let mut by_path = BTreeMap::new();
    for pkg in packages {
        if let Some(previous) = by_path.insert(pkg.path.clone(), pkg) {
            debug!(path = %previous.path, "replacing duplicate package");
        }
    }
    by_path.into_values().collect()
}

/// One source file of a package document.
#[derive(Debug, Deserialize)]
struct SourceFile {
    /// File name, for diagnostics.
    #[serde(default)]
    name: String,
    /// Whether this is a test file.
    #[serde(default)]
    test: bool,
    /// Import records.
    #[serde(default)]
    imports: Vec<Import>,
    /// Declarations, in source order.
    #[serde(default)]
    decls: Vec<Declaration>,
}

/// A package document.
#[derive(Debug, Deserialize)]
struct PackageSource {
    /// Package name.
    name: String,
    /// Canonical import path.
    path: String,
    /// Files, in the order the front end listed them.
    #[serde(default)]
    files: Vec<SourceFile>,
}

impl PackageSource {
    /// Flatten the files into one package.
    fn into_package(self, include_tests: bool) -> Package {
        let mut pkg = Package::new(self.name, self.path);
        for file in self.files {
            if file.test && !include_tests {
                debug!(package = %pkg.path, file = %file.name, "skipping test file");
                continue;
            }
            pkg.imports.extend(file.imports);
            pkg.decls.extend(file.decls);
        }
        pkg
    }
}

/// A JSON document: one package or several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    /// A single package.
    One(PackageSource),
    /// Several packages.
    Many(Vec<PackageSource>),
}

/// Loads declaration trees from JSON files.
///
/// A pattern is a file, a directory (its `*.json` files), or a directory
/// followed by `/...` (its `*.json` files, recursively).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    /// Create a loader.
    pub fn new() -> Self {
        Self
    }

    /// The files a pattern selects, sorted.
    pub fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let (root, recursive) = match pattern.strip_suffix(RECURSIVE_SUFFIX) {
            Some(root) => (if root.is_empty() { "." } else { root }, true),
            None => (pattern, false),
        };
        let root = Path::new(root);

        let mut files = Vec::new();
        if root.is_file() && !recursive {
            files.push(root.to_path_buf());
        } else if root.is_dir() {
            collect_json(root, recursive, &mut files).map_err(|e| load_error(pattern, e))?;
            files.sort();
        } else {
            return Err(load_error(pattern, "no such file or directory"));
        }

        if files.is_empty() {
            return Err(load_error(pattern, "matched no declaration trees"));
        }
        Ok(files)
    }

    /// Parse one document.
    fn read_file(&self, path: &Path, include_tests: bool) -> Result<Vec<Package>> {
        let shown = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| load_error(&shown, e))?;
        let document: Document =
            serde_json::from_str(&content).map_err(|e| load_error(&shown, e))?;
        let sources = match document {
            Document::One(source) => vec![source],
            Document::Many(sources) => sources,
        };
        debug!(file = %shown, packages = sources.len(), "read declaration tree");
        Ok(sources
            .into_iter()
            .map(|source| source.into_package(include_tests))
            .collect())
    }
}

impl PackageLoader for JsonLoader {
    fn load(&self, patterns: &[String], include_tests: bool) -> Result<Vec<Package>> {
        let mut packages = Vec::new();
        for pattern in patterns {
            for file in self.resolve(pattern)? {
                packages.extend(self.read_file(&file, include_tests)?);
            }
        }
        let loaded = packages.len();
        let packages = dedup_packages(packages);
        info!(loaded, unique = packages.len(), "loaded packages");
        Ok(packages)
    }
}

/// Build a load error for `pattern`.
fn load_error(pattern: &str, reason: impl ToString) -> StubError {
    StubError::Load {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

/// Gather `*.json` files under `dir`.
fn collect_json(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_json(&path, recursive, out)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}
