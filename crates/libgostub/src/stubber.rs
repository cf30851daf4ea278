//! The stub generator and its worker pool.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

use tracing::{info, warn};

use crate::{
    allowlist::ImportAllowlist,
    ast::Package,
    emit::Emitter,
    error::{Result, StubError},
    frontmatter::FrontmatterConfig,
    gofmt::GoFormatter,
    gomod::ModuleFile,
    listing::{ListItem, list_package},
    loader::PackageLoader,
    sink::OutputSink,
};

/// Stubber turns Go package declaration trees into compile-only stub packages.
///
/// Every exported function keeps its signature and gets a body that panics.
/// Types are re-declared structurally. References to packages outside the
/// import allowlist are erased to a placeholder interface so that the stub
/// compiles without them.
#[derive(Debug, Clone)]
pub struct Stubber {
    /// Qualifiers that survive into stub text.
    allow: ImportAllowlist,

    /// Also allow standard library imports of each package.
    allow_std: bool,

    /// Also allow imports of other loaded packages.
    allow_local: bool,

    /// Whether to read declarations from test files.
    include_tests: bool,

    /// Whether to stub non-exported functions and methods.
    private: bool,

    /// Whether to emit import lines for allowed qualifiers.
    imports: bool,

    /// Whether to emit the generated-file header.
    frontmatter: bool,

    /// Whether to pipe stubs through goimports or gofmt.
    format: bool,

    /// Number of packages processed at once.
    jobs: usize,

    /// Whether to stop scheduling packages after the first failure.
    fail_fast: bool,
}

impl Default for Stubber {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one package.
#[derive(Debug)]
pub struct PackageOutcome {
    /// Canonical package path.
    pub path: String,
    /// Where the stub was written, or why it was not.
    pub result: Result<PathBuf>,
}

/// Result of a generation run, one outcome per attempted package.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Outcomes in package path order.
    pub outcomes: Vec<PackageOutcome>,
}

impl GenerateReport {
    /// Locations of the stubs that were written.
    pub fn written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(PathBuf::as_path))
            .collect()
    }

    /// Packages that failed, with their errors.
    pub fn failures(&self) -> Vec<(&str, &StubError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.path.as_str(), e)))
            .collect()
    }

    /// Whether every attempted package succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

impl Stubber {
    /// Creates a new Stubber with default configuration: empty allowlist,
    /// exported declarations only, frontmatter and import lines on, no
    /// external formatting, one package at a time.
    pub fn new() -> Self {
        Self {
            allow: ImportAllowlist::new(),
            allow_std: false,
            allow_local: false,
            include_tests: false,
            private: false,
            imports: true,
            frontmatter: true,
            format: false,
            jobs: 1,
            fail_fast: false,
        }
    }

    /// Sets the qualifiers allowed to appear unerased.
    pub fn with_allowlist(mut self, allow: ImportAllowlist) -> Self {
        self.allow = allow;
        self
    }

    /// Enables or disables allowing each package's standard library imports.
    pub fn with_allow_std(mut self, allow_std: bool) -> Self {
        self.allow_std = allow_std;
        self
    }

    /// Enables or disables allowing imports of other loaded packages.
    pub fn with_allow_local(mut self, allow_local: bool) -> Self {
        self.allow_local = allow_local;
        self
    }

    /// Enables or disables reading test files.
    pub fn with_include_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Enables or disables stubbing non-exported functions and methods.
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Enables or disables import lines for allowed qualifiers.
    pub fn with_imports(mut self, imports: bool) -> Self {
        self.imports = imports;
        self
    }

    /// Enables or disables the generated-file header.
    pub fn with_frontmatter(mut self, frontmatter: bool) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Enables or disables the external formatter pass.
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    /// Sets how many packages are processed at once. Zero is treated as one.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Enables or disables stopping after the first failed package.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Loads the packages selected by `patterns`.
    pub fn load(&self, loader: &dyn PackageLoader, patterns: &[String]) -> Result<Vec<Package>> {
        loader.load(patterns, self.include_tests)
    }

    /// The emitter this configuration implies.
    fn emitter(&self) -> Emitter {
        let frontmatter = if self.frontmatter {
            FrontmatterConfig::enabled()
        } else {
            FrontmatterConfig::disabled()
        };
        Emitter::new()
            .with_private(self.private)
            .with_imports(self.imports)
            .with_frontmatter(frontmatter)
    }

    /// The allowlist for one package.
    fn allowlist_for(&self, pkg: &Package, local_paths: &[String]) -> ImportAllowlist {
        if !self.allow_std && !self.allow_local {
            return self.allow.clone();
        }
        let local: &[String] = if self.allow_local { local_paths } else { &[] };
        self.allow.for_package(pkg, self.allow_std, local)
    }

    /// The external formatter to use, if formatting is enabled and one exists.
    fn formatter(&self) -> Option<GoFormatter> {
        if !self.format {
            return None;
        }
        let formatter = GoFormatter::detect();
        if formatter.is_none() {
            warn!("neither goimports nor gofmt found on PATH, writing unformatted stubs");
        }
        formatter
    }

    /// Renders the stub text of one package.
    ///
    /// `local_paths` are the canonical paths of all packages in the run.
    pub fn render_package(&self, pkg: &Package, local_paths: &[String]) -> Result<String> {
        self.render_with(pkg, local_paths, self.formatter().as_ref())
    }

    /// Render, then format when a formatter is given.
    fn render_with(
        &self,
        pkg: &Package,
        local_paths: &[String],
        formatter: Option<&GoFormatter>,
    ) -> Result<String> {
        let allow = self.allowlist_for(pkg, local_paths);
        let text = self
            .emitter()
            .emit(pkg, &allow)
            .map_err(|e| e.in_package(&pkg.path))?;
        match formatter {
            Some(formatter) => formatter
                .format(&text)
                .map_err(|e| e.in_package(&pkg.path)),
            None => Ok(text),
        }
    }

    /// Renders every package, returning `(path, text)` pairs in path order.
    pub fn render_all(&self, packages: &[Package]) -> Vec<(String, Result<String>)> {
        let local_paths = local_paths(packages);
        let formatter = self.formatter();
        self.run_each(packages, |pkg| {
            self.render_with(pkg, &local_paths, formatter.as_ref())
        })
    }

    /// Renders every package and writes it to `sink`.
    ///
    /// A failed package never prevents its siblings from being written unless
    /// fail-fast is enabled. No partial file is written for a failed package.
    pub fn generate(&self, packages: &[Package], sink: &dyn OutputSink) -> GenerateReport {
        let local_paths = local_paths(packages);
        let formatter = self.formatter();
        let outcomes = self
            .run_each(packages, |pkg| {
                let text = self.render_with(pkg, &local_paths, formatter.as_ref())?;
                write_stub(sink, pkg, &text).map_err(|e| e.in_package(&pkg.path))
            })
            .into_iter()
            .map(|(path, result)| PackageOutcome { path, result })
            .collect();
        GenerateReport { outcomes }
    }

    /// Loads packages with `loader` and writes their stubs to `sink`.
    ///
    /// With `module_dir`, the module file found there is reproduced at
    /// `module_out`, provided at least one stub was written.
    pub fn generate_from(
        &self,
        loader: &dyn PackageLoader,
        patterns: &[String],
        sink: &dyn OutputSink,
        module: Option<(&Path, &Path)>,
    ) -> Result<GenerateReport> {
        let module_file = module
            .map(|(module_dir, _)| ModuleFile::read(module_dir))
            .transpose()?;
        let packages = self.load(loader, patterns)?;
        let report = self.generate(&packages, sink);
        if let (Some(file), Some((_, out))) = (module_file, module) {
            if report.written().is_empty() {
                warn!(module = %file.module, "no stubs written, skipping module file");
            } else {
                file.write(out)?;
                info!(module = %file.module, "wrote module file");
            }
        }
        Ok(report)
    }

    /// Lists the functions and methods of every package.
    pub fn list(&self, packages: &[Package]) -> Result<Vec<ListItem>> {
        let mut items = Vec::new();
        for pkg in packages {
            items.extend(list_package(pkg, self.private)?);
        }
        Ok(items)
    }

    /// Apply `work` to every package, sequentially or on a scoped worker
    /// pool, and return the results in package order.
    ///
    /// With fail-fast, packages not yet started after a failure are skipped
    /// and absent from the result.
    fn run_each<T, F>(&self, packages: &[Package], work: F) -> Vec<(String, Result<T>)>
    where
        T: Send,
        F: Fn(&Package) -> Result<T> + Sync,
    {
        let stop = AtomicBool::new(false);
        let slots: Vec<Mutex<Option<Result<T>>>> =
            packages.iter().map(|_| Mutex::new(None)).collect();
        let next = AtomicUsize::new(0);

        let worker = || {
            loop {
                if self.fail_fast && stop.load(Ordering::SeqCst) {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(pkg) = packages.get(index) else {
                    break;
                };
                let result = work(pkg);
                match &result {
                    Ok(_) => info!(package = %pkg.path, "stubbed package"),
                    Err(e) => {
                        warn!(package = %pkg.path, error = %e, "failed to stub package");
                        stop.store(true, Ordering::SeqCst);
                    }
                }
                if let Ok(mut slot) = slots[index].lock() {
                    *slot = Some(result);
                }
            }
        };

        let workers = self.jobs.min(packages.len());
        if workers <= 1 {
            worker();
        } else {
            thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(worker);
                }
            });
        }

        slots
            .into_iter()
            .zip(packages)
            .filter_map(|(slot, pkg)| {
                let result = slot.into_inner().ok().flatten()?;
                Some((pkg.path.clone(), result))
            })
            .collect()
    }
}

/// Canonical paths of all packages in a run.
fn local_paths(packages: &[Package]) -> Vec<String> {
    packages.iter().map(|p| p.path.clone()).collect()
}

/// Write one stub through the sink.
fn write_stub(sink: &dyn OutputSink, pkg: &Package, text: &str) -> Result<PathBuf> {
    let file_name = pkg.stub_file_name();
    let location = sink.location(&pkg.path, &file_name);
    let mut out = sink.create(&pkg.path, &file_name)?;
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| StubError::OutputWrite {
            path: location.clone(),
            source,
        })?;
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Declaration, Field, TypeNode},
        sink::MemorySink,
    };
    use pretty_assertions::assert_eq;

    fn good(path: &str) -> Package {
        Package::new("good", path).with_decl(Declaration::Func {
            name: "Run".to_string(),
            recv: None,
            params: vec![],
            results: None,
        })
    }

    fn bad(path: &str) -> Package {
        Package::new("bad", path).with_decl(Declaration::Type {
            name: "Broken".to_string(),
            ty: TypeNode::Unknown,
        })
    }

    #[test]
    fn failures_are_isolated() {
        let packages = vec![good("a/one"), bad("b/two"), good("c/three")];
        let sink = MemorySink::new();
        let report = Stubber::new().generate(&packages, &sink);

        assert!(!report.is_success());
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.written().len(), 2);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "b/two");
        assert!(matches!(
            failures[0].1.root_cause(),
            StubError::UnsupportedTypeNode { .. }
        ));

        let files = sink.files();
        assert_eq!(files.len(), 2);
        assert!(files.contains_key(Path::new("a/one/good.go")));
        assert!(!files.contains_key(Path::new("b/two/bad.go")));
    }

    #[test]
    fn fail_fast_stops_scheduling() {
        let packages = vec![bad("a/one"), good("b/two")];
        let sink = MemorySink::new();
        let report = Stubber::new().with_fail_fast(true).generate(&packages, &sink);
        assert_eq!(report.outcomes.len(), 1);
        assert!(sink.files().is_empty());
    }

    #[test]
    fn parallel_results_keep_package_order() {
        let packages: Vec<_> = (0..16).map(|i| good(&format!("pkg/{i:02}"))).collect();
        let sink = MemorySink::new();
        let report = Stubber::new().with_jobs(4).generate(&packages, &sink);

        assert!(report.is_success());
        let paths: Vec<_> = report.outcomes.iter().map(|o| o.path.clone()).collect();
        let expected: Vec<_> = packages.iter().map(|p| p.path.clone()).collect();
        assert_eq!(paths, expected);
        assert_eq!(sink.files().len(), 16);
    }

    #[test]
    fn derived_allowlists() {
        let pkg = Package::new("geo", "example.com/geo")
            .with_import(None, "time")
            .with_import(None, "example.com/units")
            .with_decl(Declaration::Type {
                name: "Span".to_string(),
                ty: TypeNode::Struct {
                    fields: vec![
                        Field::new(["D"], TypeNode::qualified("time", "Duration")),
                        Field::new(["U"], TypeNode::qualified("units", "Meter")),
                    ],
                },
            });
        let local = vec!["example.com/geo".to_string(), "example.com/units".to_string()];

        let plain = Stubber::new()
            .with_frontmatter(false)
            .render_package(&pkg, &local)
            .unwrap();
        assert!(plain.contains("type Span struct {D Embedme; U Embedme}"));
        assert!(!plain.contains("import"));

        let derived = Stubber::new()
            .with_frontmatter(false)
            .with_allow_std(true)
            .with_allow_local(true)
            .render_package(&pkg, &local)
            .unwrap();
        assert!(derived.contains("import \"time\"\nimport \"example.com/units\""));
        assert!(derived.contains("type Span struct {D time.Duration; U units.Meter}"));
    }

    #[test]
    fn listing_respects_private() {
        let pkg = good("a/one").with_decl(Declaration::Func {
            name: "hidden".to_string(),
            recv: None,
            params: vec![],
            results: None,
        });
        let packages = vec![pkg];
        assert_eq!(Stubber::new().list(&packages).unwrap().len(), 1);
        assert_eq!(
            Stubber::new().with_private(true).list(&packages).unwrap().len(),
            2
        );
    }
}
