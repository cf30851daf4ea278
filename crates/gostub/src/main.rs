//! Command line front end for libgostub.

use std::{
    env,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    process::{self, Command, Stdio},
    thread,
};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use libgostub::{DirSink, ImportAllowlist, JsonLoader, Package, Stubber, highlight_code};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GOSTUB_LOG";

/// Generate compile-only stub packages from Go declaration trees.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Declaration tree patterns: a JSON file, a directory, or `dir/...`
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Import qualifier to keep instead of erasing (repeatable)
    #[arg(short = 'a', long = "allow-import", action = ArgAction::Append)]
    allow_import: Vec<String>,

    /// Also keep qualifiers of standard library imports
    #[arg(long, default_value_t = false)]
    allow_std: bool,

    /// Also keep qualifiers of imports among the loaded packages
    #[arg(long, default_value_t = false)]
    allow_local: bool,

    /// Root directory stubs are written below
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Write a go.mod for the stub tree, copied from --module-dir
    #[arg(short = 'm', long, default_value_t = false)]
    generate_go_mod: bool,

    /// Directory holding the go.mod to reproduce
    #[arg(long, default_value = ".")]
    module_dir: PathBuf,

    /// Include declarations from test files
    #[arg(long, default_value_t = false)]
    include_tests: bool,

    /// Stub non-exported functions and methods too
    #[arg(long, default_value_t = false)]
    private: bool,

    /// Omit the generated-file header
    #[arg(long, default_value_t = false)]
    no_frontmatter: bool,

    /// Omit import lines for allowed qualifiers
    #[arg(long, default_value_t = false)]
    no_imports: bool,

    /// Pipe stubs through goimports or gofmt
    #[arg(long, default_value_t = false)]
    format: bool,

    /// Print stubs to stdout instead of writing files
    #[arg(long, default_value_t = false)]
    stdout: bool,

    /// List functions and methods instead of generating stubs
    #[arg(long, default_value_t = false)]
    list: bool,

    /// With --list, print full signatures
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Number of packages processed at once
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Stop at the first failed package
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// Colorize output
    #[arg(long, default_value = "auto", value_parser = ["auto", "always", "never"], env = "GOSTUB_COLOR")]
    color: String,

    /// Disable paging
    #[arg(long, default_value_t = false)]
    no_page: bool,

    /// Enable quiet mode, only reporting warnings and errors
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

impl Cli {
    /// The stubber these arguments configure.
    fn stubber(&self) -> Stubber {
        Stubber::new()
            .with_allowlist(self.allow_import.iter().cloned().collect::<ImportAllowlist>())
            .with_allow_std(self.allow_std)
            .with_allow_local(self.allow_local)
            .with_include_tests(self.include_tests)
            .with_private(self.private)
            .with_frontmatter(!self.no_frontmatter)
            .with_imports(!self.no_imports)
            .with_format(self.format)
            .with_jobs(self.jobs.max(1))
            .with_fail_fast(self.fail_fast)
    }

    /// Whether stdout output should be highlighted.
    fn should_highlight(&self) -> bool {
        match self.color.as_str() {
            "never" => false,
            "always" => true,
            _ => io::stdout().is_terminal(),
        }
    }
}

/// Install the stderr log subscriber.
fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print the function listing of every loaded package.
fn run_list(cli: &Cli, stubber: &Stubber, packages: &[Package]) -> Result<()> {
    let items = stubber.list(packages)?;
    let output = items
        .iter()
        .map(|item| if cli.verbose { item.verbose() } else { item.short() })
        .collect::<Vec<_>>()
        .join("\n");
    emit_output(cli, output)
}

/// Print the stub of every loaded package.
fn run_stdout(cli: &Cli, stubber: &Stubber, packages: &[Package]) -> Result<()> {
    let mut texts = Vec::new();
    let mut failed = 0;
    for (path, result) in stubber.render_all(packages) {
        match result {
            Ok(text) => texts.push(text),
            Err(e) => {
                error!(package = %path, "{e}");
                failed += 1;
            }
        }
    }
    let mut output = texts.join("\n");
    if cli.should_highlight() {
        output = highlight_code(&output)?;
    }
    emit_output(cli, output)?;
    if failed > 0 {
        bail!("{failed} package(s) failed");
    }
    Ok(())
}

/// Write the stub tree below the output directory.
fn run_generate(cli: &Cli, stubber: &Stubber) -> Result<()> {
    let sink = DirSink::new(&cli.out_dir);
    let module = cli
        .generate_go_mod
        .then_some((cli.module_dir.as_path(), cli.out_dir.as_path()));
    let report = stubber.generate_from(&JsonLoader::new(), &cli.patterns, &sink, module)?;

    for path in report.written() {
        println!("{}", display_relative(path));
    }
    let failures = report.failures();
    for (path, e) in &failures {
        eprintln!("{path}: {e}");
    }
    if !failures.is_empty() {
        bail!("{} of {} package(s) failed", failures.len(), report.outcomes.len());
    }
    Ok(())
}

/// Shorten `path` against the working directory when possible.
fn display_relative(path: &Path) -> String {
    env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Send output to the pager on a terminal, or print it.
fn emit_output(cli: &Cli, output: String) -> Result<()> {
    if io::stdout().is_terminal() && !cli.no_page {
        page_output(output)
    } else {
        println!("{output}");
        Ok(())
    }
}

/// Run the command line.
fn run(cli: &Cli) -> Result<()> {
    let stubber = cli.stubber();
    if cli.list || cli.stdout {
        let packages = stubber
            .load(&JsonLoader::new(), &cli.patterns)
            .context("loading declaration trees")?;
        if cli.list {
            return run_list(cli, &stubber, &packages);
        }
        return run_stdout(cli, &stubber, &packages);
    }
    run_generate(cli, &stubber)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    if let Err(e) = run(&cli) {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

/// Pipe `content` through `$PAGER`, defaulting to `less`.
fn page_output(content: String) -> Result<()> {
    let pager = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut child = Command::new(&pager)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start pager {pager}"))?;

    let mut stdin = child
        .stdin
        .take()
        .context("failed to open stdin for pager")?;

    thread::spawn(move || {
        stdin.write_all(content.as_bytes()).ok();
        // Dropping stdin signals EOF to the pager.
        drop(stdin);
    });

    let status = child.wait().context("failed to wait for pager")?;
    if !status.success() {
        eprintln!("Pager exited with non-zero status: {status}");
    }
    Ok(())
}
