//! End-to-end generation from declaration files to a stub tree on disk.
mod utils;
use std::fs;

use libgostub::{DirSink, GENERATED_MARKER, JsonLoader, MODULE_FILE, Stubber};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use utils::*;

fn write_trees(dir: &TempDir) {
    fs::write(
        dir.path().join("geo.json"),
        package_json(
            r#"[{"decl": "func", "name": "Wait",
                "params": [{"names": ["d"], "type": {"kind": "named", "qualifier": "time", "name": "Duration"}}]}]"#,
        ),
    )
    .unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(
        dir.path().join("nested").join("broken.json"),
        r#"{"name": "broken", "path": "example.com/broken", "files": [{"decls": [
            {"decl": "type", "name": "Bad", "type": {"kind": "index_expr"}}
        ]}]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("nested").join("ok.json"),
        r#"{"name": "ok", "path": "example.com/geo/ok", "files": [{"decls": [{"decl": "func", "name": "Ping"}]}]}"#,
    )
    .unwrap();
}

#[test]
fn writes_stub_tree_and_module_file() {
    let trees = TempDir::new().unwrap();
    write_trees(&trees);
    let module = TempDir::new().unwrap();
    fs::write(module.path().join(MODULE_FILE), "module example.com\n\ngo 1.22\n").unwrap();
    let out = TempDir::new().unwrap();

    let report = Stubber::new()
        .with_allow_std(true)
        .with_jobs(2)
        .generate_from(
            &JsonLoader::new(),
            &[format!("{}/...", trees.path().display())],
            &DirSink::new(out.path()),
            Some((module.path(), out.path())),
        )
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.written().len(), 2);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "example.com/broken");
    assert!(!out.path().join("example.com/broken").exists());

    let geo = fs::read_to_string(out.path().join("example.com/geo/geo.go")).unwrap();
    assert!(geo.starts_with(GENERATED_MARKER));
    assert!(geo.contains("import \"time\"\n"));
    assert!(geo.contains("func Wait(d time.Duration) {\n\tpanic(\"stub\")\n}\n"));
    assert!(out.path().join("example.com/geo/ok/ok.go").is_file());

    assert_eq!(
        fs::read_to_string(out.path().join(MODULE_FILE)).unwrap(),
        "module example.com\n\ngo 1.22\n"
    );
}

#[test]
fn module_file_needs_a_written_stub() {
    let trees = TempDir::new().unwrap();
    fs::write(
        trees.path().join("broken.json"),
        r#"{"name": "broken", "path": "example.com/broken", "files": [{"decls": [
            {"decl": "type", "name": "Bad", "type": {"kind": "index_expr"}}
        ]}]}"#,
    )
    .unwrap();
    let module = TempDir::new().unwrap();
    fs::write(module.path().join(MODULE_FILE), "module example.com\n").unwrap();
    let out = TempDir::new().unwrap();

    let report = Stubber::new()
        .generate_from(
            &JsonLoader::new(),
            &[trees.path().display().to_string()],
            &DirSink::new(out.path()),
            Some((module.path(), out.path())),
        )
        .unwrap();

    assert!(report.written().is_empty());
    assert!(!report.is_success());
    assert!(!out.path().join(MODULE_FILE).exists());
}

#[test]
fn fail_fast_sequential_stops_after_first_failure() {
    let trees = TempDir::new().unwrap();
    write_trees(&trees);
    let out = TempDir::new().unwrap();

    let report = Stubber::new()
        .with_fail_fast(true)
        .generate_from(
            &JsonLoader::new(),
            &[format!("{}/...", trees.path().display())],
            &DirSink::new(out.path()),
            None,
        )
        .unwrap();

    // Packages run in path order: broken, geo, geo/ok.
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.is_success());
}

#[test]
fn unknown_pattern_is_a_load_error() {
    let out = TempDir::new().unwrap();
    let err = Stubber::new()
        .generate_from(
            &JsonLoader::new(),
            &["/nonexistent/trees".to_string()],
            &DirSink::new(out.path()),
            None,
        )
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/trees"), "{err}");
}
