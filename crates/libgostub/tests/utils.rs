// Dead code detection breaks here, because the integration test crates all use a disjoint set of
// the pub items.
#![allow(dead_code)]

use libgostub::{JsonLoader, Package, PackageLoader, Stubber};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

/// Imports every fixture package carries.
const FIXTURE_IMPORTS: &str = r#"[
    {"path": "time"},
    {"path": "io"},
    {"name": "ext", "path": "github.com/acme/external"},
    {"path": "github.com/acme/widget"}
]"#;

fn normalize_whitespace(s: &str) -> String {
    s.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Drop the package clause and the placeholder declaration, which every stub starts with.
fn strip_preamble(s: &str) -> String {
    s.lines()
        .filter(|line| !line.starts_with("package ") && *line != "type Embedme interface{}")
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Wrap a JSON array of declarations into a package document.
pub fn package_json(decls: &str) -> String {
    format!(
        r#"{{"name": "geo", "path": "example.com/geo", "files": [{{"name": "geo.go", "imports": {FIXTURE_IMPORTS}, "decls": {decls}}}]}}"#
    )
}

/// Load a package document through the JSON loader.
pub fn load_documents(documents: &[&str]) -> Vec<Package> {
    let temp_dir = TempDir::new().unwrap();
    for (i, doc) in documents.iter().enumerate() {
        fs::write(temp_dir.path().join(format!("{i:03}.json")), doc).unwrap();
    }
    JsonLoader::new()
        .load(&[temp_dir.path().display().to_string()], false)
        .unwrap()
}

/// Load one package from a JSON array of declarations.
pub fn load_package(decls: &str) -> Package {
    let mut packages = load_documents(&[&package_json(decls)]);
    assert_eq!(packages.len(), 1);
    packages.remove(0)
}

/// The stubber used by plain roundtrips.
pub fn plain_stubber() -> Stubber {
    Stubber::new().with_frontmatter(false)
}

pub fn render(stubber: Stubber, decls: &str, expected_output: &str) {
    let pkg = load_package(decls);
    let rendered = stubber
        .render_package(&pkg, &[pkg.path.clone()])
        .unwrap();

    assert_eq!(
        normalize_whitespace(&strip_preamble(&rendered)),
        normalize_whitespace(expected_output),
    );
}

/// Render roundtrip
pub fn rt(decls: &str, expected_output: &str) {
    render(plain_stubber(), decls, expected_output);
}

pub fn render_err(stubber: Stubber, decls: &str, expected_error: &str) {
    let pkg = load_package(decls);
    let result = stubber.render_package(&pkg, &[]);

    assert!(
        result.is_err(),
        "Expected an error, but rendering succeeded"
    );
    let error_string = result.unwrap_err().to_string();

    assert_eq!(
        error_string, expected_error,
        "Error mismatch.\nExpected: {}\nGot: {}",
        expected_error, error_string
    );
}

#[macro_export]
macro_rules! gen_tests {
    ($prefix:ident, {
        $(rt {
            $rt_name:ident: {
                input: $rt_input:expr,
                output: $rt_output:expr
            }
        })*
        $(rt_custom {
            $rt_custom_name:ident: {
                stubber: $rt_custom_stubber:expr,
                input: $rt_custom_input:expr,
                output: $rt_custom_output:expr
            }
        })*
        $(rt_err {
            $rt_err_name:ident: {
                stubber: $rt_err_stubber:expr,
                input: $rt_err_input:expr,
                error: $rt_err_error:expr
            }
        })*
    }) => {
        mod $prefix {
            use super::*;

            $(
                #[test]
                fn $rt_name() {
                    rt($rt_input, $rt_output);
                }
            )*

            $(
                #[test]
                fn $rt_custom_name() {
                    let custom_stubber = $rt_custom_stubber;
                    render(custom_stubber, $rt_custom_input, $rt_custom_output);
                }
            )*

            $(
                #[test]
                fn $rt_err_name() {
                    let custom_stubber = $rt_err_stubber;
                    render_err(custom_stubber, $rt_err_input, $rt_err_error);
                }
            )*
        }
    };
}
