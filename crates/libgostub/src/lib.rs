//! Gostub generates compile-only stub packages from Go declaration trees.
//!
//! For each package it produces a single, syntactically valid Go file that
//! re-declares every type and the signature of every exported function and
//! method, with each body replaced by `panic("stub")`. Downstream code can then
//! build against the package's public surface without its implementation.
//!
//! Types from packages outside a configured import allowlist are erased to a
//! placeholder, `type Embedme interface{}`, so the stub compiles without them.
//!
//! Declaration trees are produced by an external Go front end and loaded from
//! JSON. The output can optionally be passed through `goimports` or `gofmt`.

/// Import qualifier allowlist.
mod allowlist;
/// Declaration tree model.
pub mod ast;
/// Declaration partitioning.
mod collect;
/// Stub assembly.
mod emit;
/// Error types.
mod error;
/// Type expression rendering.
pub mod format;
/// Generated-file header comments.
mod frontmatter;
/// External formatter pass.
mod gofmt;
/// Module file handling.
mod gomod;
/// Terminal highlighting of stub output.
mod highlight;
/// Function listings.
mod listing;
/// Package loading.
mod loader;
/// Output destinations.
mod sink;
/// Orchestration facade.
mod stubber;
/// Export rules.
pub mod visibility;

pub use crate::{
    allowlist::ImportAllowlist,
    ast::{ChanDir, Declaration, Field, FieldList, Import, Package, TypeNode},
    collect::{Collected, FuncDecl, TypeDecl, collect},
    emit::{Emitter, STUB_BODY, StubUnit, emit, func_signature},
    error::{Result, StubError},
    format::{EMPTY_INTERFACE, PLACEHOLDER, format_type},
    frontmatter::{FrontmatterConfig, GENERATED_MARKER},
    gofmt::GoFormatter,
    gomod::{MODULE_FILE, ModuleFile},
    highlight::highlight_code,
    listing::{ListItem, list_package},
    loader::{JsonLoader, PackageLoader, dedup_packages},
    sink::{DirSink, MemorySink, OutputSink},
    stubber::{GenerateReport, PackageOutcome, Stubber},
    visibility::is_exported,
};
