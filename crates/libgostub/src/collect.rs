//! Partitioning of a package's declarations.

use tracing::debug;

use crate::{
    ast::{Declaration, Field, Package, TypeNode},
    error::Result,
    visibility::{self, single_receiver},
};

/// A type declaration, borrowed from the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDecl<'a> {
    /// Declared name.
    pub name: &'a str,
    /// Underlying type.
    pub ty: &'a TypeNode,
}

/// A function or method declaration, borrowed from the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncDecl<'a> {
    /// Function name.
    pub name: &'a str,
    /// The receiver, for methods.
    pub recv: Option<&'a Field>,
    /// Parameters.
    pub params: &'a [Field],
    /// Results.
    pub results: Option<&'a [Field]>,
    /// Whether the function passes the export rule.
    pub exported: bool,
}

impl FuncDecl<'_> {
    /// Whether this is a method.
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }
}

/// The declarations of one package, split by kind and kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected<'a> {
    /// Type declarations.
    pub types: Vec<TypeDecl<'a>>,
    /// Function and method declarations, interface method signatures excluded.
    pub funcs: Vec<FuncDecl<'a>>,
}

impl<'a> Collected<'a> {
    /// Functions that pass the export rule, or all of them with `private`.
    pub fn visible_funcs(&self, private: bool) -> impl Iterator<Item = &FuncDecl<'a>> {
        self.funcs.iter().filter(move |f| private || f.exported)
    }
}

/// Walk the declarations of `pkg` once, in order.
///
/// Receivers are validated here, so a malformed method fails the whole
/// package before anything is emitted.
pub fn collect(pkg: &Package) -> Result<Collected<'_>> {
    let mut out = Collected::default();
    for decl in &pkg.decls {
        match decl {
            Declaration::Type { name, ty } => out.types.push(TypeDecl { name, ty }),
            Declaration::Func {
                name,
                recv,
                params,
                results,
            } => {
                if visibility::is_interface_method(decl).map_err(|e| e.in_declaration(name))? {
                    debug!(package = %pkg.path, func = %name, "skipping interface method");
                    continue;
                }
                let recv = recv
                    .as_deref()
                    .map(|recv| single_receiver(name, recv))
                    .transpose()
                    .map_err(|e| e.in_declaration(name))?;
                let exported =
                    visibility::is_exported(decl).map_err(|e| e.in_declaration(name))?;
                out.funcs.push(FuncDecl {
                    name,
                    recv,
                    params,
                    results: results.as_deref(),
                    exported,
                });
            }
        }
    }
    debug!(
        package = %pkg.path,
        types = out.types.len(),
        funcs = out.funcs.len(),
        "collected declarations"
    );
    Ok(out)
}
