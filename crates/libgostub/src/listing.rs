//! Listing of the functions and methods a package declares.

use crate::{
    allowlist::ImportAllowlist,
    ast::{Package, TypeNode},
    collect::{FuncDecl, collect},
    emit::func_signature,
    error::Result,
};

/// A function or method in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Canonical path of the declaring package.
    pub package: String,
    /// Receiver base type, for methods.
    pub receiver: Option<String>,
    /// Function name.
    pub name: String,
    /// Full signature, with qualifiers as written.
    pub signature: String,
    /// Whether the function passes the export rule.
    pub exported: bool,
}

impl ListItem {
    /// `pkg.Name` or `pkg.Type.Name`.
    pub fn short(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{recv}.{}", self.package, self.name),
            None => format!("{}.{}", self.package, self.name),
        }
    }

    /// `pkg: func (r *Type) Name(params) results`.
    pub fn verbose(&self) -> String {
        format!("{}: {}", self.package, self.signature)
    }
}

/// Build the listing entry for one collected function.
fn list_item(pkg: &Package, decl: &FuncDecl<'_>) -> Result<ListItem> {
    let receiver = decl.recv.map(|field| match &field.ty {
        TypeNode::Pointer { elem } => base_name(elem),
        other => base_name(other),
    });
    Ok(ListItem {
        package: pkg.path.clone(),
        receiver,
        name: decl.name.to_string(),
        signature: func_signature(decl, &ImportAllowlist::everything())?,
        exported: decl.exported,
    })
}

/// Identifier of a receiver base type. Receivers are validated during collection.
fn base_name(node: &TypeNode) -> String {
    match node {
        TypeNode::Named { name, .. } => name.clone(),
        _ => String::new(),
    }
}

/// List the functions and methods of `pkg` in source order.
///
/// Non-exported ones are included with `private`.
pub fn list_package(pkg: &Package, private: bool) -> Result<Vec<ListItem>> {
    let collected = collect(pkg).map_err(|e| e.in_package(&pkg.path))?;
    collected
        .visible_funcs(private)
        .map(|decl| {
            list_item(pkg, decl).map_err(|e| e.in_declaration(decl.name).in_package(&pkg.path))
        })
        .collect()
}
