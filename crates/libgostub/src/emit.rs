//! Assembly of stub translation units.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    allowlist::ImportAllowlist,
    ast::{Field, Package, TypeNode},
    collect::{FuncDecl, TypeDecl, collect},
    error::{Result, StubError},
    format::{PLACEHOLDER, format_signature, format_type, unsupported},
    frontmatter::FrontmatterConfig,
};

/// Body given to every stubbed function.
pub const STUB_BODY: &str = "\tpanic(\"stub\")";

/// A stub file, held as ordered sections until rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubUnit {
    /// Comment lines ahead of the package clause.
    pub frontmatter: Vec<String>,
    /// The package clause.
    pub header: String,
    /// Import lines.
    pub imports: Vec<String>,
    /// Declaration of the placeholder type.
    pub placeholder: String,
    /// Re-declared types, in source order.
    pub types: Vec<String>,
    /// Stubbed functions and methods, in source order.
    pub funcs: Vec<String>,
}

impl StubUnit {
    /// Join all sections into source text.
    pub fn render(&self) -> String {
        let mut blocks = Vec::new();
        if !self.frontmatter.is_empty() {
            blocks.push(self.frontmatter.join("\n"));
        }
        blocks.push(self.header.clone());
        if !self.imports.is_empty() {
            blocks.push(self.imports.join("\n"));
        }
        blocks.push(self.placeholder.clone());
        blocks.extend(self.types.iter().cloned());
        blocks.extend(self.funcs.iter().cloned());

        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }
}

/// Renders packages into stub source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    /// Also stub non-exported functions and methods.
    private: bool,
    /// Emit import lines for allowed qualifiers.
    imports: bool,
    /// Generated-file comments.
    frontmatter: FrontmatterConfig,
}

impl Emitter {
    /// An emitter producing the bare stub: no frontmatter, no imports,
    /// exported functions only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include non-exported functions and methods.
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Emit import lines for the package imports whose qualifier is allowed.
    pub fn with_imports(mut self, imports: bool) -> Self {
        self.imports = imports;
        self
    }

    /// Set the frontmatter configuration.
    pub fn with_frontmatter(mut self, frontmatter: FrontmatterConfig) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Emit the stub for `pkg` as text.
    pub fn emit(&self, pkg: &Package, allow: &ImportAllowlist) -> Result<String> {
        Ok(self.build(pkg, allow)?.render())
    }

    /// Build the structured stub for `pkg`.
    ///
    /// Any malformed declaration fails the whole unit.
    pub fn build(&self, pkg: &Package, allow: &ImportAllowlist) -> Result<StubUnit> {
        let collected = collect(pkg)?;

        let mut unit = StubUnit {
            frontmatter: self
                .frontmatter
                .render(&pkg.path, allow, self.private)
                .unwrap_or_default(),
            header: format!("package {}", pkg.name),
            placeholder: format!("type {PLACEHOLDER} interface{{}}"),
            ..StubUnit::default()
        };

        if self.imports {
            unit.imports = render_imports(pkg, allow);
        }

        for decl in &collected.types {
            debug!(package = %pkg.path, name = decl.name, "stubbing type");
            unit.types
                .push(render_type_decl(decl, allow).map_err(|e| e.in_declaration(decl.name))?);
        }

        for decl in collected.visible_funcs(self.private) {
            debug!(package = %pkg.path, name = decl.name, "stubbing function");
            unit.funcs
                .push(render_func_decl(decl, allow).map_err(|e| e.in_declaration(decl.name))?);
        }

        Ok(unit)
    }
}

/// Emit the bare stub for `pkg`.
pub fn emit(pkg: &Package, allow: &ImportAllowlist) -> Result<String> {
    Emitter::new().emit(pkg, allow)
}

/// Import lines for allowed qualifiers, first occurrence of each qualifier wins.
fn render_imports(pkg: &Package, allow: &ImportAllowlist) -> Vec<String> {
    let mut seen = HashSet::new();
    pkg.imports
        .iter()
        .filter_map(|import| {
            let qualifier = import.qualifier()?;
            if !allow.allows(qualifier) || !seen.insert(qualifier) {
                return None;
            }
            Some(match &import.name {
                Some(name) => format!("import {name} \"{}\"", import.path),
                None => format!("import \"{}\"", import.path),
            })
        })
        .collect()
}

/// Re-declare a type.
fn render_type_decl(decl: &TypeDecl<'_>, allow: &ImportAllowlist) -> Result<String> {
    let name = decl.name;
    Ok(match decl.ty {
        TypeNode::Struct { fields } => {
            format!("type {name} struct {{{}}}", render_struct_fields(fields, allow)?)
        }
        TypeNode::Interface { methods } => {
            format!(
                "type {name} interface {{\n{}}}",
                render_interface_methods(methods, allow)?
            )
        }
        other => format!("type {name} {}", format_type(other, allow)?),
    })
}

/// Struct members as `X int; Y int`.
///
/// Co-declared names are split into one member each. An anonymous member whose
/// type was erased renders as the placeholder, which Go reads as a field named
/// `Embedme`.
fn render_struct_fields(fields: &[Field], allow: &ImportAllowlist) -> Result<String> {
    let mut members = Vec::new();
    for field in fields {
        if matches!(field.ty, TypeNode::Variadic { .. }) {
            return Err(unsupported(&field.ty));
        }
        let ty = format_type(&field.ty, allow)?;
        if field.is_anonymous() {
            members.push(ty);
        } else {
            members.extend(field.names.iter().map(|name| format!("{name} {ty}")));
        }
    }
    Ok(members.join("; "))
}

/// One line per method signature. Members without a function type are skipped.
fn render_interface_methods(methods: &[Field], allow: &ImportAllowlist) -> Result<String> {
    let mut out = String::new();
    for method in methods {
        let TypeNode::Func { params, results } = &method.ty else {
            debug!(member = ?method.ty, "skipping embedded interface member");
            continue;
        };
        for name in &method.names {
            out.push('\t');
            out.push_str(&format_signature(name, params, results.as_deref(), allow)?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// `func (r T) Name(params) results` for a function or method.
pub fn func_signature(decl: &FuncDecl<'_>, allow: &ImportAllowlist) -> Result<String> {
    let recv = match decl.recv {
        Some(field) => {
            let [name] = field.names.as_slice() else {
                return Err(StubError::MalformedReceiver {
                    func: decl.name.to_string(),
                    reason: format!(
                        "expected one receiver name, found {}",
                        field.names.len()
                    ),
                });
            };
            format!("({name} {}) ", format_type(&field.ty, allow)?)
        }
        None => String::new(),
    };
    let signature = format_signature(decl.name, decl.params, decl.results, allow)?;
    Ok(format!("func {recv}{signature}"))
}

/// Signature and failing body of a function or method.
fn render_func_decl(decl: &FuncDecl<'_>, allow: &ImportAllowlist) -> Result<String> {
    Ok(format!(
        "{} {{\n{STUB_BODY}\n}}",
        func_signature(decl, allow)?
    ))
}
