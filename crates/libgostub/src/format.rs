//! Rendering of type expressions to Go source text.

use crate::{
    allowlist::ImportAllowlist,
    ast::{ChanDir, Field, TypeNode},
    error::{Result, StubError},
};

/// Name of the opaque placeholder type that stands in for erased references.
pub const PLACEHOLDER: &str = "Embedme";

/// Text used for an interface type in reference position.
pub const EMPTY_INTERFACE: &str = "interface {}";

/// Render a type expression.
///
/// Qualified names whose qualifier is not allowed are erased to
/// [`PLACEHOLDER`]. Nodes outside the grammar are an error.
pub fn format_type(node: &TypeNode, allow: &ImportAllowlist) -> Result<String> {
    Ok(match node {
        TypeNode::Named {
            qualifier: None,
            name,
        } => name.clone(),
        TypeNode::Named {
            qualifier: Some(qualifier),
            name,
        } => {
            if allow.allows(qualifier) {
                format!("{qualifier}.{name}")
            } else {
                PLACEHOLDER.to_string()
            }
        }
        TypeNode::Pointer { elem } => {
            let inner = format_type(elem, allow)?;
            if inner == PLACEHOLDER {
                inner
            } else {
                format!("*{inner}")
            }
        }
        TypeNode::Array { len, elem } => {
            let len = match len {
                Some(len) => format_type(len, allow)?,
                None => String::new(),
            };
            format!("[{len}]{}", format_type(elem, allow)?)
        }
        TypeNode::Slice { elem } => format!("[]{}", format_type(elem, allow)?),
        TypeNode::Variadic { elem } => format!("...{}", format_type(elem, allow)?),
        TypeNode::Func { params, results } => format!(
            "func({}){}",
            format_field_list(params, allow)?,
            format_results(results.as_deref(), allow)?
        ),
        TypeNode::Map { key, value } => format!(
            "map[{}]{}",
            format_type(key, allow)?,
            format_type(value, allow)?
        ),
        TypeNode::Channel { dir, elem } => {
            let keyword = channel_keyword(*dir).ok_or_else(|| unsupported(node))?;
            format!("{keyword} {}", format_type(elem, allow)?)
        }
        TypeNode::Literal { value } => value.clone(),
        TypeNode::Interface { .. } => EMPTY_INTERFACE.to_string(),
        TypeNode::Struct { .. } | TypeNode::Unknown => return Err(unsupported(node)),
    })
}

/// Keyword text for a channel direction, `None` when no direction bit is set.
fn channel_keyword(dir: ChanDir) -> Option<&'static str> {
    if dir == ChanDir::BOTH {
        Some("chan")
    } else if dir == ChanDir::RECV {
        Some("<- chan")
    } else if dir == ChanDir::SEND {
        Some("chan <-")
    } else {
        None
    }
}

/// Error for a node the formatter cannot render.
pub(crate) fn unsupported(node: &TypeNode) -> StubError {
    StubError::UnsupportedTypeNode {
        node: Box::new(node.clone()),
    }
}

/// Render a parameter-style field list: `a,b int, c string`.
pub fn format_field_list(fields: &[Field], allow: &ImportAllowlist) -> Result<String> {
    let rendered = fields
        .iter()
        .map(|field| {
            let ty = format_type(&field.ty, allow)?;
            Ok(if field.is_anonymous() {
                ty
            } else {
                format!("{} {ty}", field.names.join(","))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

/// Render a result list, including its leading space.
///
/// Absent and empty lists render as nothing. Only a single anonymous result
/// goes without parentheses.
pub fn format_results(results: Option<&[Field]>, allow: &ImportAllowlist) -> Result<String> {
    let Some(results) = results.filter(|r| !r.is_empty()) else {
        return Ok(String::new());
    };
    let list = format_field_list(results, allow)?;
    Ok(if results.len() > 1 || results.iter().any(|f| !f.is_anonymous()) {
        format!(" ({list})")
    } else {
        format!(" {list}")
    })
}

/// Render `name(params) results`.
pub fn format_signature(
    name: &str,
    params: &[Field],
    results: Option<&[Field]>,
    allow: &ImportAllowlist,
) -> Result<String> {
    Ok(format!(
        "{name}({}){}",
        format_field_list(params, allow)?,
        format_results(results, allow)?
    ))
}
