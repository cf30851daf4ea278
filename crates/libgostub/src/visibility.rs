//! Export rules for declarations.

use crate::{
    ast::{Declaration, Field, TypeNode},
    error::{Result, StubError},
};

/// Whether an identifier is exported: its first character is upper case.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Whether a declaration is visible outside its package.
///
/// A method is exported only when both its name and its receiver's base type
/// name are exported.
pub fn is_exported(decl: &Declaration) -> Result<bool> {
    match decl {
        Declaration::Type { name, .. } => Ok(is_exported_name(name)),
        Declaration::Func {
            name, recv: None, ..
        } => Ok(is_exported_name(name)),
        Declaration::Func {
            name,
            recv: Some(recv),
            ..
        } => Ok(is_exported_name(receiver_type_name(name, recv)?) && is_exported_name(name)),
    }
}

/// Whether a function declaration is a method signature lifted out of an
/// interface body: its receiver has no names.
pub fn is_interface_method(decl: &Declaration) -> Result<bool> {
    match decl {
        Declaration::Func {
            name,
            recv: Some(recv),
            ..
        } => Ok(single_receiver(name, recv)?.is_anonymous()),
        _ => Ok(false),
    }
}

/// The receiver field of a method, which must be the only one.
pub(crate) fn single_receiver<'a>(func: &str, recv: &'a [Field]) -> Result<&'a Field> {
    match recv {
        [field] => Ok(field),
        _ => Err(StubError::MalformedReceiver {
            func: func.to_string(),
            reason: format!("expected one receiver field, found {}", recv.len()),
        }),
    }
}

/// Name of the locally defined type a method is declared on.
///
/// `(b *Bar)` and `(b Bar)` both yield `Bar`.
pub fn receiver_type_name<'a>(func: &str, recv: &'a [Field]) -> Result<&'a str> {
    let field = single_receiver(func, recv)?;
    let base = match &field.ty {
        TypeNode::Pointer { elem } => elem.as_ref(),
        other => other,
    };
    match base {
        TypeNode::Named {
            qualifier: None,
            name,
        } => Ok(name),
        other => Err(StubError::MalformedReceiver {
            func: func.to_string(),
            reason: format!("receiver base type is not a local identifier: {other:?}"),
        }),
    }
}
