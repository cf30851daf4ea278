//! Errors raised while loading trees and writing stubs.

use std::path::PathBuf;

use thiserror::Error;

use crate::ast::TypeNode;

/// Errors produced while loading declaration trees and emitting stubs.
#[derive(Error, Debug)]
pub enum StubError {
    /// Package resolution or loading failed.
    #[error("Failed to load {pattern}: {reason}")]
    Load {
        /// The pattern that was being resolved.
        pattern: String,
        /// Why loading failed.
        reason: String,
    },

    /// The formatter met a type expression outside the supported grammar.
    #[error("Unsupported type node: {node:?}")]
    UnsupportedTypeNode {
        /// The offending node.
        node: Box<TypeNode>,
    },

    /// A method receiver with the wrong shape.
    #[error("Malformed receiver for {func}: {reason}")]
    MalformedReceiver {
        /// Name of the method declaration.
        func: String,
        /// What is wrong with the receiver.
        reason: String,
    },

    /// The output sink rejected a write.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Context wrapper naming the declaration being emitted.
    #[error("{name}: {source}")]
    Declaration {
        /// Declaration name.
        name: String,
        /// The wrapped error.
        source: Box<StubError>,
    },

    /// Context wrapper naming the package being processed.
    #[error("package {path}: {source}")]
    Package {
        /// Canonical package path.
        path: String,
        /// The wrapped error.
        source: Box<StubError>,
    },

    /// The external formatter rejected the generated text.
    #[error("Formatting error: {0}")]
    Format(String),

    /// Indicates an error occurred during syntax highlighting.
    #[error("Highlighting error: {0}")]
    Highlight(String),

    /// A go.mod file could not be read or did not name a module.
    #[error("Module file error: {0}")]
    ModuleFile(String),

    /// Failed to read a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a declaration tree.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StubError {
    /// Wrap this error with the name of the declaration it came from.
    pub fn in_declaration(self, name: impl Into<String>) -> Self {
        Self::Declaration {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wrap this error with the path of the package it came from.
    pub fn in_package(self, path: impl Into<String>) -> Self {
        Self::Package {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Strip context wrappers, returning the error that caused the failure.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Declaration { source, .. } | Self::Package { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<syntect::Error> for StubError {
    fn from(err: syntect::Error) -> Self {
        Self::Highlight(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StubError>;
