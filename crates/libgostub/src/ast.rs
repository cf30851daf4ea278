//! Declaration tree model for Go packages.
//!
//! The tree is produced by an external front end and read as JSON. Every node
//! is a plain value: there are no back references, and recursive named types
//! are referred to by name rather than embedded, so walking a tree always
//! terminates.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

bitflags! {
    /// Direction of a channel type, following the Go AST encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChanDir: u8 {
        /// Values can be sent on the channel.
        const SEND = 1;
        /// Values can be received from the channel.
        const RECV = 2;
        /// A plain `chan T`.
        const BOTH = Self::SEND.bits() | Self::RECV.bits();
    }
}

impl Serialize for ChanDir {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ChanDir {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits)
            .ok_or_else(|| de::Error::custom(format!("invalid channel direction bits {bits}")))
    }
}

/// An ordered list of fields.
pub type FieldList = Vec<Field>;

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// An identifier, optionally qualified by an import name: `T` or `pkg.T`.
    Named {
        /// Import qualifier, when the name is a selector expression.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
        /// The identifier itself.
        name: String,
    },
    /// `*T`
    Pointer {
        /// Pointee type.
        elem: Box<TypeNode>,
    },
    /// `[N]T`, or `[]T` when the length is absent.
    Array {
        /// Length expression.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        len: Option<Box<TypeNode>>,
        /// Element type.
        elem: Box<TypeNode>,
    },
    /// `[]T`
    Slice {
        /// Element type.
        elem: Box<TypeNode>,
    },
    /// `...T` in the final parameter of a signature.
    Variadic {
        /// Element type.
        elem: Box<TypeNode>,
    },
    /// `func(params) results`
    Func {
        /// Parameter list.
        #[serde(default)]
        params: FieldList,
        /// Result list, absent for functions returning nothing.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<FieldList>,
    },
    /// `map[K]V`
    Map {
        /// Key type.
        key: Box<TypeNode>,
        /// Value type.
        value: Box<TypeNode>,
    },
    /// `chan T`, `<-chan T` or `chan<- T`.
    Channel {
        /// Direction bits.
        dir: ChanDir,
        /// Element type.
        elem: Box<TypeNode>,
    },
    /// Literal text, used for constant array lengths.
    Literal {
        /// Source text of the literal.
        value: String,
    },
    /// `interface { ... }`
    Interface {
        /// Methods and embedded members.
        #[serde(default)]
        methods: FieldList,
    },
    /// `struct { ... }`
    Struct {
        /// Struct members.
        #[serde(default)]
        fields: FieldList,
    },
    /// A node kind the front end produced that this model does not know.
    #[serde(other)]
    Unknown,
}

impl TypeNode {
    /// An unqualified identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: None,
            name: name.into(),
        }
    }

    /// A qualified identifier, `qualifier.name`.
    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    /// A pointer to `elem`.
    pub fn pointer(elem: Self) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    /// A slice of `elem`.
    pub fn slice(elem: Self) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    /// A fixed array of `elem` with a literal length.
    pub fn array(len: impl Into<String>, elem: Self) -> Self {
        Self::Array {
            len: Some(Box::new(Self::Literal { value: len.into() })),
            elem: Box::new(elem),
        }
    }

    /// A variadic parameter type.
    pub fn variadic(elem: Self) -> Self {
        Self::Variadic {
            elem: Box::new(elem),
        }
    }

    /// A map type.
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// A channel type.
    pub fn channel(dir: ChanDir, elem: Self) -> Self {
        Self::Channel {
            dir,
            elem: Box::new(elem),
        }
    }

    /// A function type.
    pub fn func(params: FieldList, results: Option<FieldList>) -> Self {
        Self::Func { params, results }
    }
}

/// A group of names sharing one type: struct members, parameters, results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Declared names, in source order. Empty for anonymous fields.
    #[serde(default)]
    pub names: Vec<String>,
    /// The shared type.
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

impl Field {
    /// A field declaring `names` of type `ty`.
    pub fn new<I, S>(names: I, ty: TypeNode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ty,
        }
    }

    /// An anonymous field: an embedded type or an unnamed parameter.
    pub fn anonymous(ty: TypeNode) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }

    /// Whether the field has no names.
    pub fn is_anonymous(&self) -> bool {
        self.names.is_empty()
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    /// `type Name <type>`
    Type {
        /// Declared name.
        name: String,
        /// Underlying type.
        #[serde(rename = "type")]
        ty: TypeNode,
    },
    /// A function, or a method when `recv` is present.
    Func {
        /// Function name.
        name: String,
        /// Receiver field list.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recv: Option<FieldList>,
        /// Parameters.
        #[serde(default)]
        params: FieldList,
        /// Results.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        results: Option<FieldList>,
    },
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Type { name, .. } | Self::Func { name, .. } => name,
        }
    }
}

/// An import record of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Explicit import name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Import path, unquoted.
    pub path: String,
}

impl Import {
    /// The qualifier this import introduces into the file scope.
    ///
    /// Blank (`_`) and dot imports introduce none. Unnamed imports use the
    /// last path element, skipping a `/vN` major version element and
    /// dropping a `.vN` suffix: `github.com/x/y/v2` and `gopkg.in/y.v3`
    /// both give `y`.
    pub fn qualifier(&self) -> Option<&str> {
        match self.name.as_deref() {
            Some("_") | Some(".") => None,
            Some(name) => Some(name),
            None => {
                let mut elements = self.path.rsplit('/');
                let mut last = elements.next().filter(|s| !s.is_empty())?;
                if is_major_version(last) {
                    last = elements.next().filter(|s| !s.is_empty())?;
                }
                Some(match last.rsplit_once('.') {
                    Some((base, version)) if !base.is_empty() && is_major_version(version) => base,
                    _ => last,
                })
            }
        }
    }

    /// Whether the path looks like a standard library package.
    ///
    /// Third-party paths carry a domain in their first element.
    pub fn is_std(&self) -> bool {
        self.path
            .split('/')
            .next()
            .is_some_and(|first| !first.contains('.'))
    }
}

/// `v` followed by digits, as in a major version path element.
fn is_major_version(element: &str) -> bool {
    element
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// One loaded package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package {
    /// Package name, as it appears in the package clause.
    pub name: String,
    /// Canonical import path. Unique key.
    pub path: String,
    /// Declarations, in source order.
    pub decls: Vec<Declaration>,
    /// Import records of all files.
    pub imports: Vec<Import>,
}

impl Package {
    /// An empty package.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Append a declaration.
    pub fn with_decl(mut self, decl: Declaration) -> Self {
        self.decls.push(decl);
        self
    }

    /// Append an import record.
    pub fn with_import(mut self, name: Option<&str>, path: impl Into<String>) -> Self {
        self.imports.push(Import {
            name: name.map(str::to_string),
            path: path.into(),
        });
        self
    }

    /// File name of the generated stub.
    pub fn stub_file_name(&self) -> String {
        format!("{}.go", self.name)
    }
}
