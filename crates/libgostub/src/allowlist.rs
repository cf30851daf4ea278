//! Qualifiers allowed to survive into stub text.

use std::collections::BTreeSet;

use crate::ast::Package;

/// The set of import qualifiers the emitter may reference in output text.
///
/// A qualified type whose qualifier is not in the set is erased to the
/// placeholder type. Built once before emission and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportAllowlist {
    /// Allowed qualifiers.
    qualifiers: BTreeSet<String>,
    /// Allow every qualifier.
    all: bool,
}

impl ImportAllowlist {
    /// An empty allowlist: every external qualifier is erased.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allowlist that erases nothing, for rendering declarations as written.
    pub fn everything() -> Self {
        Self {
            qualifiers: BTreeSet::new(),
            all: true,
        }
    }

    /// Whether `qualifier` may appear verbatim.
    pub fn allows(&self, qualifier: &str) -> bool {
        self.all || self.qualifiers.contains(qualifier)
    }

    /// Number of allowed qualifiers.
    pub fn len(&self) -> usize {
        self.qualifiers.len()
    }

    /// Whether no qualifier is allowed.
    pub fn is_empty(&self) -> bool {
        !self.all && self.qualifiers.is_empty()
    }

    /// Allowed qualifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.qualifiers.iter().map(String::as_str)
    }

    /// A copy of this allowlist extended with qualifiers derived from the
    /// imports of `pkg`.
    ///
    /// With `std`, imports of standard library paths are added. With
    /// `local_paths`, imports of any of the given package paths are added.
    pub fn for_package(&self, pkg: &Package, std: bool, local_paths: &[String]) -> Self {
        let mut qualifiers = self.qualifiers.clone();
        for import in &pkg.imports {
            let Some(qualifier) = import.qualifier() else {
                continue;
            };
            let local = local_paths.iter().any(|path| *path == import.path);
            if (std && import.is_std()) || local {
                qualifiers.insert(qualifier.to_string());
            }
        }
        Self {
            qualifiers,
            all: self.all,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ImportAllowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            qualifiers: iter
                .into_iter()
                .map(Into::into)
                .filter(|q: &String| !q.is_empty())
                .collect(),
            all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let allow = ImportAllowlist::new();
        assert!(allow.is_empty());
        assert!(!allow.allows("fmt"));
    }

    #[test]
    fn everything_allows_all() {
        let allow = ImportAllowlist::everything();
        assert!(allow.allows("external"));
        assert!(!allow.is_empty());
    }

    #[test]
    fn built_from_configuration() {
        let allow: ImportAllowlist = ["time", "", "context", "time"].into_iter().collect();
        assert_eq!(allow.len(), 2);
        assert!(allow.allows("time"));
        assert!(allow.allows("context"));
        assert!(!allow.allows(""));
        assert_eq!(allow.iter().collect::<Vec<_>>(), vec!["context", "time"]);
    }

    #[test]
    fn derived_per_package() {
        let pkg = Package::new("geo", "example.com/geo")
            .with_import(None, "net/http")
            .with_import(Some("u"), "example.com/geo/units")
            .with_import(None, "github.com/acme/widget")
            .with_import(Some("_"), "embed");
        let base: ImportAllowlist = ["errors"].into_iter().collect();
        let local = vec!["example.com/geo/units".to_string()];

        let std_only = base.for_package(&pkg, true, &[]);
        assert!(std_only.allows("errors"));
        assert!(std_only.allows("http"));
        assert!(!std_only.allows("u"));
        assert!(!std_only.allows("widget"));
        assert!(!std_only.allows("_"));

        let with_local = base.for_package(&pkg, false, &local);
        assert!(with_local.allows("u"));
        assert!(!with_local.allows("http"));

        // The base list is untouched.
        assert_eq!(base.len(), 1);
    }
}
