//! The comment block written ahead of each stub's package clause.

use crate::allowlist::ImportAllowlist;

/// Marker line recognised by Go tooling as flagging a generated file.
pub const GENERATED_MARKER: &str = "// Code generated by gostub. DO NOT EDIT.";

/// Configuration describing optional frontmatter comments rendered ahead of the package clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontmatterConfig {
    /// Whether the frontmatter should be rendered.
    pub enabled: bool,
}

impl FrontmatterConfig {
    /// Create a configuration with frontmatter enabled.
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disable frontmatter rendering entirely.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Render the configured frontmatter when enabled, returning the comment lines.
    pub fn render(
        &self,
        package_path: &str,
        allow: &ImportAllowlist,
        include_private: bool,
    ) -> Option<Vec<String>> {
        if !self.enabled {
            return None;
        }

        let mut settings = vec![format!("package={package_path}")];
        if !allow.is_empty() {
            settings.push(format!("allow={}", allow.iter().collect::<Vec<_>>().join(",")));
        }
        let visibility = if include_private { "private" } else { "public" };
        settings.push(format!("visibility={visibility}"));

        Some(vec![
            GENERATED_MARKER.to_string(),
            format!("// {}", settings.join(" ")),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn disabled_renders_nothing() {
        let allow = ImportAllowlist::new();
        assert_eq!(
            FrontmatterConfig::disabled().render("example.com/p", &allow, false),
            None
        );
    }

    #[test]
    fn enabled_lists_settings() {
        let allow: ImportAllowlist = ["time", "context"].into_iter().collect();
        let lines = FrontmatterConfig::enabled()
            .render("example.com/p", &allow, true)
            .unwrap();
        assert_eq!(
            lines,
            vec![
                GENERATED_MARKER.to_string(),
                "// package=example.com/p allow=context,time visibility=private".to_string(),
            ]
        );
    }
}
