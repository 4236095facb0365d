//! Plugins command report data structures.

use stencil_compiler::{PluginKind, PluginSource, Stage};

use super::output::{Output, Report};

/// The plugin pipeline a compile would run.
#[derive(Debug)]
pub struct PluginsReport {
    pub is_production: bool,
    pub stage: Stage,
    /// Resolved plugins in execution order.
    pub entries: Vec<PluginEntry>,
    /// Optional plugins that are not registered.
    pub optional: Vec<String>,
}

#[derive(Debug)]
pub struct PluginEntry {
    pub name: String,
    pub kind: PluginKind,
    pub source: PluginSource,
}

impl Report for PluginsReport {
    fn render(&self, out: &mut dyn Output) {
        out.key_value(
            "mode",
            if self.is_production {
                "production"
            } else {
                "debug"
            },
        );
        out.newline();

        out.section(&format!("{} plugins", self.stage));
        for (i, entry) in self.entries.iter().enumerate() {
            out.numbered_item(
                i + 1,
                &format!("{} ({}, {})", entry.name, entry.kind, entry.source),
            );
        }

        if !self.optional.is_empty() {
            out.newline();
            out.section("available");
            for name in &self.optional {
                out.list_item(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    #[test]
    fn test_render() {
        let report = PluginsReport {
            is_production: false,
            stage: Stage::Ast,
            entries: vec![PluginEntry {
                name: "transform-quoted-bindings".into(),
                kind: PluginKind::Factory,
                source: PluginSource::Builtin,
            }],
            optional: vec!["strip-test-selectors".into()],
        };

        let mut out = BufferOutput::default();
        report.render(&mut out);

        assert_eq!(
            out.lines,
            vec![
                "mode: debug",
                "",
                "ast plugins:",
                "1. transform-quoted-bindings (factory, built-in)",
                "",
                "available:",
                "- strip-test-selectors",
            ]
        );
    }
}
