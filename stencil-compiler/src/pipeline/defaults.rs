//! Built-in plugin lists and the debug/production substitution.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;

use super::{PluginRef, Stage};

/// One entry of a stage's built-in list.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultPlugin {
    /// Runs in every mode.
    Always(PluginRef),
    /// Runs only outside production.
    DebugOnly(PluginRef),
    /// `debug` runs outside production; `production` takes its place in
    /// production builds.
    DebugPair {
        debug: PluginRef,
        production: PluginRef,
    },
}

impl DefaultPlugin {
    /// The plugin active in the given mode, if any.
    pub fn active(&self, is_production: bool) -> Option<&PluginRef> {
        match (self, is_production) {
            (DefaultPlugin::Always(plugin), _) => Some(plugin),
            (DefaultPlugin::DebugOnly(plugin), false) => Some(plugin),
            (DefaultPlugin::DebugOnly(_), true) => None,
            (DefaultPlugin::DebugPair { debug, .. }, false) => Some(debug),
            (DefaultPlugin::DebugPair { production, .. }, true) => Some(production),
        }
    }
}

/// The ordered built-in plugins for each stage.
#[derive(Debug, Clone, Default)]
pub struct DefaultPluginSet {
    stages: IndexMap<Stage, Vec<DefaultPlugin>>,
}

static BUILTIN: LazyLock<Arc<DefaultPluginSet>> =
    LazyLock::new(|| Arc::new(crate::plugins::default_set()));

impl DefaultPluginSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide built-in set. Every call returns the same plugin
    /// identities.
    pub fn builtin() -> Arc<DefaultPluginSet> {
        BUILTIN.clone()
    }

    /// Append an entry to a stage.
    pub fn with(mut self, stage: Stage, entry: DefaultPlugin) -> Self {
        self.stages.entry(stage).or_default().push(entry);
        self
    }

    /// The raw ordered entries of a stage.
    pub fn entries(&self, stage: Stage) -> &[DefaultPlugin] {
        self.stages.get(&stage).map(Vec::as_slice).unwrap_or_default()
    }

    /// The plugins active for a stage in the given mode, in order.
    ///
    /// Debug-only entries are dropped in production and each pair's
    /// production member takes the debug member's position.
    pub fn plugins(&self, stage: Stage, is_production: bool) -> Vec<PluginRef> {
        self.entries(stage)
            .iter()
            .filter_map(|entry| entry.active(is_production))
            .cloned()
            .collect()
    }

    /// The debug-only and paired entries of a stage.
    pub fn debug_plugins(&self, stage: Stage) -> Vec<&DefaultPlugin> {
        self.entries(stage)
            .iter()
            .filter(|entry| !matches!(entry, DefaultPlugin::Always(_)))
            .collect()
    }

    /// Every plugin of a stage regardless of mode, in order.
    pub fn all(&self, stage: Stage) -> Vec<PluginRef> {
        self.entries(stage)
            .iter()
            .flat_map(|entry| match entry {
                DefaultPlugin::Always(plugin) | DefaultPlugin::DebugOnly(plugin) => {
                    vec![plugin.clone()]
                }
                DefaultPlugin::DebugPair { debug, production } => {
                    vec![debug.clone(), production.clone()]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use stencil_syntax::Visitor;

    use super::*;
    use crate::pipeline::AstPlugin;

    fn plugin(name: &'static str) -> PluginRef {
        PluginRef::factory(name, move |_env| AstPlugin {
            name: name.into(),
            visitor: Visitor::new(),
        })
    }

    fn names(plugins: &[PluginRef]) -> Vec<&str> {
        plugins.iter().map(PluginRef::name).collect()
    }

    fn sample() -> DefaultPluginSet {
        DefaultPluginSet::new()
            .with(Stage::Ast, DefaultPlugin::Always(plugin("a")))
            .with(Stage::Ast, DefaultPlugin::DebugOnly(plugin("b")))
            .with(
                Stage::Ast,
                DefaultPlugin::DebugPair {
                    debug: plugin("c-debug"),
                    production: plugin("c-prod"),
                },
            )
            .with(Stage::Ast, DefaultPlugin::Always(plugin("d")))
    }

    #[test]
    fn test_debug_mode_keeps_everything_in_order() {
        let set = sample();
        assert_eq!(names(&set.plugins(Stage::Ast, false)), vec!["a", "b", "c-debug", "d"]);
    }

    #[test]
    fn test_production_substitution() {
        let set = sample();
        assert_eq!(names(&set.plugins(Stage::Ast, true)), vec!["a", "c-prod", "d"]);
    }

    #[test]
    fn test_debug_plugins_table() {
        let set = sample();
        assert_eq!(set.debug_plugins(Stage::Ast).len(), 2);
        assert_eq!(names(&set.all(Stage::Ast)), vec!["a", "b", "c-debug", "c-prod", "d"]);
    }

    #[test]
    fn test_builtin_identities_are_stable() {
        let first = DefaultPluginSet::builtin().plugins(Stage::Ast, false);
        let second = DefaultPluginSet::builtin().plugins(Stage::Ast, false);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_stage() {
        assert!(DefaultPluginSet::new().plugins(Stage::Ast, false).is_empty());
    }
}
