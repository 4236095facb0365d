//! Process-scoped registry of custom plugins.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::debug;

use super::{PluginRef, Stage};
use crate::error::ConfigError;

/// Custom plugins per stage, kept in registration order.
///
/// Each stage's list is identity-unique: registering a reference that is
/// already present does nothing. The registry is shared through an `Arc` and
/// lives until it is dropped or [`clear`](Self::clear)ed.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    stages: Mutex<IndexMap<Stage, Vec<PluginRef>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin to a stage unless it is already registered there.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] if `stage` names no stage.
    pub fn register(&self, stage: &str, plugin: PluginRef) -> Result<(), ConfigError> {
        self.register_stage(stage.parse()?, plugin);
        Ok(())
    }

    /// Remove every occurrence of a plugin from a stage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] if `stage` names no stage.
    pub fn unregister(&self, stage: &str, plugin: &PluginRef) -> Result<(), ConfigError> {
        self.unregister_stage(stage.parse()?, plugin);
        Ok(())
    }

    /// Snapshot of a stage's plugins in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] if `stage` names no stage.
    pub fn list(&self, stage: &str) -> Result<Vec<PluginRef>, ConfigError> {
        Ok(self.list_stage(stage.parse()?))
    }

    pub fn register_stage(&self, stage: Stage, plugin: PluginRef) {
        let mut stages = self.lock();
        let plugins = stages.entry(stage).or_default();
        if plugins.contains(&plugin) {
            debug!(%stage, plugin = plugin.name(), "plugin already registered");
            return;
        }
        debug!(%stage, plugin = plugin.name(), "registered plugin");
        plugins.push(plugin);
    }

    pub fn unregister_stage(&self, stage: Stage, plugin: &PluginRef) {
        if let Some(plugins) = self.lock().get_mut(&stage) {
            let before = plugins.len();
            plugins.retain(|p| p != plugin);
            debug!(%stage, plugin = plugin.name(), removed = before - plugins.len(), "unregistered plugin");
        }
    }

    pub fn list_stage(&self, stage: Stage) -> Vec<PluginRef> {
        self.lock().get(&stage).cloned().unwrap_or_default()
    }

    /// Remove every registered plugin from every stage.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Total number of registered plugins across stages.
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a half-updated Vec behind,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, IndexMap<Stage, Vec<PluginRef>>> {
        self.stages.lock().unwrap_or_else(PoisonError::into_inner)
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

    #[test]
    fn test_register_is_idempotent() {
        let registry = PluginRegistry::new();
        let a = plugin("a");

        registry.register("ast", a.clone()).unwrap();
        registry.register("ast", a.clone()).unwrap();

        assert_eq!(registry.list("ast").unwrap(), vec![a]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_code_different_identity() {
        let registry = PluginRegistry::new();
        registry.register("ast", plugin("a")).unwrap();
        registry.register("ast", plugin("a")).unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = PluginRegistry::new();
        let (a, b, c) = (plugin("a"), plugin("b"), plugin("c"));
        registry.register("ast", b.clone()).unwrap();
        registry.register("ast", a.clone()).unwrap();
        registry.register("ast", c.clone()).unwrap();

        let names: Vec<_> = registry
            .list("ast")
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let registry = PluginRegistry::new();
        let a = plugin("a");

        registry.unregister("ast", &a).unwrap();
        registry.register("ast", a.clone()).unwrap();
        registry.unregister("ast", &a).unwrap();
        registry.unregister("ast", &a).unwrap();

        assert!(registry.list("ast").unwrap().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let registry = PluginRegistry::new();
        let a = plugin("a");
        registry.register("ast", a.clone()).unwrap();

        let mut snapshot = registry.list("ast").unwrap();
        snapshot.clear();

        assert_eq!(registry.list("ast").unwrap(), vec![a]);
    }

    #[test]
    fn test_unknown_stage() {
        let registry = PluginRegistry::new();
        let err = registry.register("glimmer", plugin("a")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStage { .. }));
        assert!(registry.unregister("glimmer", &plugin("a")).is_err());
        assert!(registry.list("glimmer").is_err());
    }

    #[test]
    fn test_clear() {
        let registry = PluginRegistry::new();
        registry.register("ast", plugin("a")).unwrap();
        registry.clear();
        assert!(registry.is_empty());
    }
}
