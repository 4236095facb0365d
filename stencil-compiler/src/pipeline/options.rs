//! Compile options and their per-call resolution.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::{
    DefaultPluginSet, PluginAdapter, PluginEnv, PluginMeta, PluginRef, PluginRegistry,
    PluginSource, Stage, Syntax,
};

/// One ordered list per stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePlugins<T> {
    pub ast: Vec<T>,
}

impl<T> Default for StagePlugins<T> {
    fn default() -> Self {
        Self { ast: Vec::new() }
    }
}

impl<T> StagePlugins<T> {
    pub fn stage(&self, stage: Stage) -> &[T] {
        match stage {
            Stage::Ast => &self.ast,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut Vec<T> {
        match stage {
            Stage::Ast => &mut self.ast,
        }
    }
}

/// Options supplied by the caller of a compile.
#[derive(Debug, Clone, Default)]
pub struct UserOptions {
    pub is_production: bool,
    /// Plugins added for this call only, after the registered ones.
    pub plugins: StagePlugins<PluginRef>,
    pub module_name: Option<String>,
    pub strict_mode: bool,
    pub meta: IndexMap<String, serde_json::Value>,
}

impl UserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn production(mut self, is_production: bool) -> Self {
        self.is_production = is_production;
        self
    }

    pub fn plugin(mut self, stage: Stage, plugin: PluginRef) -> Self {
        self.plugins.stage_mut(stage).push(plugin);
        self
    }

    pub fn module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Fully resolved options for exactly one compile call.
///
/// Every value returned by [`OptionsResolver::resolve`] owns all of its
/// fields, so mutating one never affects another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    pub is_production: bool,
    pub plugins: StagePlugins<PluginAdapter>,
    pub module_name: Option<String>,
    pub strict_mode: bool,
    pub meta: IndexMap<String, serde_json::Value>,
}

impl CompileOptions {
    /// The environment handed to each plugin of this compile.
    pub fn plugin_env(&self) -> PluginEnv {
        PluginEnv {
            syntax: Syntax,
            meta: PluginMeta {
                module_name: self.module_name.clone(),
                is_production: self.is_production,
                strict_mode: self.strict_mode,
                meta: self.meta.clone(),
            },
        }
    }
}

/// Builds a fresh [`CompileOptions`] from the defaults, the registry and the
/// caller's options.
#[derive(Debug, Clone)]
pub struct OptionsResolver {
    registry: Arc<PluginRegistry>,
    defaults: Arc<DefaultPluginSet>,
}

impl OptionsResolver {
    /// A resolver over the built-in default set.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            defaults: DefaultPluginSet::builtin(),
        }
    }

    /// Replace the default set.
    pub fn with_defaults(mut self, defaults: Arc<DefaultPluginSet>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn defaults(&self) -> &Arc<DefaultPluginSet> {
        &self.defaults
    }

    /// Resolve the options for one compile call.
    ///
    /// Each stage's list is the mode-adjusted defaults, then the registered
    /// plugins in registration order, then the caller's ad hoc plugins. A
    /// plugin both registered and passed ad hoc appears twice.
    pub fn resolve(&self, options: &UserOptions) -> CompileOptions {
        let mut plugins = StagePlugins::default();

        for stage in Stage::ALL {
            let resolved = plugins.stage_mut(stage);

            resolved.extend(
                self.defaults
                    .plugins(stage, options.is_production)
                    .into_iter()
                    .map(|p| PluginAdapter::new(p, PluginSource::Builtin)),
            );
            resolved.extend(
                self.registry
                    .list_stage(stage)
                    .into_iter()
                    .map(|p| PluginAdapter::new(p, PluginSource::Registered)),
            );

            let mut ad_hoc: Vec<&PluginRef> = Vec::new();
            for plugin in options.plugins.stage(stage) {
                if !ad_hoc.contains(&plugin) {
                    ad_hoc.push(plugin);
                }
            }
            resolved.extend(
                ad_hoc
                    .into_iter()
                    .map(|p| PluginAdapter::new(p.clone(), PluginSource::AdHoc)),
            );

            debug!(
                %stage,
                production = options.is_production,
                plugins = ?resolved.iter().map(PluginAdapter::name).collect::<Vec<_>>(),
                "resolved plugins"
            );
        }

        CompileOptions {
            is_production: options.is_production,
            plugins,
            module_name: options.module_name.clone(),
            strict_mode: options.strict_mode,
            meta: options.meta.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use stencil_syntax::Visitor;

    use super::*;
    use crate::pipeline::{AstPlugin, DefaultPlugin};

    fn plugin(name: &'static str) -> PluginRef {
        PluginRef::factory(name, move |_env| AstPlugin {
            name: name.into(),
            visitor: Visitor::new(),
        })
    }

    fn names(options: &CompileOptions) -> Vec<&str> {
        options.plugins.ast.iter().map(PluginAdapter::name).collect()
    }

    fn resolver() -> (OptionsResolver, Arc<PluginRegistry>) {
        let registry = Arc::new(PluginRegistry::new());
        let defaults = DefaultPluginSet::new()
            .with(Stage::Ast, DefaultPlugin::Always(plugin("always")))
            .with(Stage::Ast, DefaultPlugin::DebugOnly(plugin("debug-only")));
        let resolver = OptionsResolver::new(registry.clone()).with_defaults(Arc::new(defaults));
        (resolver, registry)
    }

    #[test]
    fn test_order_is_defaults_registry_ad_hoc() {
        let (resolver, registry) = resolver();
        registry.register("ast", plugin("registered")).unwrap();

        let options = resolver.resolve(&UserOptions::new().plugin(Stage::Ast, plugin("ad-hoc")));

        assert_eq!(names(&options), vec!["always", "debug-only", "registered", "ad-hoc"]);
        let sources: Vec<_> = options.plugins.ast.iter().map(PluginAdapter::source).collect();
        assert_eq!(
            sources,
            vec![
                PluginSource::Builtin,
                PluginSource::Builtin,
                PluginSource::Registered,
                PluginSource::AdHoc
            ]
        );
    }

    #[test]
    fn test_ad_hoc_is_not_registered() {
        let (resolver, registry) = resolver();
        resolver.resolve(&UserOptions::new().plugin(Stage::Ast, plugin("ad-hoc")));

        assert!(registry.is_empty());
        assert_eq!(names(&resolver.resolve(&UserOptions::new())), vec!["always", "debug-only"]);
    }

    #[test]
    fn test_ad_hoc_deduplicated_within_call() {
        let (resolver, _) = resolver();
        let p = plugin("ad-hoc");
        let options =
            resolver.resolve(&UserOptions::new().plugin(Stage::Ast, p.clone()).plugin(Stage::Ast, p));

        assert_eq!(names(&options), vec!["always", "debug-only", "ad-hoc"]);
    }

    #[test]
    fn test_registered_and_ad_hoc_both_appear() {
        let (resolver, registry) = resolver();
        let p = plugin("twice");
        registry.register("ast", p.clone()).unwrap();

        let options = resolver.resolve(&UserOptions::new().plugin(Stage::Ast, p));

        assert_eq!(names(&options), vec!["always", "debug-only", "twice", "twice"]);
    }

    #[test]
    fn test_pass_through_fields() {
        let (resolver, _) = resolver();
        let options = resolver.resolve(
            &UserOptions::new()
                .module_name("app/templates/index")
                .strict_mode(true)
                .meta("author", "me"),
        );

        assert_eq!(options.module_name.as_deref(), Some("app/templates/index"));
        assert!(options.strict_mode);
        assert_eq!(options.meta["author"], serde_json::json!("me"));

        let env = options.plugin_env();
        assert_eq!(env.meta.module_name.as_deref(), Some("app/templates/index"));
        assert!(!env.meta.is_production);
    }

    #[test]
    fn test_production_drops_debug_only() {
        let (resolver, _) = resolver();
        let options = resolver.resolve(&UserOptions::new().production(true));
        assert!(options.is_production);
        assert_eq!(names(&options), vec!["always"]);
    }
}
