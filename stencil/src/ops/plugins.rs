//! Plugins operation - resolved pipeline listing.

use std::sync::Arc;

use stencil_compiler::{OptionsResolver, PluginRegistry, Stage, UserOptions, plugins::OPTIONAL};

use crate::reports::{PluginEntry, PluginsReport};

/// Resolve the pipeline the given options would run.
pub fn plugins(registry: Arc<PluginRegistry>, options: &UserOptions) -> PluginsReport {
    let resolved = OptionsResolver::new(registry.clone()).resolve(options);

    let registered = registry.list_stage(Stage::Ast);
    let optional = OPTIONAL
        .iter()
        .filter(|name| !registered.iter().any(|p| p.name() == **name))
        .map(|name| name.to_string())
        .collect();

    PluginsReport {
        is_production: resolved.is_production,
        stage: Stage::Ast,
        entries: resolved
            .plugins
            .stage(Stage::Ast)
            .iter()
            .map(|adapter| PluginEntry {
                name: adapter.name().to_string(),
                kind: adapter.kind(),
                source: adapter.source(),
            })
            .collect(),
        optional,
    }
}
