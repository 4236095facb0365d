//! Normalisation of both plugin conventions into one execution contract.

use serde::Serialize;
use stencil_syntax::Template;
use tracing::trace;

use super::plugin::{PluginEnv, PluginKind, PluginRef, PluginShape};
use crate::error::CompileError;

/// Where a resolved plugin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginSource {
    /// The built-in default set.
    Builtin,
    /// The process-wide registry.
    Registered,
    /// The `plugins` of a single compile call.
    AdHoc,
}

impl PluginSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginSource::Builtin => "built-in",
            PluginSource::Registered => "registered",
            PluginSource::AdHoc => "ad hoc",
        }
    }
}

impl std::fmt::Display for PluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A plugin in canonical form, ready to be applied to one template.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginAdapter {
    plugin: PluginRef,
    source: PluginSource,
}

impl PluginAdapter {
    pub(crate) fn new(plugin: PluginRef, source: PluginSource) -> Self {
        Self { plugin, source }
    }

    /// The name the plugin reference was created with.
    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    pub fn kind(&self) -> PluginKind {
        self.plugin.kind()
    }

    pub fn source(&self) -> PluginSource {
        self.source
    }

    pub fn plugin(&self) -> &PluginRef {
        &self.plugin
    }

    /// Returns true if this adapter wraps exactly `plugin` (by identity).
    pub fn is(&self, plugin: &PluginRef) -> bool {
        self.plugin == *plugin
    }

    /// Construct the plugin once, run it over the whole template and check
    /// the result.
    ///
    /// Factories are invoked once and their visitor is handed to a single
    /// traversal; legacy transforms are constructed once and asked to
    /// transform the template once. Errors name a factory by the name its
    /// [`AstPlugin`](super::AstPlugin) reports and a legacy transform by its
    /// reference name.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Plugin`] if a handler or the transform fails,
    /// and [`CompileError::InvalidAst`] if the rewritten template does not
    /// validate.
    pub fn apply_once(&self, mut ast: Template, env: &PluginEnv) -> Result<Template, CompileError> {
        let name = match self.plugin.shape() {
            PluginShape::Factory(factory) => {
                let mut plugin = factory(env);
                trace!(plugin = %plugin.name, kinds = ?plugin.visitor.kinds(), "constructed visitor");
                env.syntax
                    .traverse(&mut ast, &mut plugin.visitor)
                    .map_err(|e| CompileError::plugin(plugin.name.clone(), e))?;
                plugin.name
            }
            PluginShape::Legacy(construct) => {
                let mut transform = construct(env.clone());
                trace!(plugin = %self.name(), "constructed legacy transform");
                ast = transform
                    .transform(ast)
                    .map_err(|e| CompileError::plugin(self.name(), e))?;
                self.name().to_string()
            }
        };

        env.syntax
            .validate(&ast)
            .map_err(|source| CompileError::InvalidAst {
                plugin: name,
                source,
            })?;
        Ok(ast)
    }
}

impl From<PluginRef> for PluginAdapter {
    fn from(plugin: PluginRef) -> Self {
        Self::new(plugin, PluginSource::AdHoc)
    }
}
