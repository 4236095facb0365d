//! Built-in AST plugins.
//!
//! The default set, in order:
//!
//! | plugin | kind | mode |
//! |---|---|---|
//! | `transform-quoted-bindings` | factory | always |
//! | `transform-has-block-syntax` | factory | always |
//! | `assert-reserved-named-arguments` | factory | debug only |
//! | `assert-if-helper-without-arguments` | legacy | debug only |
//! | `assert-debugger-without-arguments` / `strip-debug-statements` | factory / legacy | debug / production |
//!
//! Optional plugins are not part of the default set and are registered by
//! name, e.g. from the `[plugins]` table of `stencil.toml`.

use stencil_syntax::Span;

use crate::pipeline::{DefaultPlugin, DefaultPluginSet, PluginRef, Stage};

pub mod debug_statements;
pub mod has_block;
pub mod if_without_arguments;
pub mod quoted_bindings;
pub mod reserved_named_arguments;
pub mod test_selectors;

/// Build the built-in default set.
pub(crate) fn default_set() -> DefaultPluginSet {
    DefaultPluginSet::new()
        .with(Stage::Ast, DefaultPlugin::Always(quoted_bindings::plugin()))
        .with(Stage::Ast, DefaultPlugin::Always(has_block::plugin()))
        .with(
            Stage::Ast,
            DefaultPlugin::DebugOnly(reserved_named_arguments::plugin()),
        )
        .with(
            Stage::Ast,
            DefaultPlugin::DebugOnly(if_without_arguments::plugin()),
        )
        .with(
            Stage::Ast,
            DefaultPlugin::DebugPair {
                debug: debug_statements::assert_plugin(),
                production: debug_statements::strip_plugin(),
            },
        )
}

/// Names of the optional plugins.
pub const OPTIONAL: &[&str] = &[test_selectors::NAME];

/// Look up an optional plugin by name.
pub fn optional(name: &str) -> Option<PluginRef> {
    match name {
        test_selectors::NAME => Some(test_selectors::plugin()),
        _ => None,
    }
}

/// Append the template location to a plugin error message.
pub(crate) fn located(message: impl std::fmt::Display, module: Option<&str>, span: Span) -> String {
    match module {
        Some(module) => format!("{message} ('{module}' @ byte {})", span.start),
        None => format!("{message} (@ byte {})", span.start),
    }
}
