//! The plugin pipeline.
//!
//! This module resolves which AST plugins run for a compile and in what
//! order, normalises both plugin authoring conventions, and drives a template
//! through them.
//!
//! ```text
//! DefaultPluginSet ─┐
//! PluginRegistry  ──┼─> OptionsResolver ─> CompileOptions ─> Compiler
//! UserOptions     ──┘                       (PluginAdapter)   parse → plugins → generate
//! ```

mod adapter;
mod defaults;
mod driver;
mod observer;
mod options;
mod plugin;
mod registry;
mod snapshot;
mod stage;

pub use adapter::{PluginAdapter, PluginSource};
pub use defaults::{DefaultPlugin, DefaultPluginSet};
pub use driver::{Compiler, DefaultParser, TemplateParser};
pub use observer::CompileObserver;
pub use options::{CompileOptions, OptionsResolver, StagePlugins, UserOptions};
pub use plugin::{AstPlugin, LegacyTransform, PluginEnv, PluginKind, PluginMeta, PluginRef, Syntax};
pub use registry::PluginRegistry;
pub use snapshot::{AstSnapshots, PluginSnapshot};
pub use stage::Stage;
