//! Plugin pipeline for the Stencil template compiler.
//!
//! Each compile resolves a fresh [`CompileOptions`] from three sources, in
//! order: the built-in [`DefaultPluginSet`] (with debug-only plugins dropped
//! or swapped in production), the process-wide [`PluginRegistry`], and the
//! caller's ad hoc plugins. The [`Compiler`] then parses the template, applies
//! every resolved plugin exactly once, and generates the wire format.
//!
//! # Module Organization
//!
//! - [`pipeline`] - Stages, plugin references, registry, option resolution and the driver
//! - [`plugins`] - Built-in AST plugins
//! - [`generate`] - The JSON wire-format generator
//! - [`config`] - `stencil.toml` loading

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod config;
mod error;
pub mod generate;
pub mod pipeline;
pub mod plugins;

pub use config::StencilToml;
pub use error::{BoxError, CompileError, ConfigError};
pub use generate::{CompiledTemplate, Generator, WireGenerator};
pub use pipeline::{
    AstPlugin, AstSnapshots, CompileObserver, CompileOptions, Compiler, DefaultPlugin,
    DefaultPluginSet, LegacyTransform, OptionsResolver, PluginAdapter, PluginEnv, PluginKind,
    PluginMeta, PluginRef, PluginRegistry, PluginSource, Stage, Syntax, UserOptions,
};
pub use stencil_syntax as syntax;
