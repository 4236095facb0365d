//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod compile;
mod output;
mod plugins;

pub use check::{CheckReport, FileCheck};
pub use compile::CompileReport;
pub use output::{Report, TerminalOutput};
pub use plugins::{PluginEntry, PluginsReport};
