//! Core operations.
//!
//! This module contains the business logic for stencil commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;
pub mod plugins;

pub use check::check;
pub use compile::compile;
pub use plugins::plugins;
