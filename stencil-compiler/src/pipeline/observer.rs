//! Hooks around each plugin run.

use std::sync::Arc;

use eyre::Result;
use stencil_syntax::Template;

use super::CompileOptions;

/// Receives a callback before and after every plugin the driver runs.
///
/// Observers see the AST but cannot change it; they are for tracing,
/// timing and snapshotting.
///
/// # Example
///
/// ```ignore
/// struct Timing {
///     started: Mutex<Option<Instant>>,
/// }
///
/// impl CompileObserver for Timing {
///     fn name(&self) -> &'static str { "timing" }
///
///     fn on_before_plugin(&self, _plugin: &str, _ast: &Template) -> Result<()> {
///         *self.started.lock().unwrap() = Some(Instant::now());
///         Ok(())
///     }
///
///     fn on_after_plugin(&self, plugin: &str, _ast: &Template) -> Result<()> {
///         if let Some(start) = *self.started.lock().unwrap() {
///             eprintln!("{plugin} took {:?}", start.elapsed());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait CompileObserver: Send + Sync {
    /// The name of this observer (for errors and logging).
    fn name(&self) -> &'static str;

    /// Called once per compile, before the template is parsed.
    ///
    /// # Errors
    ///
    /// Return an error to abort the compile.
    #[allow(unused_variables)]
    fn on_compile_start(&self, options: &CompileOptions) -> Result<()> {
        Ok(())
    }

    /// Called before a plugin runs.
    ///
    /// # Errors
    ///
    /// Return an error to abort the compile.
    #[allow(unused_variables)]
    fn on_before_plugin(&self, plugin: &str, ast: &Template) -> Result<()> {
        Ok(())
    }

    /// Called after a plugin ran and its output passed validation.
    ///
    /// # Errors
    ///
    /// Return an error to abort the compile.
    #[allow(unused_variables)]
    fn on_after_plugin(&self, plugin: &str, ast: &Template) -> Result<()> {
        Ok(())
    }
}

impl<T: CompileObserver + ?Sized> CompileObserver for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_compile_start(&self, options: &CompileOptions) -> Result<()> {
        (**self).on_compile_start(options)
    }

    fn on_before_plugin(&self, plugin: &str, ast: &Template) -> Result<()> {
        (**self).on_before_plugin(plugin, ast)
    }

    fn on_after_plugin(&self, plugin: &str, ast: &Template) -> Result<()> {
        (**self).on_after_plugin(plugin, ast)
    }
}
