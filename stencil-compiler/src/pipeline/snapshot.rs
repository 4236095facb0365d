//! AST snapshot observer for tracing what each plugin did.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use eyre::Result;
use serde::Serialize;
use stencil_syntax::Template;

use super::{CompileObserver, CompileOptions};

/// The printed AST right after one plugin ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSnapshot {
    /// Position of the plugin in the resolved list, starting at 1.
    pub index: usize,
    pub plugin: String,
    pub template: String,
}

impl PluginSnapshot {
    /// `NN-plugin.json`, with anything but ASCII alphanumerics, `-`, `_` and
    /// `.` in the plugin name replaced so the file stays inside its directory.
    fn filename(&self) -> String {
        let plugin: String = self
            .plugin
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();
        format!("{:02}-{}.json", self.index, plugin)
    }
}

/// An observer that captures the printed template after each plugin.
///
/// Used by `stencil compile --trace-dir` to show how the pipeline rewrote a
/// template. Snapshots are reset when a compile starts, so they always
/// describe the most recent template.
///
/// # Example
///
/// ```ignore
/// let snapshots = Arc::new(AstSnapshots::new());
/// let compiler = Compiler::new(registry).observer(snapshots.clone());
/// compiler.compile(source, &options)?;
///
/// snapshots.write_to_dir(".stencil/trace")?;
/// ```
#[derive(Debug, Default)]
pub struct AstSnapshots {
    snapshots: RwLock<Vec<PluginSnapshot>>,
    output_dir: Option<PathBuf>,
}

impl AstSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an observer that also writes each snapshot as it is taken.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::default(),
            output_dir: Some(output_dir.into()),
        }
    }

    /// All snapshots taken so far.
    pub fn snapshots(&self) -> Vec<PluginSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write every snapshot as `NN-plugin.json` into `dir`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for snapshot in self.snapshots().iter() {
            write_snapshot(dir, snapshot)?;
        }

        Ok(())
    }
}

fn write_snapshot(dir: &Path, snapshot: &PluginSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(dir.join(snapshot.filename()), json)?;
    Ok(())
}

impl CompileObserver for AstSnapshots {
    fn name(&self) -> &'static str {
        "ast-snapshots"
    }

    fn on_compile_start(&self, _options: &CompileOptions) -> Result<()> {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn on_after_plugin(&self, plugin: &str, ast: &Template) -> Result<()> {
        let snapshot = {
            let mut snapshots = self
                .snapshots
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let snapshot = PluginSnapshot {
                index: snapshots.len() + 1,
                plugin: plugin.to_string(),
                template: stencil_syntax::print(ast),
            };
            snapshots.push(snapshot.clone());
            snapshot
        };

        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir)?;
            write_snapshot(dir, &snapshot)?;
        }

        Ok(())
    }
}
