//! Compile command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from compiling one template.
#[derive(Debug)]
pub struct CompileReport {
    /// The template that was compiled.
    pub input: PathBuf,
    /// Number of plugins that ran.
    pub plugins: usize,
    /// The compiled template as JSON.
    pub json: String,
    /// Where per-plugin snapshots were written.
    pub trace_dir: Option<PathBuf>,
    /// Where the JSON was written, if not stdout.
    pub output: Option<PathBuf>,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        out.ok_item(&format!(
            "compiled {} ({} plugin{})",
            self.input.display(),
            self.plugins,
            if self.plugins == 1 { "" } else { "s" }
        ));
        if let Some(output) = &self.output {
            out.key_value("  output", &output.display().to_string());
        }
        if let Some(dir) = &self.trace_dir {
            out.key_value("  trace", &dir.display().to_string());
        }
    }
}
