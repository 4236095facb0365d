//! Compile operation - template to wire format.

use std::{path::Path, sync::Arc};

use stencil_compiler::{AstSnapshots, CompileError, Compiler, PluginRegistry, UserOptions};
use tracing::info;

use crate::reports::CompileReport;

/// Execute the compile operation.
///
/// Templates without a module name are named after their path so
/// diagnostics point at the file.
pub fn compile(
    registry: Arc<PluginRegistry>,
    input: &Path,
    source: &str,
    mut options: UserOptions,
    trace_dir: Option<&Path>,
) -> Result<CompileReport, CompileError> {
    if options.module_name.is_none() {
        options.module_name = Some(input.display().to_string());
    }

    let mut compiler = Compiler::new(registry);
    if let Some(dir) = trace_dir {
        info!(dir = %dir.display(), "tracing plugin output");
        compiler = compiler.observer(AstSnapshots::with_output_dir(dir));
    }

    let resolved = compiler.resolve(&options);
    let compiled = compiler.compile_resolved(source, &resolved)?;

    Ok(CompileReport {
        input: input.to_path_buf(),
        plugins: resolved.plugins.ast.len(),
        json: compiled.to_json()?,
        trace_dir: trace_dir.map(Path::to_path_buf),
        output: None,
    })
}
