//! Check operation - parse and transform without generating.

use std::{path::PathBuf, sync::Arc};

use stencil_compiler::{Compiler, PluginRegistry, UserOptions};

use crate::reports::{CheckReport, FileCheck};

/// Execute the check operation.
///
/// Every file is checked; the first error of each is rendered as a
/// diagnostic.
pub fn check(registry: Arc<PluginRegistry>, files: &[PathBuf], options: &UserOptions) -> CheckReport {
    let compiler = Compiler::new(registry);

    let files = files
        .iter()
        .map(|path| {
            let error = match std::fs::read_to_string(path) {
                Ok(source) => {
                    let mut options = options.clone();
                    options
                        .module_name
                        .get_or_insert_with(|| path.display().to_string());
                    compiler
                        .transform(&source, &options)
                        .err()
                        .map(|e| format!("{:?}", miette::Report::new(e)))
                }
                Err(e) => Some(format!("failed to read {}: {}", path.display(), e)),
            };
            FileCheck {
                path: path.clone(),
                error,
            }
        })
        .collect();

    CheckReport { files }
}
