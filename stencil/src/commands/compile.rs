use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};

use super::{PipelineArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    /// Template file to compile
    pub file: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Write the compiled template to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the printed template after every plugin into this directory
    #[arg(long)]
    pub trace_dir: Option<PathBuf>,
}

impl CompileCommand {
    pub fn run(&self) -> Result<()> {
        let (registry, options) = self.pipeline.load();
        let source = std::fs::read_to_string(&self.file)
            .wrap_err_with(|| format!("Failed to read {}", self.file.display()))?;

        let mut report = ops::compile(
            registry,
            &self.file,
            &source,
            options,
            self.trace_dir.as_deref(),
        )
        .unwrap_or_exit();

        match &self.output {
            Some(path) => {
                std::fs::write(path, &report.json)
                    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                report.output = Some(path.clone());
                report.render(&mut TerminalOutput::new());
            }
            None => println!("{}", report.json),
        }

        Ok(())
    }
}
