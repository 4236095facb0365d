use clap::Args;
use eyre::Result;

use super::PipelineArgs;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct PluginsCommand {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl PluginsCommand {
    pub fn run(&self) -> Result<()> {
        let (registry, options) = self.pipeline.load();
        let report = ops::plugins(registry, &options);
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
