mod check;
mod compile;
mod completions;
mod plugins;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use compile::CompileCommand;
use completions::CompletionsCommand;
use eyre::Result;
use plugins::PluginsCommand;
use stencil_compiler::{CompileError, PluginRegistry, StencilToml, UserOptions};

const DEFAULT_CONFIG: &str = "stencil.toml";

/// Extension trait for exiting on library errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for stencil_compiler::config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for std::result::Result<T, CompileError> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

/// Options shared by every command that runs the pipeline.
#[derive(Args)]
pub(crate) struct PipelineArgs {
    /// Path to stencil.toml (defaults to ./stencil.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compile in production mode
    #[arg(long)]
    pub production: bool,

    /// Module name used in diagnostics and the compiled output
    #[arg(long)]
    pub module_name: Option<String>,
}

impl PipelineArgs {
    /// Load the configuration, register its plugins and merge the flags over it.
    pub fn load(&self) -> (Arc<PluginRegistry>, UserOptions) {
        let config = load_config(self.config.as_deref());

        let registry = Arc::new(PluginRegistry::new());
        config.register_plugins(&registry).unwrap_or_exit();

        let mut options = config.user_options();
        options.is_production |= self.production;
        if let Some(name) = &self.module_name {
            options.module_name = Some(name.clone());
        }

        (registry, options)
    }
}

/// An explicit path must exist; the default is optional.
fn load_config(path: Option<&Path>) -> StencilToml {
    match path {
        Some(path) => StencilToml::open(path).unwrap_or_exit(),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            StencilToml::open(DEFAULT_CONFIG).unwrap_or_exit()
        }
        None => StencilToml::default(),
    }
}

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version)]
#[command(about = "Compile templates through a pluggable AST pipeline")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Compile(cmd) => cmd.run(),
            Commands::Plugins(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template to the JSON wire format
    Compile(CompileCommand),

    /// List the resolved plugin pipeline
    Plugins(PluginsCommand),

    /// Parse and transform templates without generating output
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
