use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use stencil_syntax::{InvalidNode, ParseError};
use thiserror::Error;

/// Boxed error carried by plugin and observer failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from configuring the pipeline: stages, plugin names and stencil.toml.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown pipeline stage '{stage}'")]
    #[diagnostic(code(stencil::unknown_stage), help("known stages are: {known}"))]
    UnknownStage { stage: String, known: String },

    #[error("unknown plugin '{name}'")]
    #[diagnostic(code(stencil::unknown_plugin), help("available plugins are: {available}"))]
    UnknownPlugin { name: String, available: String },

    #[error("failed to read '{path}'")]
    #[diagnostic(help("pass --config with the path to a stencil.toml file"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {filename}")]
    #[diagnostic(code(stencil::config::parse))]
    Parse {
        filename: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Create a parse error from a toml error.
    pub(crate) fn parse(source: toml::de::Error, src: &str, filename: &str) -> Self {
        let span = source.span().map(SourceSpan::from);
        ConfigError::Parse {
            filename: filename.to_string(),
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        }
    }
}

/// Errors that abort a compile call.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("plugin '{plugin}' failed")]
    #[diagnostic(code(stencil::plugin_failed))]
    Plugin {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("plugin '{plugin}' produced an invalid AST")]
    #[diagnostic(code(stencil::invalid_ast))]
    InvalidAst {
        plugin: String,
        #[source]
        source: InvalidNode,
    },

    #[error("observer '{observer}' failed")]
    Observer {
        observer: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to generate template: {message}")]
    #[diagnostic(code(stencil::generate))]
    Generate { message: String },
}

impl CompileError {
    pub(crate) fn plugin(plugin: impl Into<String>, source: eyre::Report) -> Self {
        CompileError::Plugin {
            plugin: plugin.into(),
            source: source.into(),
        }
    }

    pub(crate) fn generate(message: impl Into<String>) -> Self {
        CompileError::Generate {
            message: message.into(),
        }
    }

    /// The plugin that caused the failure, if a plugin did.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            CompileError::Plugin { plugin, .. } | CompileError::InvalidAst { plugin, .. } => {
                Some(plugin)
            }
            _ => None,
        }
    }
}

impl From<Box<ParseError>> for CompileError {
    fn from(err: Box<ParseError>) -> Self {
        CompileError::Parse(*err)
    }
}
