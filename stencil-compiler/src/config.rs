//! `stencil.toml` project configuration.

use std::{path::Path, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::ConfigError,
    pipeline::{PluginRegistry, Stage, UserOptions},
    plugins,
};

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, Box<ConfigError>>;

/// Root of a stencil.toml file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StencilToml {
    /// Compile defaults
    #[serde(default)]
    pub compile: CompileSection,

    /// Pass-through values handed to plugins and the compiled output
    #[serde(default)]
    pub meta: IndexMap<String, serde_json::Value>,

    /// Optional plugins to register, per stage
    #[serde(default)]
    pub plugins: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CompileSection {
    #[serde(default)]
    pub production: bool,
    pub module_name: Option<String>,
    #[serde(default)]
    pub strict_mode: bool,
}

impl FromStr for StencilToml {
    type Err = Box<ConfigError>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "stencil.toml")
    }
}

impl StencilToml {
    /// Load a stencil.toml file from the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a stencil.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Box::new(ConfigError::parse(e, content, filename)))
    }

    /// The compile options this file describes.
    pub fn user_options(&self) -> UserOptions {
        UserOptions {
            is_production: self.compile.production,
            module_name: self.compile.module_name.clone(),
            strict_mode: self.compile.strict_mode,
            meta: self.meta.clone(),
            ..Default::default()
        }
    }

    /// Register the `[plugins]` entries with a registry.
    ///
    /// Every entry is checked before anything is registered.
    pub fn register_plugins(&self, registry: &PluginRegistry) -> Result<()> {
        let mut resolved = Vec::new();
        for (stage, names) in &self.plugins {
            let stage: Stage = stage.parse().map_err(Box::new)?;
            for name in names {
                let plugin = plugins::optional(name).ok_or_else(|| {
                    Box::new(ConfigError::UnknownPlugin {
                        name: name.clone(),
                        available: plugins::OPTIONAL.join(", "),
                    })
                })?;
                resolved.push((stage, plugin));
            }
        }

        for (stage, plugin) in resolved {
            registry.register_stage(stage, plugin);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config: StencilToml = r#"
            [compile]
            production = true
            module-name = "app/templates/index"
            strict-mode = true

            [meta]
            author = "me"
            revision = 3

            [plugins]
            ast = ["strip-test-selectors"]
        "#
        .parse()
        .unwrap();

        let options = config.user_options();
        assert!(options.is_production);
        assert!(options.strict_mode);
        assert_eq!(options.module_name.as_deref(), Some("app/templates/index"));
        assert_eq!(options.meta["revision"], serde_json::json!(3));

        let registry = PluginRegistry::new();
        config.register_plugins(&registry).unwrap();
        assert_eq!(registry.list("ast").unwrap(), vec![plugins::test_selectors::plugin()]);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config: StencilToml = "".parse().unwrap();
        assert_eq!(config, StencilToml::default());
        assert!(!config.user_options().is_production);
    }

    #[test]
    fn test_unknown_compile_key() {
        let err = "[compile]\nproduciton = true\n".parse::<StencilToml>().unwrap_err();
        assert!(matches!(*err, ConfigError::Parse { span: Some(_), .. }));
    }

    #[test]
    fn test_unknown_plugin_registers_nothing() {
        let config: StencilToml = r#"
            [plugins]
            ast = ["strip-test-selectors", "does-not-exist"]
        "#
        .parse()
        .unwrap();

        let registry = PluginRegistry::new();
        let err = config.register_plugins(&registry).unwrap_err();
        assert!(matches!(*err, ConfigError::UnknownPlugin { ref name, .. } if name == "does-not-exist"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_stage() {
        let config: StencilToml = "[plugins]\nhir = []\n".parse().unwrap();
        let err = config.register_plugins(&PluginRegistry::new()).unwrap_err();
        assert!(matches!(*err, ConfigError::UnknownStage { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StencilToml::open(dir.path().join("stencil.toml")).unwrap_err();
        assert!(matches!(*err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stencil.toml");
        std::fs::write(&path, "[compile]\nmodule-name = \"x\"\n").unwrap();

        let config = StencilToml::open(&path).unwrap();
        assert_eq!(config.compile.module_name.as_deref(), Some("x"));
    }
}
