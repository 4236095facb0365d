//! Compile driver: parse, run each stage's plugins once, generate.

use std::sync::Arc;

use stencil_syntax::Template;
use tracing::{info_span, trace};

use super::{
    CompileObserver, CompileOptions, DefaultPluginSet, OptionsResolver, PluginRegistry, Stage,
    UserOptions,
};
use crate::{
    error::CompileError,
    generate::{CompiledTemplate, Generator, WireGenerator},
};

/// Turns template source into an AST.
pub trait TemplateParser: Send + Sync {
    fn parse(&self, source: &str, options: &CompileOptions) -> Result<Template, CompileError>;
}

/// The `stencil-syntax` parser. Diagnostics are labelled with the module
/// name when one is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl TemplateParser for DefaultParser {
    fn parse(&self, source: &str, options: &CompileOptions) -> Result<Template, CompileError> {
        let filename = options.module_name.as_deref().unwrap_or("template.hbs");
        Ok(stencil_syntax::parse_with_filename(source, filename)?)
    }
}

/// The template compiler.
///
/// Options are resolved afresh for every call; each resolved plugin is
/// constructed and applied exactly once per template, in order, and sees the
/// AST produced by the plugin before it.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(PluginRegistry::new());
/// registry.register("ast", my_plugin)?;
///
/// let compiler = Compiler::new(registry);
/// let compiled = compiler.compile("<div>{{name}}</div>", &UserOptions::new())?;
/// ```
pub struct Compiler {
    resolver: OptionsResolver,
    parser: Box<dyn TemplateParser>,
    generator: Box<dyn Generator>,
    observers: Vec<Box<dyn CompileObserver>>,
}

impl Compiler {
    /// A compiler over the built-in defaults, the default parser and the wire
    /// generator.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            resolver: OptionsResolver::new(registry),
            parser: Box::new(DefaultParser),
            generator: Box::new(WireGenerator),
            observers: Vec::new(),
        }
    }

    /// Replace the built-in default plugin set.
    pub fn with_defaults(mut self, defaults: Arc<DefaultPluginSet>) -> Self {
        self.resolver = self.resolver.with_defaults(defaults);
        self
    }

    pub fn parser(mut self, parser: impl TemplateParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn generator(mut self, generator: impl Generator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Add an observer to receive plugin lifecycle hooks.
    pub fn observer(mut self, observer: impl CompileObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn resolver(&self) -> &OptionsResolver {
        &self.resolver
    }

    /// Resolve fresh options for one compile call.
    pub fn resolve(&self, options: &UserOptions) -> CompileOptions {
        self.resolver.resolve(options)
    }

    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Aborts on the first parse, plugin, validation or generation failure;
    /// nothing is produced in that case.
    pub fn compile(
        &self,
        source: &str,
        options: &UserOptions,
    ) -> Result<CompiledTemplate, CompileError> {
        self.compile_resolved(source, &self.resolve(options))
    }

    /// Compile a template with already resolved options.
    pub fn compile_resolved(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompiledTemplate, CompileError> {
        let ast = self.transform_resolved(source, options)?;
        self.generator.generate(&ast, options)
    }

    /// Parse and transform a template without generating.
    pub fn transform(&self, source: &str, options: &UserOptions) -> Result<Template, CompileError> {
        self.transform_resolved(source, &self.resolve(options))
    }

    pub fn transform_resolved(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<Template, CompileError> {
        let span = info_span!(
            "compile",
            module = options.module_name.as_deref().unwrap_or("<anonymous>"),
            production = options.is_production
        );
        let _guard = span.enter();

        for observer in &self.observers {
            observer
                .on_compile_start(options)
                .map_err(|e| observer_error(observer.as_ref(), e))?;
        }

        let mut ast = self.parser.parse(source, options)?;
        for stage in Stage::ALL {
            ast = self.run_stage(stage, ast, options)?;
        }
        Ok(ast)
    }

    /// Compile a template and serialise it as JSON.
    pub fn precompile(&self, source: &str, options: &UserOptions) -> Result<String, CompileError> {
        self.compile(source, options)?.to_json()
    }

    fn run_stage(
        &self,
        stage: Stage,
        mut ast: Template,
        options: &CompileOptions,
    ) -> Result<Template, CompileError> {
        let env = options.plugin_env();

        for adapter in options.plugins.stage(stage) {
            let name = adapter.name();
            trace!(%stage, plugin = name, kind = %adapter.kind(), "running plugin");

            for observer in &self.observers {
                observer
                    .on_before_plugin(name, &ast)
                    .map_err(|e| observer_error(observer.as_ref(), e))?;
            }

            ast = adapter.apply_once(ast, &env)?;

            for observer in &self.observers {
                observer
                    .on_after_plugin(name, &ast)
                    .map_err(|e| observer_error(observer.as_ref(), e))?;
            }
        }

        Ok(ast)
    }
}

fn observer_error(observer: &dyn CompileObserver, source: eyre::Report) -> CompileError {
    CompileError::Observer {
        observer: observer.name().to_string(),
        source: source.into(),
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("resolver", &self.resolver)
            .field("observers", &self.observers.iter().map(|o| o.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
