//! Plugin authoring contracts and plugin references.
//!
//! Two authoring conventions are supported:
//!
//! - **Visitor factories** build an [`AstPlugin`] (a name plus a [`Visitor`])
//!   from the [`PluginEnv`]. The visitor is run over the template in a single
//!   traversal.
//! - **Legacy transforms** implement [`LegacyTransform`]: they are constructed
//!   with the [`PluginEnv`] (carrying the [`Syntax`] context) and then asked to
//!   transform the whole template at once.
//!
//! Both are referenced through a [`PluginRef`], which compares by identity.
//!
//! # Example
//!
//! ```ignore
//! let remove_data_test = PluginRef::factory("remove-data-test", |_env| AstPlugin {
//!     name: "remove-data-test".into(),
//!     visitor: Visitor::new().element(|node| {
//!         node.remove_attribute("data-test");
//!         Ok(())
//!     }),
//! });
//!
//! registry.register("ast", remove_data_test.clone())?;
//! ```

use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use eyre::Result;
use indexmap::IndexMap;
use serde::Serialize;
use stencil_syntax::{InvalidNode, Template, Visitor, Walker};

/// Compile-call metadata handed to every plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PluginMeta {
    pub module_name: Option<String>,
    pub is_production: bool,
    pub strict_mode: bool,
    pub meta: IndexMap<String, serde_json::Value>,
}

/// The syntax context: the AST services a plugin may use while transforming.
#[derive(Debug, Clone, Copy, Default)]
pub struct Syntax;

impl Syntax {
    /// A walker that calls one callback for every node.
    pub fn walker(&self) -> Walker {
        Walker::new()
    }

    /// Walk the template once with a node-kind visitor.
    pub fn traverse(&self, template: &mut Template, visitor: &mut Visitor<'_>) -> Result<()> {
        stencil_syntax::traverse(template, visitor)
    }

    /// Print a template back to source.
    pub fn print(&self, template: &Template) -> String {
        stencil_syntax::print(template)
    }

    /// Parse a template fragment.
    pub fn parse(&self, source: &str) -> stencil_syntax::Result<Template> {
        stencil_syntax::parse(source)
    }

    /// Check a template for structural problems.
    pub fn validate(&self, template: &Template) -> std::result::Result<(), InvalidNode> {
        stencil_syntax::validate(template)
    }
}

/// Everything a plugin receives when it is constructed for one template.
#[derive(Debug, Clone, Default)]
pub struct PluginEnv {
    pub syntax: Syntax,
    pub meta: PluginMeta,
}

/// The product of a visitor factory.
pub struct AstPlugin {
    pub name: String,
    pub visitor: Visitor<'static>,
}

impl std::fmt::Debug for AstPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstPlugin")
            .field("name", &self.name)
            .field("visitor", &self.visitor)
            .finish()
    }
}

/// A transform constructed once per template that rewrites the whole AST.
///
/// Implementors usually keep `env.syntax` around to walk the tree:
///
/// ```ignore
/// struct RemoveDataTest {
///     syntax: Syntax,
/// }
///
/// impl LegacyTransform for RemoveDataTest {
///     fn new(env: PluginEnv) -> Self {
///         Self { syntax: env.syntax }
///     }
///
///     fn transform(&mut self, mut ast: Template) -> eyre::Result<Template> {
///         self.syntax.walker().visit(&mut ast, |node| {
///             if let Node::Element(element) = node {
///                 element.remove_attribute("data-test");
///             }
///             Ok(())
///         })?;
///         Ok(ast)
///     }
/// }
/// ```
pub trait LegacyTransform {
    /// Construct the transform for one template.
    fn new(env: PluginEnv) -> Self
    where
        Self: Sized;

    /// Transform the template, returning the (possibly rewritten) AST.
    fn transform(&mut self, ast: Template) -> Result<Template>;

    /// The name used in diagnostics. Defaults to the type name.
    fn plugin_name() -> &'static str
    where
        Self: Sized,
    {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

pub(crate) type FactoryFn = dyn Fn(&PluginEnv) -> AstPlugin + Send + Sync;
pub(crate) type LegacyCtor = dyn Fn(PluginEnv) -> Box<dyn LegacyTransform> + Send + Sync;

/// The calling convention of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Factory,
    Legacy,
}

impl PluginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Factory => "factory",
            PluginKind::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) enum PluginShape {
    Factory(Box<FactoryFn>),
    Legacy(Box<LegacyCtor>),
}

struct PluginDef {
    name: String,
    shape: PluginShape,
}

/// A reference to a plugin in either authoring convention.
///
/// Equality is identity: clones of one reference are equal, two factories
/// built from the same code are not. A legacy transform type is its own
/// identity, so every reference to the same type under the same name is the
/// same plugin.
#[derive(Clone)]
pub struct PluginRef(Arc<PluginDef>);

static LEGACY_REFS: LazyLock<Mutex<HashMap<(TypeId, String), PluginRef>>> =
    LazyLock::new(Mutex::default);

impl PluginRef {
    /// Reference a visitor factory.
    pub fn factory(
        name: impl Into<String>,
        factory: impl Fn(&PluginEnv) -> AstPlugin + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(PluginDef {
            name: name.into(),
            shape: PluginShape::Factory(Box::new(factory)),
        }))
    }

    /// Reference a legacy transform type, named after the type.
    pub fn legacy<T: LegacyTransform + 'static>() -> Self {
        Self::legacy_named::<T>(T::plugin_name())
    }

    /// Reference a legacy transform type under an explicit name.
    pub fn legacy_named<T: LegacyTransform + 'static>(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut refs = LEGACY_REFS.lock().unwrap_or_else(PoisonError::into_inner);
        refs.entry((TypeId::of::<T>(), name.clone()))
            .or_insert_with(|| {
                Self(Arc::new(PluginDef {
                    name,
                    shape: PluginShape::Legacy(Box::new(|env| -> Box<dyn LegacyTransform> {
                        Box::new(T::new(env))
                    })),
                }))
            })
            .clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> PluginKind {
        match self.0.shape {
            PluginShape::Factory(_) => PluginKind::Factory,
            PluginShape::Legacy(_) => PluginKind::Legacy,
        }
    }

    pub(crate) fn shape(&self) -> &PluginShape {
        &self.0.shape
    }
}

impl PartialEq for PluginRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PluginRef {}

impl std::fmt::Debug for PluginRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRef")
            .field("name", &self.0.name)
            .field("kind", &self.kind())
            .field("id", &Arc::as_ptr(&self.0))
            .finish()
    }
}
