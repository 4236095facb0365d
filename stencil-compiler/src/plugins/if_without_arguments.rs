//! Rejects `if` and `unless` used without a condition.

use std::sync::LazyLock;

use stencil_syntax::{Expression, Node, Span, Template};

use super::located;
use crate::pipeline::{LegacyTransform, PluginEnv, PluginRef, Syntax};

pub const NAME: &str = "assert-if-helper-without-arguments";

/// The block form takes exactly one condition; the inline and
/// sub-expression forms take a condition, a value and an optional inverse.
pub struct AssertIfHelperWithoutArguments {
    syntax: Syntax,
    module_name: Option<String>,
}

impl AssertIfHelperWithoutArguments {
    fn check(
        &self,
        callee: Option<&str>,
        params: usize,
        block: bool,
        span: Span,
    ) -> eyre::Result<()> {
        let Some(helper @ ("if" | "unless")) = callee else {
            return Ok(());
        };

        let message = if block && params != 1 {
            format!("{{{{#{helper}}}}} requires a single argument")
        } else if !block && !(2..=3).contains(&params) {
            format!("{{{{{helper}}}}} helper requires at least two and at most three arguments")
        } else {
            return Ok(());
        };

        eyre::bail!(located(message, self.module_name.as_deref(), span))
    }
}

impl LegacyTransform for AssertIfHelperWithoutArguments {
    fn new(env: PluginEnv) -> Self {
        Self {
            syntax: env.syntax,
            module_name: env.meta.module_name,
        }
    }

    fn transform(&mut self, mut ast: Template) -> eyre::Result<Template> {
        self.syntax.walker().visit(&mut ast, |node| match node {
            Node::BlockStatement(block) => {
                self.check(block.callee(), block.params.len(), true, block.span)
            }
            Node::Mustache(mustache) => {
                self.check(mustache.callee(), mustache.params.len(), false, mustache.span)
            }
            Node::SubExpression(sub) => {
                let callee = match sub.path.as_ref() {
                    Expression::Path(path) => Some(path.original.as_str()),
                    _ => None,
                };
                self.check(callee, sub.params.len(), false, sub.span)
            }
            _ => Ok(()),
        })?;
        Ok(ast)
    }
}

static PLUGIN: LazyLock<PluginRef> =
    LazyLock::new(|| PluginRef::legacy_named::<AssertIfHelperWithoutArguments>(NAME));

pub fn plugin() -> PluginRef {
    PLUGIN.clone()
}

#[cfg(test)]
mod tests {
    use stencil_syntax::parse;

    use super::*;
    use crate::{
        error::CompileError,
        pipeline::{PluginAdapter, PluginMeta},
    };

    fn check(source: &str) -> Result<Template, CompileError> {
        let env = PluginEnv {
            meta: PluginMeta {
                module_name: Some("app/templates/index".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        PluginAdapter::from(plugin()).apply_once(parse(source).unwrap(), &env)
    }

    #[test]
    fn test_valid_forms() {
        assert!(check("{{#if a}}x{{else}}y{{/if}}").is_ok());
        assert!(check("{{if a b}}{{unless a b c}}").is_ok());
        assert!(check(r#"<p class={{if a "x"}}></p>"#).is_ok());
        assert!(check("{{foo (if a b)}}").is_ok());
    }

    #[test]
    fn test_block_without_condition() {
        let err = check("{{#if}}x{{/if}}").unwrap_err();
        assert_eq!(err.plugin_name(), Some(NAME));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(
            source,
            "{{#if}} requires a single argument ('app/templates/index' @ byte 0)"
        );
    }

    #[test]
    fn test_inline_forms_without_enough_arguments() {
        assert!(check("{{if a}}").is_err());
        assert!(check("{{unless}}").is_err());
        assert!(check("{{foo (if a)}}").is_err());
        assert!(check("{{if a b c d}}").is_err());
    }
}
