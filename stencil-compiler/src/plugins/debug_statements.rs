//! `{{debugger}}` and `{{log}}` handling.
//!
//! Outside production `{{debugger}}` is checked for stray arguments; in
//! production both statements are stripped from the template.

use std::sync::LazyLock;

use stencil_syntax::{Node, Statement, Template, Visitor};

use super::located;
use crate::pipeline::{AstPlugin, LegacyTransform, PluginEnv, PluginRef, Syntax};

pub const ASSERT_NAME: &str = "assert-debugger-without-arguments";
pub const STRIP_NAME: &str = "strip-debug-statements";

static ASSERT: LazyLock<PluginRef> = LazyLock::new(|| {
    PluginRef::factory(ASSERT_NAME, |env| {
        let module = env.meta.module_name.clone();
        AstPlugin {
            name: ASSERT_NAME.into(),
            visitor: Visitor::new().mustache(move |mustache| {
                if mustache.callee() == Some("debugger")
                    && !(mustache.params.is_empty() && mustache.hash.is_empty())
                {
                    eyre::bail!(located(
                        "{{debugger}} does not take any arguments",
                        module.as_deref(),
                        mustache.span,
                    ));
                }
                Ok(())
            }),
        }
    })
});

static STRIP: LazyLock<PluginRef> =
    LazyLock::new(|| PluginRef::legacy_named::<StripDebugStatements>(STRIP_NAME));

/// Debug-mode assertion on `{{debugger}}`.
pub fn assert_plugin() -> PluginRef {
    ASSERT.clone()
}

/// Production replacement that removes the statements.
pub fn strip_plugin() -> PluginRef {
    STRIP.clone()
}

pub struct StripDebugStatements {
    syntax: Syntax,
}

fn is_debug_statement(statement: &Statement) -> bool {
    matches!(statement, Statement::Mustache(m) if matches!(m.callee(), Some("debugger" | "log")))
}

impl LegacyTransform for StripDebugStatements {
    fn new(env: PluginEnv) -> Self {
        Self { syntax: env.syntax }
    }

    fn transform(&mut self, mut ast: Template) -> eyre::Result<Template> {
        self.syntax.walker().visit(&mut ast, |node| {
            let body = match node {
                Node::Template(template) => &mut template.body,
                Node::Block(block) => &mut block.body,
                Node::Element(element) => &mut element.children,
                _ => return Ok(()),
            };
            body.retain(|statement| !is_debug_statement(statement));
            Ok(())
        })?;
        Ok(ast)
    }
}

#[cfg(test)]
mod tests {
    use stencil_syntax::{parse, print};

    use super::*;
    use crate::pipeline::PluginAdapter;

    #[test]
    fn test_strip_removes_nested_statements() {
        let ast = parse("{{debugger}}<div>{{log x}}{{#if a}}{{debugger}}ok{{/if}}</div>{{logger}}").unwrap();
        let ast = PluginAdapter::from(strip_plugin())
            .apply_once(ast, &PluginEnv::default())
            .unwrap();

        insta::assert_snapshot!(print(&ast), @"<div>{{#if a}}ok{{/if}}</div>{{logger}}");
    }

    #[test]
    fn test_assert_rejects_arguments() {
        let adapter = PluginAdapter::from(assert_plugin());
        let env = PluginEnv::default();

        assert!(adapter.apply_once(parse("{{debugger}}").unwrap(), &env).is_ok());

        let err = adapter
            .apply_once(parse("{{debugger this}}").unwrap(), &env)
            .unwrap_err();
        assert_eq!(err.plugin_name(), Some(ASSERT_NAME));
        assert!(adapter.apply_once(parse("{{debugger x=1}}").unwrap(), &env).is_err());
    }
}
