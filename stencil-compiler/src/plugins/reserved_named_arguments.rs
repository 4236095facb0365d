//! Rejects named arguments whose names are reserved.

use std::sync::LazyLock;

use stencil_syntax::Visitor;

use super::located;
use crate::pipeline::{AstPlugin, PluginRef};

pub const NAME: &str = "assert-reserved-named-arguments";

const RESERVED: &[&str] = &["@arguments", "@args", "@block", "@else"];

fn is_reserved(head: &str) -> bool {
    RESERVED.contains(&head) || head.starts_with("@__")
}

static PLUGIN: LazyLock<PluginRef> = LazyLock::new(|| {
    PluginRef::factory(NAME, |env| {
        let module = env.meta.module_name.clone();
        AstPlugin {
            name: NAME.into(),
            visitor: Visitor::new().path(move |path| {
                if path.is_named_argument() && is_reserved(path.head()) {
                    eyre::bail!(located(
                        format!("'{}' is reserved", path.head()),
                        module.as_deref(),
                        path.span,
                    ));
                }
                Ok(())
            }),
        }
    })
});

pub fn plugin() -> PluginRef {
    PLUGIN.clone()
}
