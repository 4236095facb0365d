//! Rewrites the camel-cased `hasBlock` and `hasBlockParams` keywords.

use std::sync::LazyLock;

use stencil_syntax::Visitor;

use crate::pipeline::{AstPlugin, PluginRef};

pub const NAME: &str = "transform-has-block-syntax";

fn replacement(original: &str) -> Option<&'static str> {
    match original {
        "hasBlock" => Some("has-block"),
        "hasBlockParams" => Some("has-block-params"),
        _ => None,
    }
}

static PLUGIN: LazyLock<PluginRef> = LazyLock::new(|| {
    PluginRef::factory(NAME, |_env| AstPlugin {
        name: NAME.into(),
        visitor: Visitor::new().path(|path| {
            if let Some(keyword) = replacement(&path.original) {
                path.original = keyword.to_string();
            }
            Ok(())
        }),
    })
});

pub fn plugin() -> PluginRef {
    PLUGIN.clone()
}
