//! `attr="{{x}}"` becomes `attr={{x}}`.

use std::sync::LazyLock;

use stencil_syntax::{AttrValue, ConcatPart, Visitor};

use crate::pipeline::{AstPlugin, PluginRef};

pub const NAME: &str = "transform-quoted-bindings";

static PLUGIN: LazyLock<PluginRef> = LazyLock::new(|| {
    PluginRef::factory(NAME, |_env| AstPlugin {
        name: NAME.into(),
        visitor: Visitor::new().attr(|attr| {
            if let AttrValue::Concat { parts } = &attr.value
                && let [ConcatPart::Mustache(mustache)] = parts.as_slice()
            {
                let mustache = mustache.clone();
                attr.value = AttrValue::Mustache(mustache);
            }
            Ok(())
        }),
    })
});

pub fn plugin() -> PluginRef {
    PLUGIN.clone()
}
