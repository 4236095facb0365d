//! Strips `data-test` selectors from elements.

use std::sync::LazyLock;

use stencil_syntax::Visitor;

use crate::pipeline::{AstPlugin, PluginRef};

pub const NAME: &str = "strip-test-selectors";

fn is_test_selector(name: &str) -> bool {
    name == "data-test" || name.starts_with("data-test-")
}

static PLUGIN: LazyLock<PluginRef> = LazyLock::new(|| {
    PluginRef::factory(NAME, |_env| AstPlugin {
        name: NAME.into(),
        visitor: Visitor::new().element(|element| {
            element.attributes.retain(|attr| !is_test_selector(&attr.name));
            Ok(())
        }),
    })
});

pub fn plugin() -> PluginRef {
    PLUGIN.clone()
}
