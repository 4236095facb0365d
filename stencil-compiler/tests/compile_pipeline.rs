//! Integration tests for the compile driver with registered plugins in both
//! authoring conventions.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use stencil_compiler::{
    AstPlugin, AstSnapshots, CompileError, Compiler, LegacyTransform, PluginEnv, PluginRef,
    PluginRegistry, Stage, Syntax, UserOptions,
    plugins::reserved_named_arguments,
    syntax::{Node, Template, Visitor, print},
};

const DATA_TEST: &str = r#"<div data-test="foo" data-blah="derp" class="hahaha"></div>"#;

struct RemoveDataTest {
    syntax: Syntax,
}

impl LegacyTransform for RemoveDataTest {
    fn new(env: PluginEnv) -> Self {
        Self { syntax: env.syntax }
    }

    fn transform(&mut self, mut ast: Template) -> eyre::Result<Template> {
        self.syntax.walker().visit(&mut ast, |node| {
            if let Node::Element(element) = node {
                element.remove_attribute("data-test");
            }
            Ok(())
        })?;
        Ok(ast)
    }
}

fn remove_data_test_factory() -> PluginRef {
    PluginRef::factory("remove-data-test", |_env| AstPlugin {
        name: "remove-data-test".into(),
        visitor: Visitor::new().element(|node| {
            node.remove_attribute("data-test");
            Ok(())
        }),
    })
}

fn counting_factory(constructed: Arc<AtomicUsize>, visited: Arc<AtomicUsize>) -> PluginRef {
    PluginRef::factory("count-elements", move |_env| {
        constructed.fetch_add(1, Ordering::SeqCst);
        let visited = visited.clone();
        AstPlugin {
            name: "count-elements".into(),
            visitor: Visitor::new().element(move |_| {
                visited.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        }
    })
}

#[test]
fn test_legacy_plugin_removes_attribute() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register("ast", PluginRef::legacy::<RemoveDataTest>())
        .unwrap();
    let compiler = Compiler::new(registry);

    let ast = compiler.transform(DATA_TEST, &UserOptions::new()).unwrap();
    insta::assert_snapshot!(print(&ast), @r#"<div data-blah="derp" class="hahaha"></div>"#);
}

#[test]
fn test_factory_plugin_removes_attribute() {
    let registry = Arc::new(PluginRegistry::new());
    registry.register("ast", remove_data_test_factory()).unwrap();
    let compiler = Compiler::new(registry);

    let ast = compiler.transform(DATA_TEST, &UserOptions::new()).unwrap();
    insta::assert_snapshot!(print(&ast), @r#"<div data-blah="derp" class="hahaha"></div>"#);
}

#[test]
fn test_both_conventions_agree() {
    let legacy = Compiler::new(Arc::new(PluginRegistry::new()));
    let factory = Compiler::new(Arc::new(PluginRegistry::new()));

    let legacy_ast = legacy
        .transform(
            DATA_TEST,
            &UserOptions::new().plugin(Stage::Ast, PluginRef::legacy::<RemoveDataTest>()),
        )
        .unwrap();
    let factory_ast = factory
        .transform(
            DATA_TEST,
            &UserOptions::new().plugin(Stage::Ast, remove_data_test_factory()),
        )
        .unwrap();

    assert_eq!(legacy_ast, factory_ast);
}

#[test]
fn test_plugin_constructed_once_per_template() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let visited = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register("ast", counting_factory(constructed.clone(), visited.clone()))
        .unwrap();
    let compiler = Compiler::new(registry);

    compiler
        .compile("<ul><li>a</li><li>b</li><li>c</li></ul>", &UserOptions::new())
        .unwrap();

    assert_eq!(visited.load(Ordering::SeqCst), 4);
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    compiler.compile("<p></p>", &UserOptions::new()).unwrap();
    assert_eq!(constructed.load(Ordering::SeqCst), 2);
}

static LEGACY_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

struct CountConstruction;

impl LegacyTransform for CountConstruction {
    fn new(_env: PluginEnv) -> Self {
        LEGACY_CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        CountConstruction
    }

    fn transform(&mut self, ast: Template) -> eyre::Result<Template> {
        Ok(ast)
    }
}

#[test]
fn test_legacy_constructed_once_for_block_template() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register("ast", PluginRef::legacy::<CountConstruction>())
        .unwrap();
    let compiler = Compiler::new(registry);

    compiler
        .compile("<div>{{#if falsey}}nope{{/if}}</div>", &UserOptions::new())
        .unwrap();

    assert_eq!(LEGACY_CONSTRUCTED.load(Ordering::SeqCst), 1);
}

static DEDUP_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

struct CountedRemoveDataTest {
    inner: RemoveDataTest,
}

impl LegacyTransform for CountedRemoveDataTest {
    fn new(env: PluginEnv) -> Self {
        DEDUP_CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Self {
            inner: RemoveDataTest::new(env),
        }
    }

    fn transform(&mut self, ast: Template) -> eyre::Result<Template> {
        self.inner.transform(ast)
    }
}

#[test]
fn test_legacy_type_registered_twice_runs_once() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register("ast", PluginRef::legacy::<CountedRemoveDataTest>())
        .unwrap();
    registry
        .register("ast", PluginRef::legacy::<CountedRemoveDataTest>())
        .unwrap();
    assert_eq!(registry.len(), 1);

    let compiler = Compiler::new(registry.clone());
    let ast = compiler.transform(DATA_TEST, &UserOptions::new()).unwrap();

    assert_eq!(DEDUP_CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert_eq!(print(&ast), r#"<div data-blah="derp" class="hahaha"></div>"#);

    registry
        .unregister("ast", &PluginRef::legacy::<CountedRemoveDataTest>())
        .unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_failing_plugin_is_named() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register(
            "ast",
            PluginRef::factory("assert-no-marquee", |_env| AstPlugin {
                name: "assert-no-marquee".into(),
                visitor: Visitor::new().element(|node| {
                    if node.tag == "marquee" {
                        eyre::bail!("<marquee> is not allowed");
                    }
                    Ok(())
                }),
            }),
        )
        .unwrap();
    let compiler = Compiler::new(registry);

    let err = compiler
        .compile("<div><marquee>hi</marquee></div>", &UserOptions::new())
        .unwrap_err();

    assert_eq!(err.plugin_name(), Some("assert-no-marquee"));
    assert_eq!(err.to_string(), "plugin 'assert-no-marquee' failed");
}

#[test]
fn test_later_plugins_see_earlier_mutations() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register(
            "ast",
            PluginRef::factory("rename", |_env| AstPlugin {
                name: "rename".into(),
                visitor: Visitor::new().element(|node| {
                    node.tag = "section".into();
                    Ok(())
                }),
            }),
        )
        .unwrap();
    registry
        .register(
            "ast",
            PluginRef::factory("expect-section", |_env| AstPlugin {
                name: "expect-section".into(),
                visitor: Visitor::new().element(|node| {
                    eyre::ensure!(node.tag == "section", "saw <{}>", node.tag);
                    Ok(())
                }),
            }),
        )
        .unwrap();
    let compiler = Compiler::new(registry);

    let ast = compiler.transform("<div></div>", &UserOptions::new()).unwrap();
    assert_eq!(print(&ast), "<section></section>");
}

#[test]
fn test_debug_assertions_only_outside_production() {
    let compiler = Compiler::new(Arc::new(PluginRegistry::new()));

    let err = compiler
        .compile("{{@args}}{{debugger}}", &UserOptions::new())
        .unwrap_err();
    assert_eq!(err.plugin_name(), Some(reserved_named_arguments::NAME));

    let ast = compiler
        .transform("{{@args}}{{debugger}}{{log 1}}", &UserOptions::new().production(true))
        .unwrap();
    assert_eq!(print(&ast), "{{@args}}");
}

#[test]
fn test_built_in_transforms_run() {
    let compiler = Compiler::new(Arc::new(PluginRegistry::new()));

    let ast = compiler
        .transform(
            r#"<div class="{{klass}}">{{#if hasBlock}}{{yield}}{{/if}}</div>"#,
            &UserOptions::new(),
        )
        .unwrap();
    insta::assert_snapshot!(print(&ast), @"<div class={{klass}}>{{#if has-block}}{{yield}}{{/if}}</div>");
}

#[test]
fn test_snapshots_follow_resolved_order() {
    let snapshots = Arc::new(AstSnapshots::new());
    let registry = Arc::new(PluginRegistry::new());
    registry.register("ast", remove_data_test_factory()).unwrap();
    let compiler = Compiler::new(registry).observer(snapshots.clone());

    let options = UserOptions::new();
    let resolved = compiler.resolve(&options);
    compiler.compile(DATA_TEST, &options).unwrap();

    let taken = snapshots.snapshots();
    assert_eq!(taken.len(), resolved.plugins.ast.len());
    let last = taken.last().unwrap();
    assert_eq!(last.plugin, "remove-data-test");
    assert_eq!(last.template, r#"<div data-blah="derp" class="hahaha"></div>"#);
}

#[test]
fn test_parse_errors_are_diagnostics() {
    let compiler = Compiler::new(Arc::new(PluginRegistry::new()));
    let err = compiler
        .compile("<div><p></div>", &UserOptions::new().module_name("app/broken"))
        .unwrap_err();

    assert!(matches!(err, CompileError::Parse(_)));
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("app/broken"));
}

#[test]
fn test_reused_snapshots_describe_latest_compile() {
    let snapshots = Arc::new(AstSnapshots::new());
    let compiler = Compiler::new(Arc::new(PluginRegistry::new())).observer(snapshots.clone());
    let options = UserOptions::new();
    let plugins = compiler.resolve(&options).plugins.ast.len();

    compiler.compile("<p>first</p>", &options).unwrap();
    compiler.compile("<p>second</p>", &options).unwrap();

    let taken = snapshots.snapshots();
    assert_eq!(taken.len(), plugins);
    assert_eq!(taken[0].index, 1);
    assert_eq!(taken.last().unwrap().template, "<p>second</p>");
}
