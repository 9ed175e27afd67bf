use stencil_renderer::{Context, Engine, EngineConfig, RenderError};
use tempfile::TempDir;

fn engine_with(templates: &[(&str, &str)]) -> Engine {
    let engine = Engine::new();
    for (name, src) in templates {
        engine
            .new_template(name, src)
            .unwrap_or_else(|e| panic!("parse {name}: {e}"));
    }
    engine
}

fn render(engine: &Engine, name: &str, ctx: &mut Context) -> Result<String, RenderError> {
    engine.load_by_name(name)?.render_to_string(ctx)
}

// ---------------------------------------------------------------------------
// 1. extends / block
// ---------------------------------------------------------------------------

#[test]
fn child_block_replaces_parent_default() {
    let engine = engine_with(&[
        ("base", "<html>{% block body %}BASE{% endblock %}</html>"),
        ("child", "{% extends 'base' %}{% block body %}CHILD{% endblock %}"),
    ]);
    let out = render(&engine, "child", &mut Context::new()).unwrap();
    assert_eq!(out, "<html>CHILD</html>");
}

#[test]
fn parent_rendered_alone_uses_defaults() {
    let engine = engine_with(&[("base", "[{% block a %}A{% endblock %}|{% block b %}B{% endblock %}]")]);
    assert_eq!(render(&engine, "base", &mut Context::new()).unwrap(), "[A|B]");
}

#[test]
fn unoverridden_blocks_keep_defaults_and_child_text_outside_blocks_is_dropped() {
    let engine = engine_with(&[
        ("base", "[{% block a %}A{% endblock %}|{% block b %}B{% endblock %}]"),
        ("child", "{% extends 'base' %}ignored{% block b %}b!{% endblock %}also ignored"),
    ]);
    assert_eq!(render(&engine, "child", &mut Context::new()).unwrap(), "[A|b!]");
}

#[test]
fn grandchild_overrides_win_over_parent_overrides() {
    let engine = engine_with(&[
        ("root", "{% block head %}root-head{% endblock %}/{% block body %}root-body{% endblock %}"),
        ("mid", "{% extends 'root' %}{% block head %}mid-head{% endblock %}{% block body %}mid-body{% endblock %}"),
        ("leaf", "{% extends 'mid' %}{% block body %}leaf-body{% endblock %}"),
    ]);
    assert_eq!(
        render(&engine, "leaf", &mut Context::new()).unwrap(),
        "mid-head/leaf-body"
    );
}

#[test]
fn blocks_see_the_shared_context() {
    let engine = engine_with(&[
        ("base", "{% block title %}{% endblock %}"),
        ("page", "{% extends 'base' %}{% block title %}{{ title|default:'untitled' }}{% endblock %}"),
    ]);
    let mut ctx = Context::new();
    ctx.set("title", "Index");
    assert_eq!(render(&engine, "page", &mut ctx).unwrap(), "Index");
}

#[test]
fn nested_block_inside_override_is_resolved() {
    let engine = engine_with(&[
        ("base", "<{% block outer %}base-outer{% endblock %}>"),
        ("child", "{% extends 'base' %}{% block outer %}o[{% block inner %}i{% endblock %}]{% endblock %}"),
        ("grandchild", "{% extends 'child' %}{% block inner %}I!{% endblock %}"),
    ]);
    assert_eq!(render(&engine, "child", &mut Context::new()).unwrap(), "<o[i]>");
    assert_eq!(render(&engine, "grandchild", &mut Context::new()).unwrap(), "<o[I!]>");
}

#[test]
fn text_before_extends_is_kept() {
    let engine = engine_with(&[
        ("base", "[{% block b %}B{% endblock %}]"),
        ("child", "Header\n{% extends 'base' %}{% block b %}C{% endblock %}"),
    ]);
    assert_eq!(render(&engine, "child", &mut Context::new()).unwrap(), "Header\n[C]");
}

#[test]
fn parent_name_can_come_from_context() {
    let engine = engine_with(&[
        ("layout_a", "A:{% block x %}{% endblock %}"),
        ("layout_b", "B:{% block x %}{% endblock %}"),
        ("page", "{% extends layout %}{% block x %}body{% endblock %}"),
    ]);
    let mut ctx = Context::new();
    ctx.set("layout", "layout_b");
    assert_eq!(render(&engine, "page", &mut ctx).unwrap(), "B:body");
}

// ---------------------------------------------------------------------------
// 2. include
// ---------------------------------------------------------------------------

#[test]
fn include_shares_scope_with_caller() {
    let engine = engine_with(&[
        ("item", "<li>{{ x }}</li>"),
        ("list", "{% for x in xs %}{% include 'item' %}{% endfor %}"),
    ]);
    let mut ctx = Context::new();
    let xs: stencil_renderer::TemplateList = ["a", "b"].into_iter().collect();
    ctx.set("xs", stencil_renderer::Value::from_list(std::rc::Rc::new(xs)));
    assert_eq!(render(&engine, "list", &mut ctx).unwrap(), "<li>a</li><li>b</li>");
}

#[test]
fn included_template_blocks_are_not_overridden_by_includer_chain() {
    let engine = engine_with(&[
        ("base", "[{% block body %}{% endblock %}]"),
        ("widget", "{% block body %}widget-default{% endblock %}"),
        ("page", "{% extends 'base' %}{% block body %}page:{% include 'widget' %}{% endblock %}"),
    ]);
    assert_eq!(
        render(&engine, "page", &mut Context::new()).unwrap(),
        "[page:widget-default]"
    );
}

#[test]
fn same_template_included_twice_in_sequence_is_not_a_cycle() {
    let engine = engine_with(&[("dot", "."), ("dots", "{% include 'dot' %}{% include 'dot' %}")]);
    assert_eq!(render(&engine, "dots", &mut Context::new()).unwrap(), "..");
}

#[test]
fn includes_resolve_from_template_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("partials")).unwrap();
    std::fs::write(dir.path().join("partials/header.tpl"), "== {{ title }} ==").unwrap();
    std::fs::write(dir.path().join("page.tpl"), "{% include 'partials/header.tpl' %}\nbody").unwrap();

    let engine = Engine::with_config(EngineConfig {
        template_dir: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    });
    let mut ctx = engine.create_context();
    ctx.set("title", "Docs");
    assert_eq!(render(&engine, "page.tpl", &mut ctx).unwrap(), "== Docs ==\nbody");
    assert!(engine.is_loaded("partials/header.tpl"));
}

#[test]
fn parse_error_in_included_file_names_that_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.tpl"), "line1\nline2 {% endif %}").unwrap();
    let engine = Engine::with_config(EngineConfig {
        template_dir: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    });
    engine.new_template("main", "{% include 'bad.tpl' %}").unwrap();
    let err = render(&engine, "main", &mut Context::new()).unwrap_err();
    match err {
        RenderError::Parse { template, line, .. } => {
            assert_eq!(template, "bad.tpl");
            assert_eq!(line, 2);
        }
        other => panic!("expected parse error, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// 3. Cycle detection
// ---------------------------------------------------------------------------

#[test]
fn self_extends_is_a_cycle() {
    let engine = engine_with(&[("loop", "{% extends 'loop' %}")]);
    let err = render(&engine, "loop", &mut Context::new()).unwrap_err();
    assert!(matches!(err, RenderError::Cycle { .. }), "got: {err}");
}

#[test]
fn transitive_extends_cycle_is_detected() {
    let engine = engine_with(&[
        ("a", "{% extends 'b' %}"),
        ("b", "{% extends 'c' %}"),
        ("c", "{% extends 'a' %}"),
    ]);
    let err = render(&engine, "a", &mut Context::new()).unwrap_err();
    match err {
        RenderError::Cycle { chain } => assert_eq!(chain, "a -> b -> c -> a"),
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn include_cycle_is_detected() {
    let engine = engine_with(&[
        ("ping", "ping {% include 'pong' %}"),
        ("pong", "pong {% include 'ping' %}"),
    ]);
    let mut out = String::new();
    let err = engine
        .load_by_name("ping")
        .unwrap()
        .render(&mut out, &mut Context::new())
        .unwrap_err();
    assert!(matches!(err, RenderError::Cycle { .. }), "got: {err}");
    assert_eq!(out, "ping pong ");
}

#[test]
fn depth_limit_is_a_secondary_guard() {
    let engine = Engine::with_config(EngineConfig {
        max_depth: 2,
        ..EngineConfig::default()
    });
    engine.new_template("l3", "deep").unwrap();
    engine.new_template("l2", "{% include 'l3' %}").unwrap();
    engine.new_template("l1", "{% include 'l2' %}").unwrap();
    let err = render(&engine, "l1", &mut Context::new()).unwrap_err();
    assert!(matches!(err, RenderError::DepthExceeded { limit: 2, .. }), "got: {err}");
}
