//! End-to-end tests: register, instantiate, mount, serialize.

use componentary::{Behavior, ComponentError, ComponentaryConfig, Document, NodeKind, Registry};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn minified_registry() -> Registry {
    Registry::with_config(ComponentaryConfig {
        minify_styles: true,
        ..Default::default()
    })
}

fn style_text(doc: &Document, name: &str) -> String {
    let id = format!("{}-componentary-lib-style", name);
    let style = doc
        .get_element_by_id(&id)
        .unwrap_or_else(|| panic!("missing style element #{}", id));
    doc.text_content(style)
}

fn style_count(doc: &Document) -> usize {
    doc.children(doc.head())
        .filter(|&n| doc.tag_name(n) == Some("style"))
        .count()
}

// ---------------------------------------------------------------------------
// Unstyled components
// ---------------------------------------------------------------------------

#[test]
fn unstyled_component_returns_template_root() {
    let registry = Registry::new();
    registry
        .register("badge", "<span class='x'>hi</span>", Behavior::default())
        .unwrap();

    let mut doc = Document::new();
    let root = registry.instantiate(&mut doc, "badge", None).unwrap();

    assert_eq!(doc.tag_name(root), Some("span"));
    assert_eq!(doc.outer_html(root), r#"<span class="x">hi</span>"#);
    assert_eq!(style_count(&doc), 0);

    let parent = doc.parent(root).unwrap();
    assert_eq!(doc.kind(parent), Some(&NodeKind::Fragment));
}

#[test]
fn instances_are_independent() {
    let registry = Registry::new();
    registry
        .register("item", "<li>entry</li>", Behavior::default())
        .unwrap();

    let mut doc = Document::new();
    let first = registry.instantiate(&mut doc, "item", None).unwrap();
    let second = registry.instantiate(&mut doc, "item", None).unwrap();
    assert_ne!(first, second);

    doc.set_attribute(first, "class", "active").unwrap();
    assert!(!doc.has_attribute(second, "class"));
}

// ---------------------------------------------------------------------------
// Styled components
// ---------------------------------------------------------------------------

#[test]
fn styled_component_is_wrapped_and_scoped() {
    let registry = minified_registry();
    registry
        .register(
            "card",
            "<article><h2 class='title'>Hello</h2></article>",
            Behavior::new().with_style("$self { padding: 8px } .title { margin: 0 }"),
        )
        .unwrap();

    let mut doc = Document::new();
    let root = registry.instantiate(&mut doc, "card", None).unwrap();
    let body = doc.body();
    doc.append_child(body, root).unwrap();

    assert_eq!(
        doc.outer_html(root),
        r#"<div class="card-componentary-lib-scoped"><article><h2 class="title">Hello</h2></article></div>"#
    );
    assert_eq!(
        style_text(&doc, "card"),
        ".card-componentary-lib-scoped{padding:8px}.card-componentary-lib-scoped .title{margin:0}"
    );
}

#[test]
fn style_is_injected_once_with_first_instance_style() {
    let registry = minified_registry();
    registry
        .register(
            "card",
            "<article></article>",
            Behavior::new().with_style("article { margin: 0 }"),
        )
        .unwrap();

    let mut doc = Document::new();
    let first = registry
        .instantiate(&mut doc, "card", Some("article { color: red }"))
        .unwrap();
    let second = registry
        .instantiate(&mut doc, "card", Some("article { color: blue }"))
        .unwrap();

    assert_eq!(style_count(&doc), 1);
    let text = style_text(&doc, "card");
    assert!(text.contains("color:red"), "{}", text);
    assert!(!text.contains("blue"), "{}", text);

    // Only the instance that injected the style is wrapped.
    assert_eq!(doc.tag_name(first), Some("div"));
    assert_eq!(doc.tag_name(second), Some("article"));
}

#[test]
fn media_rules_are_scoped() {
    let registry = minified_registry();
    registry
        .register(
            "grid",
            "<section></section>",
            Behavior::new().with_style("@media (min-width: 600px) { .cell { margin: 0 } }"),
        )
        .unwrap();

    let mut doc = Document::new();
    registry.instantiate(&mut doc, "grid", None).unwrap();

    assert_eq!(
        style_text(&doc, "grid"),
        "@media (min-width:600px) { .grid-componentary-lib-scoped .cell{margin:0} }"
    );
}

#[test]
fn inline_display_moves_to_wrapper() {
    let registry = minified_registry();
    registry
        .register(
            "pill",
            r#"<span style="display: inline-flex">x</span>"#,
            Behavior::new().with_style("$self { margin: 0 }"),
        )
        .unwrap();

    let mut doc = Document::new();
    let root = registry.instantiate(&mut doc, "pill", None).unwrap();
    assert_eq!(doc.get_attribute(root, "style"), Some("display: inline-flex"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn unsupported_rule_fails_without_side_effects() {
    let registry = Registry::new();
    registry
        .register(
            "spinner",
            "<i></i>",
            Behavior::new().with_style("@keyframes spin { to { opacity: 1 } }"),
        )
        .unwrap();

    let mut doc = Document::new();
    let err = registry.instantiate(&mut doc, "spinner", None).unwrap_err();
    match err {
        ComponentError::UnsupportedRuleKind(kind) => assert_eq!(kind, "keyframes"),
        other => panic!("Expected UnsupportedRuleKind, got {:?}", other),
    }
    assert_eq!(style_count(&doc), 0);

    // The failure did not claim the style slot.
    let err = registry.instantiate(&mut doc, "spinner", None).unwrap_err();
    assert!(matches!(err, ComponentError::UnsupportedRuleKind(_)));
}

#[test]
fn short_scope_class_is_a_configuration_error() {
    let registry = Registry::with_config(ComponentaryConfig {
        min_scope_len: 40,
        ..Default::default()
    });
    registry
        .register("tiny", "<p></p>", Behavior::new().with_style("p { margin: 0 }"))
        .unwrap();

    let mut doc = Document::new();
    let err = registry.instantiate(&mut doc, "tiny", None).unwrap_err();
    assert!(matches!(err, ComponentError::Configuration(_)));
}

#[test]
fn error_messages_name_the_component() {
    let registry = Registry::new();
    registry.register("empty", "just text", Behavior::new()).unwrap();

    let mut doc = Document::new();
    assert_eq!(
        registry.instantiate(&mut doc, "nope", None).unwrap_err().to_string(),
        "`nope` is not a registered component"
    );
    assert_eq!(
        registry.instantiate(&mut doc, "empty", None).unwrap_err().to_string(),
        "The `empty` component doesn't contain a valid node"
    );
}

#[test]
fn rendered_document_contains_head_style_and_body_instance() {
    let registry = minified_registry();
    registry
        .register(
            "hello",
            "<p class='greeting'>hi</p>",
            Behavior::new().with_style(".greeting { margin: 0 }"),
        )
        .unwrap();

    let mut doc = Document::new();
    let root = registry.instantiate(&mut doc, "hello", None).unwrap();
    let body = doc.body();
    doc.append_child(body, root).unwrap();

    assert_eq!(
        doc.to_html(),
        concat!(
            "<!DOCTYPE html><html><head>",
            r#"<style id="hello-componentary-lib-style">"#,
            ".hello-componentary-lib-scoped .greeting{margin:0}",
            "</style></head><body>",
            r#"<div class="hello-componentary-lib-scoped"><p class="greeting">hi</p></div>"#,
            "</body></html>"
        )
    );
}
