use componentary::{Behavior, ComponentaryConfig, Document, Registry};
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sha256(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

const CARD_STYLE: &str = r#"
    $self { display: block; padding: 8px }
    .title, .subtitle { margin: 0 }
    @media (min-width: 600px) {
        $self { padding: 16px }
        .title { font-size: 2em }
    }
"#;

/// Build a document with a few styled and unstyled instances.
fn render(minify: bool) -> String {
    let registry = Registry::with_config(ComponentaryConfig {
        minify_styles: minify,
        ..Default::default()
    });
    registry
        .register(
            "card",
            "<article><h2 class='title'>T</h2><p class='subtitle'>S</p></article>",
            Behavior::new().with_style(CARD_STYLE),
        )
        .unwrap();
    registry
        .register(
            "tag",
            "<span>tag</span>",
            Behavior::new().on_created(|doc, root| {
                doc.set_attribute(root, "data-kind", "tag").unwrap();
            }),
        )
        .unwrap();

    let mut doc = Document::new();
    let body = doc.body();
    for name in ["card", "tag", "card", "tag"] {
        let root = registry.instantiate(&mut doc, name, None).unwrap();
        doc.append_child(body, root).unwrap();
    }
    doc.flush_mutations();
    doc.to_html()
}

// ============================================================================
// Deterministic output
// ============================================================================

#[test]
fn deterministic_render_identical_bytes() {
    let first = render(false);
    let second = render(false);
    assert_eq!(first, second);
    assert_eq!(sha256(&first), sha256(&second));
}

#[test]
fn deterministic_minified_render_identical_bytes() {
    assert_eq!(sha256(&render(true)), sha256(&render(true)));
}

#[test]
fn minified_output_is_smaller() {
    let pretty = render(false);
    let minified = render(true);
    assert_ne!(sha256(&pretty), sha256(&minified));
    assert!(minified.len() < pretty.len());
}

#[test]
fn only_one_style_element_per_component() {
    let html = render(true);
    assert_eq!(html.matches("<style").count(), 1);
    assert_eq!(html.matches("card-componentary-lib-style").count(), 1);
    assert_eq!(html.matches(r#"data-kind="tag""#).count(), 2);
}
