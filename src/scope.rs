//! Scope Injector
//!
//! Wraps an instance root in a synthetic container and injects the
//! component's style text into the document head, rewritten so it only
//! matches inside that container.
//!
//! A component gets one `<style id="<name>-componentary-lib-style">` for its
//! whole lifetime. Once it exists, later instances are returned unwrapped and
//! their instance style is ignored.

use lightningcss::properties::PropertyId;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};
use tracing::{debug, warn};

use crate::config::ComponentaryConfig;
use crate::css::Transcoder;
use crate::dom::{Document, NodeId};
use crate::utils::{scoped_class, style_resource_id};
use crate::{ComponentError, Result};

/// Compound class selector for `container`, e.g. `.card-componentary-lib-scoped`.
///
/// The class list joined by spaces must be at least `min_len` characters,
/// which keeps short generic class names from leaking scoped rules onto
/// unrelated markup.
pub fn scope_prefix(doc: &Document, container: NodeId, min_len: usize) -> Result<String> {
    prefix_for_class_name(&doc.class_name(container), min_len)
}

fn prefix_for_class_name(class_name: &str, min_len: usize) -> Result<String> {
    let classes: Vec<&str> = class_name.split_ascii_whitespace().collect();
    let class_name = classes.join(" ");
    if class_name.chars().count() < min_len {
        return Err(ComponentError::Configuration(format!(
            "The scope container needs a class list of at least {} characters, found `{}`",
            min_len, class_name
        )));
    }
    Ok(format!(".{}", classes.join(".")))
}

/// Rewrite `css` so that it only applies inside `container`.
pub fn scope(
    doc: &Document,
    css: &str,
    container: NodeId,
    config: &ComponentaryConfig,
) -> Result<String> {
    let prefix = scope_prefix(doc, container, config.min_scope_len)?;
    Transcoder::new(config.minify_styles).transcode(css, Some(&prefix))
}

/// Scoped base style followed by the scoped instance style.
fn scoped_component_css(
    class_name: &str,
    base_style: &str,
    instance_style: Option<&str>,
    config: &ComponentaryConfig,
) -> Result<String> {
    let prefix = prefix_for_class_name(class_name, config.min_scope_len)?;
    let transcoder = Transcoder::new(config.minify_styles);
    let mut css = transcoder.transcode(base_style, Some(&prefix))?;
    if let Some(instance_style) = instance_style.filter(|s| !s.is_empty()) {
        css.push_str(&transcoder.transcode(instance_style, Some(&prefix))?);
    }
    Ok(css)
}

/// Wrap `root` and inject the component style, once per component name.
///
/// Returns the node that should be handed out as the instance: the new
/// wrapper, or `root` itself when nothing was injected.
pub fn inject(
    doc: &mut Document,
    name: &str,
    base_style: Option<&str>,
    fragment: NodeId,
    root: NodeId,
    instance_style: Option<&str>,
    config: &ComponentaryConfig,
) -> Result<NodeId> {
    let Some(base_style) = base_style.filter(|s| !s.is_empty()) else {
        return Ok(root);
    };
    let style_id = style_resource_id(name);
    if doc.get_element_by_id(&style_id).is_some() {
        if instance_style.is_some_and(|s| !s.is_empty()) {
            warn!(component = name, "style already injected, ignoring instance style");
        }
        return Ok(root);
    }

    // Scope everything before touching the tree.
    let class_name = scoped_class(name);
    let css = scoped_component_css(&class_name, base_style, instance_style, config)?;

    let wrapper = doc.create_element("div");
    doc.set_attribute(wrapper, "class", &class_name)?;

    if let Some(display) = inline_display(doc, root) {
        doc.set_attribute(wrapper, "style", &format!("display: {}", display))?;
    }
    let reference = (doc.parent(root) == Some(fragment)).then_some(root);
    doc.insert_before(fragment, wrapper, reference)?;
    doc.append_child(wrapper, root)?;

    let style = doc.create_element("style");
    doc.set_attribute(style, "id", &style_id)?;
    doc.set_text_content(style, &css)?;
    let head = doc.head();
    doc.append_child(head, style)?;

    debug!(component = name, bytes = css.len(), "injected scoped style");
    Ok(wrapper)
}

/// The `display` declaration of the node's inline style, if any.
fn inline_display(doc: &Document, node: NodeId) -> Option<String> {
    let text = doc.get_attribute(node, "style")?;
    let style = StyleAttribute::parse(text, ParserOptions::default()).ok()?;
    let (property, _important) = style.declarations.get(&PropertyId::Display)?;
    property.value_to_css_string(PrinterOptions::default()).ok()
}
