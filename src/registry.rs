//! Component Registry
//!
//! Write-once table of component definitions keyed by name. The registry is
//! `Send + Sync` and can be shared between threads, while every document stays
//! with the thread that builds it.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::config::ComponentaryConfig;
use crate::dom::{Document, NodeId};
use crate::instantiate::Instantiator;
use crate::utils::{validate_component_name, validate_template};
use crate::{ComponentError, Result};

/// Lifecycle hook, invoked with the document and the instance root.
pub type LifecycleCallback = Arc<dyn Fn(&mut Document, NodeId) + Send + Sync>;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Optional capabilities of a component: a base style and lifecycle hooks.
///
/// Every field is optional. Leaving one out means the matching phase is never
/// observed, and without a style no scoping wrapper is created.
#[derive(Clone, Default)]
pub struct Behavior {
    style: Option<String>,
    on_created: Option<LifecycleCallback>,
    on_attached: Option<LifecycleCallback>,
    on_attribute_changed: Option<LifecycleCallback>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Runs synchronously before instantiation returns.
    pub fn on_created<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Document, NodeId) + Send + Sync + 'static,
    {
        self.on_created = Some(Arc::new(callback));
        self
    }

    /// Runs once the instance root is moved out of its fragment.
    pub fn on_attached<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Document, NodeId) + Send + Sync + 'static,
    {
        self.on_attached = Some(Arc::new(callback));
        self
    }

    /// Runs for each attribute mutation on the instance root.
    pub fn on_attribute_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Document, NodeId) + Send + Sync + 'static,
    {
        self.on_attribute_changed = Some(Arc::new(callback));
        self
    }

    /// Base style, treating empty text as no style.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref().filter(|s| !s.is_empty())
    }

    pub fn created(&self) -> Option<&LifecycleCallback> {
        self.on_created.as_ref()
    }

    pub fn attached(&self) -> Option<&LifecycleCallback> {
        self.on_attached.as_ref()
    }

    pub fn attribute_changed(&self) -> Option<&LifecycleCallback> {
        self.on_attribute_changed.as_ref()
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("style", &self.style)
            .field("on_created", &self.on_created.is_some())
            .field("on_attached", &self.on_attached.is_some())
            .field("on_attribute_changed", &self.on_attribute_changed.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentDefinition
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ComponentDefinition {
    name: String,
    template: String,
    behavior: Behavior,
}

impl ComponentDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unparsed template markup.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Registry {
    components: DashMap<String, Arc<ComponentDefinition>>,
    config: ComponentaryConfig,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ComponentaryConfig) -> Self {
        Self {
            components: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ComponentaryConfig {
        &self.config
    }

    /// Register a component under `name`.
    ///
    /// Names are write-once: registering an existing name fails and leaves the
    /// first definition in place. The template is not parsed here.
    pub fn register(&self, name: &str, template: &str, behavior: Behavior) -> Result<()> {
        validate_component_name(name)?;
        validate_template(name, template)?;

        match self.components.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ComponentError::Validation(format!(
                "`{}` is an already registered component",
                name
            ))),
            Entry::Vacant(slot) => {
                debug!(component = name, styled = behavior.style().is_some(), "registered component");
                slot.insert(Arc::new(ComponentDefinition {
                    name: name.to_string(),
                    template: template.to_string(),
                    behavior,
                }));
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        self.components.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Instantiate `name` with the default lifecycle strategy.
    pub fn instantiate(
        &self,
        doc: &mut Document,
        name: &str,
        instance_style: Option<&str>,
    ) -> Result<NodeId> {
        Instantiator::new(self).instantiate(doc, name, instance_style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_get() {
        let registry = Registry::new();
        registry
            .register("badge", "<span>hi</span>", Behavior::new().with_style("$self { margin: 0 }"))
            .unwrap();

        let definition = registry.get("badge").unwrap();
        assert_eq!(definition.name(), "badge");
        assert_eq!(definition.template(), "<span>hi</span>");
        assert_eq!(definition.behavior().style(), Some("$self { margin: 0 }"));
        assert!(registry.contains("badge"));
        assert!(!registry.contains("card"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let registry = Registry::new();
        registry.register("badge", "<span>one</span>", Behavior::new()).unwrap();
        let err = registry
            .register("badge", "<span>two</span>", Behavior::new())
            .unwrap_err();

        assert!(matches!(err, ComponentError::Validation(_)));
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.get("badge").unwrap().template(), "<span>one</span>");
    }

    #[test]
    fn test_invalid_arguments() {
        let registry = Registry::new();
        assert!(matches!(
            registry.register("", "<p></p>", Behavior::new()),
            Err(ComponentError::Validation(_))
        ));
        assert!(matches!(
            registry.register("card", "", Behavior::new()),
            Err(ComponentError::Validation(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_name_with_whitespace_is_accepted() {
        let registry = Registry::new();
        registry
            .register("my card", "<p></p>", Behavior::new().with_style("p { margin: 0 }"))
            .unwrap();
        assert!(registry.contains("my card"));

        let mut doc = Document::new();
        let root = registry.instantiate(&mut doc, "my card", None).unwrap();
        assert_eq!(doc.class_list(root), vec!["my", "card-componentary-lib-scoped"]);
        let style = doc.get_element_by_id("my card-componentary-lib-style").unwrap();
        assert!(doc
            .text_content(style)
            .starts_with(".my.card-componentary-lib-scoped p"));
    }

    #[test]
    fn test_empty_style_counts_as_absent() {
        let behavior = Behavior::new().with_style("");
        assert_eq!(behavior.style(), None);
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(name, "<i></i>", Behavior::new()).unwrap();
        }
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_concurrent_registration_is_write_once() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register("shared", &format!("<b>{}</b>", i), Behavior::new())
                        .is_ok()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let behavior = Behavior::new().on_created(|_, _| {});
        let text = format!("{:?}", behavior);
        assert!(text.contains("on_created: true"));
        assert!(text.contains("on_attached: false"));
    }
}
