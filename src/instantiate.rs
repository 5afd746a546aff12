//! Instantiator
//!
//! Turns a registered component into a detached instance:
//!
//! 1. parse the template into a fragment
//! 2. pick the first element (or nested fragment) as the root
//! 3. wrap it and inject the component style when the component has one
//! 4. run `on_created`, then arm the attached / attribute-changed watchers
//!
//! The host has no native lifecycle hooks, so the watchers are emulated by a
//! [`LifecycleStrategy`]. [`MutationLifecycle`] is the default one.

use tracing::debug;

use crate::config::ComponentaryConfig;
use crate::dom::{Document, MutationKind, MutationObserverInit, NodeId, NodeKind};
use crate::registry::{LifecycleCallback, Registry};
use crate::scope;
use crate::{ComponentError, Result};

// ---------------------------------------------------------------------------
// Lifecycle strategies
// ---------------------------------------------------------------------------

/// How the attached and attribute-changed phases are detected.
pub trait LifecycleStrategy {
    /// Call `callback` once `root` leaves `fragment`.
    fn watch_attached(
        &self,
        doc: &mut Document,
        fragment: NodeId,
        root: NodeId,
        callback: LifecycleCallback,
    );

    /// Call `callback` for each attribute mutation on `root` itself.
    fn watch_attribute_changes(&self, doc: &mut Document, root: NodeId, callback: LifecycleCallback);
}

/// Mutation observers on the fragment and on the root.
///
/// The attached watcher fires when the root is removed from its fragment,
/// which is what inserting it anywhere else does. It does not check that the
/// new parent is connected, and it stays armed after firing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationLifecycle;

impl LifecycleStrategy for MutationLifecycle {
    fn watch_attached(
        &self,
        doc: &mut Document,
        fragment: NodeId,
        root: NodeId,
        callback: LifecycleCallback,
    ) {
        doc.observe(fragment, MutationObserverInit::child_list(), move |doc, records| {
            for record in records {
                if record.removed_nodes.contains(&root) {
                    callback(doc, root);
                }
            }
        });
    }

    fn watch_attribute_changes(&self, doc: &mut Document, root: NodeId, callback: LifecycleCallback) {
        doc.observe(root, MutationObserverInit::attributes(), move |doc, records| {
            for record in records {
                if record.kind == MutationKind::Attributes && record.target == root {
                    callback(doc, root);
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Instantiator
// ---------------------------------------------------------------------------

pub struct Instantiator<'r, S = MutationLifecycle> {
    registry: &'r Registry,
    strategy: S,
    config: ComponentaryConfig,
}

impl<'r> Instantiator<'r, MutationLifecycle> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            strategy: MutationLifecycle,
            config: registry.config().clone(),
        }
    }
}

impl<'r, S: LifecycleStrategy> Instantiator<'r, S> {
    pub fn with_strategy<T: LifecycleStrategy>(self, strategy: T) -> Instantiator<'r, T> {
        Instantiator {
            registry: self.registry,
            strategy,
            config: self.config,
        }
    }

    /// Override the registry's configuration for this instantiator.
    pub fn with_config(mut self, config: ComponentaryConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a detached instance of `name`.
    ///
    /// The returned node is still parented by its fragment; inserting it into
    /// the document is up to the caller. `instance_style` only takes effect on
    /// the first instantiation of a styled component.
    pub fn instantiate(
        &self,
        doc: &mut Document,
        name: &str,
        instance_style: Option<&str>,
    ) -> Result<NodeId> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| ComponentError::Lookup(name.to_string()))?;
        let behavior = definition.behavior();

        let fragment = doc.parse_fragment(definition.template());
        let node = doc
            .children(fragment)
            .find(|&child| matches!(doc.kind(child), Some(NodeKind::Element(_) | NodeKind::Fragment)))
            .ok_or_else(|| ComponentError::Structural(name.to_string()))?;

        let root = scope::inject(
            doc,
            name,
            behavior.style(),
            fragment,
            node,
            instance_style,
            &self.config,
        )?;

        if let Some(created) = behavior.created() {
            created(doc, root);
        }
        if let Some(attached) = behavior.attached() {
            self.strategy
                .watch_attached(doc, fragment, root, attached.clone());
        }
        if let Some(changed) = behavior.attribute_changed() {
            self.strategy
                .watch_attribute_changes(doc, root, changed.clone());
        }

        debug!(component = name, wrapped = root != node, "instantiated component");
        Ok(root)
    }
}
