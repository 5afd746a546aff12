//! Mutation observation.
//!
//! Every child-list and attribute change queues a [`MutationRecord`] on the
//! observers registered for the mutated node. Records are held until
//! [`Document::flush_mutations`] delivers them in batches, the way the
//! platform delivers mutation records on a microtask after the change.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{Document, NodeId};

/// Receives a batch of records; the document is handed back so the callback
/// can keep working on the tree.
pub type MutationCallback = Rc<dyn Fn(&mut Document, &[MutationRecord])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Which mutations an observer is interested in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    /// Also match mutations of descendants of the target.
    pub subtree: bool,
}

impl MutationObserverInit {
    pub fn child_list() -> Self {
        Self {
            child_list: true,
            ..Default::default()
        }
    }

    pub fn attributes() -> Self {
        Self {
            attributes: true,
            ..Default::default()
        }
    }

    pub fn with_subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    fn accepts(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes => self.attributes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub(crate) fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub(crate) fn attribute(target: NodeId, name: String, old_value: Option<String>) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name),
            old_value,
        }
    }
}

struct Observer {
    id: ObserverId,
    callback: MutationCallback,
    targets: Vec<(NodeId, MutationObserverInit)>,
    pending: Vec<MutationRecord>,
}

/// Observers in creation order, which is also delivery order.
#[derive(Default)]
pub(crate) struct ObserverTable {
    next_id: u64,
    observers: Vec<Observer>,
}

impl fmt::Debug for ObserverTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverTable")
            .field("observers", &self.observers.len())
            .field(
                "pending",
                &self.observers.iter().map(|o| o.pending.len()).sum::<usize>(),
            )
            .finish()
    }
}

impl ObserverTable {
    fn find_mut(&mut self, id: ObserverId) -> Option<&mut Observer> {
        self.observers.iter_mut().find(|o| o.id == id)
    }
}

impl Document {
    /// Register a new observer on `target`.
    pub fn observe<F>(&mut self, target: NodeId, init: MutationObserverInit, callback: F) -> ObserverId
    where
        F: Fn(&mut Document, &[MutationRecord]) + 'static,
    {
        let id = ObserverId(self.observers.next_id);
        self.observers.next_id += 1;
        self.observers.observers.push(Observer {
            id,
            callback: Rc::new(callback),
            targets: vec![(target, init)],
            pending: Vec::new(),
        });
        id
    }

    /// Add another target to an existing observer. Observing the same target
    /// again replaces its options.
    pub fn observe_more(&mut self, id: ObserverId, target: NodeId, init: MutationObserverInit) -> bool {
        let Some(observer) = self.observers.find_mut(id) else {
            return false;
        };
        match observer.targets.iter_mut().find(|(node, _)| *node == target) {
            Some(slot) => slot.1 = init,
            None => observer.targets.push((target, init)),
        }
        true
    }

    /// Drop an observer together with its undelivered records.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.observers.len();
        self.observers.observers.retain(|o| o.id != id);
        before != self.observers.observers.len()
    }

    /// Take the undelivered records of an observer without invoking it.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .find_mut(id)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.observers.len()
    }

    pub fn has_pending_mutations(&self) -> bool {
        self.observers.observers.iter().any(|o| !o.pending.is_empty())
    }

    /// Deliver queued records until none are left.
    ///
    /// Each round hands every observer with pending records its whole batch,
    /// in observer creation order. Records queued by callbacks are picked up
    /// by the next round. Returns the number of batches delivered.
    pub fn flush_mutations(&mut self) -> usize {
        let mut delivered = 0;
        while self.has_pending_mutations() {
            let round: Vec<ObserverId> = self
                .observers
                .observers
                .iter()
                .filter(|o| !o.pending.is_empty())
                .map(|o| o.id)
                .collect();

            for id in round {
                // A callback earlier in the round may have disconnected it.
                let Some(observer) = self.observers.find_mut(id) else {
                    continue;
                };
                if observer.pending.is_empty() {
                    continue;
                }
                let records = std::mem::take(&mut observer.pending);
                let callback = Rc::clone(&observer.callback);
                trace!(observer = ?id, records = records.len(), "delivering mutation records");
                callback(self, &records);
                delivered += 1;
            }
        }
        delivered
    }

    pub(crate) fn queue_mutation(&mut self, record: MutationRecord) {
        if self.observers.observers.is_empty() {
            return;
        }
        let ancestors: Vec<NodeId> = record.target.ancestors(&self.arena).collect();
        for observer in &mut self.observers.observers {
            let interested = observer.targets.iter().any(|(target, init)| {
                init.accepts(record.kind)
                    && (*target == record.target || (init.subtree && ancestors.contains(target)))
            });
            if interested {
                observer.pending.push(record.clone());
            }
        }
    }
}
