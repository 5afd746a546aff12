//! # Componentary
//!
//! Custom element emulation for hosts without native custom elements.
//!
//! A component is a named template plus a [`Behavior`]. Registering it once
//! in a [`Registry`] lets the caller materialize any number of detached
//! instances into a [`Document`]:
//!
//! - the template is parsed into a detached fragment,
//! - component styles are rewritten so they only match inside a synthetic
//!   scoping wrapper, and injected into the document head exactly once,
//! - lifecycle callbacks (created, attached, attribute changed) are wired
//!   with mutation observers since the host has no native hooks.
//!
//! ```text
//! register(name, template, behavior) → instantiate(name) → NodeId (detached)
//!                                                         → caller inserts it
//! ```

pub mod config;
pub mod css;
pub mod dom;
pub mod instantiate;
pub mod registry;
pub mod scope;
pub mod utils;

use thiserror::Error;

pub use config::ComponentaryConfig;
pub use dom::{Document, DomError, NodeId, NodeKind};
pub use instantiate::{Instantiator, LifecycleStrategy, MutationLifecycle};
pub use registry::{Behavior, ComponentDefinition, LifecycleCallback, Registry};

// ---------------------------------------------------------------------------
// ComponentError
// ---------------------------------------------------------------------------

/// Errors raised by registration, instantiation and style scoping.
///
/// All of them describe authoring mistakes and are surfaced immediately at
/// the offending call; nothing is retried.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Bad registration arguments or a duplicate component name.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Instantiation of a name that was never registered.
    #[error("`{0}` is not a registered component")]
    Lookup(String),

    /// The template has no element to act as the instance root.
    #[error("The `{0}` component doesn't contain a valid node")]
    Structural(String),

    /// The scope container's class list is absent or too short.
    #[error("Scope configuration error: {0}")]
    Configuration(String),

    /// The stylesheet contains a rule that is neither a style nor a media rule.
    #[error("Only style rules and media rules are supported for style scoping, found @{0}")]
    UnsupportedRuleKind(String),

    #[error("CSS error: {0}")]
    CssParse(String),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}

pub type Result<T, E = ComponentError> = std::result::Result<T, E>;
