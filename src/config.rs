//! Scoping configuration.

use serde::{Deserialize, Serialize};

/// Minimum length of the space-joined class list used as a scope prefix.
/// Shorter class names are too generic and risk matching unrelated elements.
pub const DEFAULT_MIN_SCOPE_LEN: usize = 10;

/// Knobs for style scoping, shared by the registry and the instantiator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentaryConfig {
    /// Print injected style text with lightningcss' minifying printer.
    pub minify_styles: bool,
    /// Collision guard for scope prefixes, in characters.
    pub min_scope_len: usize,
}

impl Default for ComponentaryConfig {
    fn default() -> Self {
        Self {
            minify_styles: false,
            min_scope_len: DEFAULT_MIN_SCOPE_LEN,
        }
    }
}
