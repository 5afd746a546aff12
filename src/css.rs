//! CSS Rule Transcoder
//!
//! Parses component style text with lightningcss and prints it back with a
//! scope selector in front of every style rule. Media rules are re-emitted
//! with their body transcoded recursively.
//!
//! Only style rules and media rules are accepted. Anything else
//! (`@keyframes`, `@font-face`, `@supports`, ...) is rejected rather than
//! passed through unscoped.

use std::borrow::Cow;
use std::sync::OnceLock;

use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Features, Targets};
use lightningcss::traits::ToCss;
use regex::Regex;

use crate::ComponentError;

/// Placeholder authors use to target the scoping container itself. Every
/// occurrence is rewritten, including one glued to a longer identifier.
pub const SELF_TOKEN: &str = "$self";

/// Class the self token is rewritten to so that it parses as a selector.
pub const SELF_CLASS: &str = ".componentary-lib-self-component";

fn self_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$self").unwrap())
}

/// Replace every `$self` with [`SELF_CLASS`].
pub fn expand_self_token(css: &str) -> Cow<'_, str> {
    self_token_pattern().replace_all(css, SELF_CLASS)
}

/// Parses and prints style text, optionally under a scope prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transcoder {
    minify: bool,
}

impl Transcoder {
    pub fn new(minify: bool) -> Self {
        Self { minify }
    }

    /// Parse `css` and serialize it under `prefix`.
    pub fn transcode(&self, css: &str, prefix: Option<&str>) -> Result<String, ComponentError> {
        let source = expand_self_token(css);
        let sheet = parse_rules(&source)?;
        self.serialize(&sheet.rules, prefix)
    }

    /// Serialize a parsed rule list.
    ///
    /// - style rule: `prefix cssText`, the prefix acting as an ancestor
    /// - style rule whose selector is exactly [`SELF_CLASS`]: the class is
    ///   replaced by the prefix everywhere in the rule
    /// - media rule: `@media query { body }` with the body serialized the
    ///   same way
    pub fn serialize(&self, rules: &CssRuleList<'_>, prefix: Option<&str>) -> Result<String, ComponentError> {
        let prefix = prefix.filter(|p| !p.is_empty());
        let mut out = Vec::with_capacity(rules.0.len());

        for rule in &rules.0 {
            match rule {
                CssRule::Media(media) => {
                    let query = self.print(&media.query)?;
                    let body = self.serialize(&media.rules, prefix)?;
                    out.push(format!("@media {} {{ {} }}", query, body));
                }
                CssRule::Style(style) => {
                    let css_text = self.print(rule)?;
                    let selector = self.print(&style.selectors)?;
                    match prefix {
                        Some(p) if selector.trim() == SELF_CLASS => {
                            out.push(css_text.replace(SELF_CLASS, p))
                        }
                        Some(p) => out.push(format!("{} {}", p, css_text)),
                        None => out.push(css_text),
                    }
                }
                // @charset and friends that the parser keeps as placeholders
                CssRule::Ignored => {}
                other => {
                    return Err(ComponentError::UnsupportedRuleKind(
                        rule_kind(other).to_string(),
                    ))
                }
            }
        }

        Ok(out.join(if self.minify { "" } else { "\n" }))
    }

    fn print<T: ToCss>(&self, value: &T) -> Result<String, ComponentError> {
        value
            .to_css_string(PrinterOptions {
                minify: self.minify,
                targets: legacy_media_targets(),
                ..Default::default()
            })
            .map_err(|e| ComponentError::CssParse(e.to_string()))
    }
}

/// Keep media features in the `min-`/`max-` form hosts without range syntax
/// understand, whatever form they were authored in.
fn legacy_media_targets() -> Targets {
    Targets {
        include: Features::MediaRangeSyntax | Features::MediaIntervalSyntax,
        ..Default::default()
    }
}

/// Parse style text whose self token has already been expanded.
pub fn parse_rules(source: &str) -> Result<StyleSheet<'_>, ComponentError> {
    StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| ComponentError::CssParse(e.to_string()))
}

/// At-rule name used in error messages.
fn rule_kind(rule: &CssRule<'_>) -> &'static str {
    match rule {
        CssRule::Media(_) => "media",
        CssRule::Style(_) => "style",
        CssRule::Import(_) => "import",
        CssRule::Keyframes(_) => "keyframes",
        CssRule::FontFace(_) => "font-face",
        CssRule::Page(_) => "page",
        CssRule::Supports(_) => "supports",
        CssRule::Namespace(_) => "namespace",
        CssRule::LayerBlock(_) | CssRule::LayerStatement(_) => "layer",
        CssRule::Container(_) => "container",
        CssRule::Unknown(_) => "unknown",
        _ => "other",
    }
}
