//! Naming conventions and argument validation.
//!
//! - Style resource ids and wrapper class names derived from a component name
//! - Registration argument checks

use crate::ComponentError;

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Suffix of the injected `<style>` element id.
pub const STYLE_ID_SUFFIX: &str = "-componentary-lib-style";

/// Suffix of the class carried by synthetic scoping wrappers.
pub const SCOPED_CLASS_SUFFIX: &str = "-componentary-lib-scoped";

/// Id of the single style element backing a component.
pub fn style_resource_id(name: &str) -> String {
    format!("{}{}", name, STYLE_ID_SUFFIX)
}

/// Class carried by the scoping wrapper of a component's instances.
pub fn scoped_class(name: &str) -> String {
    format!("{}{}", name, SCOPED_CLASS_SUFFIX)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Any non-empty name is accepted. Whitespace in a name splits the wrapper
/// class into several classes, which the scope prefix compounds back together.
pub fn validate_component_name(name: &str) -> Result<(), ComponentError> {
    if name.is_empty() {
        return Err(ComponentError::Validation(
            "Cannot register the component. The name must be a non-empty string".into(),
        ));
    }
    Ok(())
}

/// Templates are only parsed at instantiation; here we just reject empty text.
pub fn validate_template(name: &str, template: &str) -> Result<(), ComponentError> {
    if template.is_empty() {
        return Err(ComponentError::Validation(format!(
            "Cannot register `{}` component. The template must be a non-empty string",
            name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_resource_id() {
        assert_eq!(style_resource_id("badge"), "badge-componentary-lib-style");
    }

    #[test]
    fn test_scoped_class() {
        assert_eq!(scoped_class("badge"), "badge-componentary-lib-scoped");
    }

    #[test]
    fn test_validate_component_name() {
        assert!(validate_component_name("my-card").is_ok());
        assert!(matches!(
            validate_component_name(""),
            Err(ComponentError::Validation(_))
        ));
        assert!(validate_component_name("my card").is_ok());
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("x", "<p></p>").is_ok());
        let err = validate_template("x", "").unwrap_err();
        assert!(err.to_string().contains("`x`"));
    }
}
