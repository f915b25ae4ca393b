//! Element Registry - Tag name to definition mapping.
//!
//! The standard element-definition API:
//! - `define(name, definition)` - Bind a valid, unused custom element name
//! - `upgrade(host)` - Construct an instance for a host whose tag is defined
//! - `observed_attributes(name)` - Attribute list computed once at definition

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::definition::ElementDefinition;
use crate::engine::instance::ElementInstance;
use crate::error::{ElementError, Result};
use crate::host::HostElement;

/// Names the platform reserves even though they contain a hyphen.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Definitions by tag name.
    static DEFINITIONS: RefCell<HashMap<String, ElementDefinition>> = RefCell::new(HashMap::new());
}

/// Whether `name` is a valid custom element name: starts with an ASCII
/// lower-case letter, contains a hyphen, has no upper-case ASCII letters and
/// is not reserved.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_lowercase()
        && name.contains('-')
        && !name.chars().any(|c| c.is_ascii_uppercase())
        && chars.all(|c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || !c.is_ascii()
        })
        && !RESERVED_NAMES.contains(&name)
}

// =============================================================================
// Definition
// =============================================================================

/// Bind `name` to `definition`.
pub fn define(name: &str, definition: ElementDefinition) -> Result<()> {
    if !is_valid_name(name) {
        return Err(ElementError::InvalidName(name.to_string()));
    }
    DEFINITIONS.with(|defs| {
        let mut defs = defs.borrow_mut();
        if defs.contains_key(name) {
            return Err(ElementError::AlreadyDefined(name.to_string()));
        }
        tracing::debug!(
            name,
            observed = ?definition.observed_attributes(),
            "custom element defined"
        );
        defs.insert(name.to_string(), definition);
        Ok(())
    })
}

pub fn is_defined(name: &str) -> bool {
    DEFINITIONS.with(|defs| defs.borrow().contains_key(name))
}

pub fn get_definition(name: &str) -> Option<ElementDefinition> {
    DEFINITIONS.with(|defs| defs.borrow().get(name).cloned())
}

/// Observed attributes of a defined element.
pub fn observed_attributes(name: &str) -> Option<Vec<String>> {
    DEFINITIONS.with(|defs| {
        defs.borrow()
            .get(name)
            .map(|d| d.observed_attributes().to_vec())
    })
}

/// All defined names, sorted.
pub fn defined_names() -> Vec<String> {
    let mut names: Vec<String> = DEFINITIONS.with(|defs| defs.borrow().keys().cloned().collect());
    names.sort();
    names
}

// =============================================================================
// Upgrade
// =============================================================================

/// Construct an instance for `host` using the definition of its tag name.
pub fn upgrade(host: Rc<dyn HostElement>) -> Result<Rc<ElementInstance>> {
    let name = host.tag_name().to_string();
    // Clone out: views may upgrade nested elements while we construct
    let definition = get_definition(&name).ok_or(ElementError::Undefined(name))?;
    ElementInstance::construct(&definition, host)
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Remove every definition (for testing).
pub fn reset_definitions() {
    DEFINITIONS.with(|defs| defs.borrow_mut().clear());
}
