//! Host Module - The native element an adapter is bound to.
//!
//! The adapter never talks to a concrete element type. It sees a
//! [`HostElement`]: something with a tag name, attributes, optional own
//! properties and a place to render into (a shadow root or its light
//! children).
//!
//! - [`Node`] - In-memory node tree used for roots and rendered views
//! - [`MemoryElement`] - In-memory host element, used in tests and for
//!   rendering outside a browser

mod node;

pub use node::{Node, NodeKind};

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;

use crate::types::{PropValue, RootMode};

// =============================================================================
// Host Element
// =============================================================================

/// A native element instance as seen by the adapter.
pub trait HostElement {
    /// Tag name (lower-case).
    fn tag_name(&self) -> &str;

    /// Names of attributes currently present.
    fn attribute_names(&self) -> Vec<String>;

    fn get_attribute(&self, name: &str) -> Option<String>;

    /// Allocate (or return the existing) open shadow root.
    fn attach_shadow(&self) -> Node;

    /// Node whose children are the element's light children.
    fn light_root(&self) -> Node;

    /// Fields already set on the element before it was upgraded.
    ///
    /// They seed the property model underneath the declared defaults.
    fn own_properties(&self) -> Vec<(String, PropValue)> {
        Vec::new()
    }

    /// Allocate the render root for `mode`.
    fn attach_root(&self, mode: RootMode) -> Node {
        match mode {
            RootMode::Shadow => self.attach_shadow(),
            RootMode::Light => self.light_root(),
        }
    }
}

// =============================================================================
// Memory Element
// =============================================================================

/// In-memory [`HostElement`].
///
/// Attribute writes here only change the element; delivering the matching
/// `attribute_changed_callback` is the caller's job (as the native runtime
/// would do).
pub struct MemoryElement {
    tag: String,
    attributes: RefCell<IndexMap<String, String>>,
    properties: Vec<(String, PropValue)>,
    shadow: RefCell<Option<Node>>,
    light: Node,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            attributes: RefCell::new(IndexMap::new()),
            properties: Vec::new(),
            shadow: RefCell::new(None),
            light: Node::root(RootMode::Light),
        }
    }

    /// Builder: element parsed with `name="value"` in its markup.
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: field set on the element before upgrade.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes
            .borrow_mut()
            .insert(name.into().to_lowercase(), value.into())
    }

    /// Remove an attribute, returning the previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow_mut().shift_remove(name)
    }

    /// The shadow root, if one was attached.
    pub fn shadow_root(&self) -> Option<Node> {
        self.shadow.borrow().clone()
    }
}

impl HostElement for MemoryElement {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.borrow().keys().cloned().collect()
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn attach_shadow(&self) -> Node {
        self.shadow
            .borrow_mut()
            .get_or_insert_with(|| Node::root(RootMode::Shadow))
            .clone()
    }

    fn light_root(&self) -> Node {
        self.light.clone()
    }

    fn own_properties(&self) -> Vec<(String, PropValue)> {
        self.properties.clone()
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("tag", &self.tag)
            .field("attributes", &*self.attributes.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_element_attributes() {
        let el = MemoryElement::new("X-Counter").with_attribute("Count", "5");
        assert_eq!(el.tag_name(), "x-counter");
        assert_eq!(el.get_attribute("count"), Some("5".to_string()));
        assert_eq!(el.set_attribute("count", "6"), Some("5".to_string()));
        assert_eq!(el.remove_attribute("count"), Some("6".to_string()));
        assert!(el.attribute_names().is_empty());
    }

    #[test]
    fn test_attach_shadow_is_stable() {
        let el = MemoryElement::new("x-a");
        assert!(el.shadow_root().is_none());

        let first = el.attach_root(RootMode::Shadow);
        let second = el.attach_shadow();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.kind(), NodeKind::Root(RootMode::Shadow));
    }

    #[test]
    fn test_light_root() {
        let el = MemoryElement::new("x-a");
        let root = el.attach_root(RootMode::Light);
        assert!(root.ptr_eq(&el.light_root()));
        assert!(el.shadow_root().is_none());
    }
}
