//! Custom Element Adapter - Per-variant construction policy.
//!
//! An element definition delegates the variant-specific parts of
//! construction to a [`CustomElementAdapter`]:
//! - which attributes are observed
//! - which attributes are snapshot into the attribute store
//! - which defaults seed the property model
//! - whether property accessors are installed
//!
//! Two variants ship with the crate:
//! - [`ReflectingAdapter`] - Declared defaults, typed property accessors
//! - [`PlainAdapter`] - No declared properties; the view reads attributes only

use crate::engine::reflect::PropertyBridge;
use crate::host::HostElement;
use crate::types::{AttributeMap, DefaultValues};

/// Variant-specific construction policy.
pub trait CustomElementAdapter {
    /// Observed attribute names, fixed when the adapter is built.
    fn observed_attributes(&self) -> &[String];

    /// Declared defaults (empty when the variant has no properties).
    fn defaults(&self) -> &DefaultValues;

    /// Accessors to install on each instance, if this variant has any.
    fn property_bridge(&self) -> Option<PropertyBridge>;

    /// Attribute values captured at construction.
    fn snapshot_attributes(&self, host: &dyn HostElement) -> AttributeMap {
        self.observed_attributes()
            .iter()
            .filter_map(|name| host.get_attribute(name).map(|value| (name.clone(), value)))
            .collect()
    }

    fn is_observed(&self, name: &str) -> bool {
        self.observed_attributes()
            .iter()
            .any(|observed| observed.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// Reflecting
// =============================================================================

/// Variant with declared defaults and typed property accessors.
#[derive(Debug, Clone)]
pub struct ReflectingAdapter {
    defaults: DefaultValues,
    observed: Vec<String>,
    bridge: PropertyBridge,
}

impl ReflectingAdapter {
    pub fn new(defaults: DefaultValues) -> Self {
        Self {
            observed: defaults.observed_attributes(),
            bridge: PropertyBridge::from_defaults(&defaults),
            defaults,
        }
    }
}

impl CustomElementAdapter for ReflectingAdapter {
    fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    fn defaults(&self) -> &DefaultValues {
        &self.defaults
    }

    fn property_bridge(&self) -> Option<PropertyBridge> {
        Some(self.bridge.clone())
    }
}

// =============================================================================
// Plain
// =============================================================================

/// Variant without properties.
///
/// Every attribute present at construction is captured; nothing is observed
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct PlainAdapter {
    defaults: DefaultValues,
}

impl PlainAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CustomElementAdapter for PlainAdapter {
    fn observed_attributes(&self) -> &[String] {
        &[]
    }

    fn defaults(&self) -> &DefaultValues {
        &self.defaults
    }

    fn property_bridge(&self) -> Option<PropertyBridge> {
        None
    }

    fn snapshot_attributes(&self, host: &dyn HostElement) -> AttributeMap {
        host.attribute_names()
            .into_iter()
            .filter_map(|name| host.get_attribute(&name).map(|value| (name, value)))
            .collect()
    }
}
