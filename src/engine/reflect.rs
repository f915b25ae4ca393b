//! Property Reflection Bridge - Typed accessors over the property store.
//!
//! One [`PropertyAccessor`] per declared default, built once per definition.
//! Each accessor remembers the [`DefaultValueKind`] of its default, so a
//! write never has to inspect the stored value to decide how to coerce.
//!
//! - `get(key)` - Value from the property model, unconverted
//! - `set(key, value)` - Coerce into the key's kind, then update the model
//! - `reflect_attribute` - Write one changed attribute into its property

use std::rc::Rc;

use crate::store::Store;
use crate::types::{
    AttributeMap, DefaultValueKind, DefaultValues, INTEGER_NAN, PropValue, PropertyModel,
};

// =============================================================================
// Accessor
// =============================================================================

/// Get/set pair for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAccessor {
    key: String,
    attribute: String,
    kind: DefaultValueKind,
}

impl PropertyAccessor {
    pub fn new(key: impl Into<String>, kind: DefaultValueKind) -> Self {
        let key = key.into();
        Self {
            attribute: key.to_lowercase(),
            key,
            kind,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Observed attribute name (lower-cased key).
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn kind(&self) -> DefaultValueKind {
        self.kind
    }

    pub fn get(&self, model: &PropertyModel) -> Option<PropValue> {
        model.get(&self.key).cloned()
    }

    pub fn coerce(&self, value: PropValue) -> PropValue {
        let coerced = self.kind.coerce(value.clone());
        let unreadable = match &coerced {
            PropValue::Integer(v) => *v == INTEGER_NAN && value != coerced,
            PropValue::Float(v) => v.is_nan() && !value.as_float().is_some_and(f64::is_nan),
            _ => false,
        };
        if unreadable {
            tracing::warn!(key = %self.key, input = %value, "value has no numeric reading, storing NaN");
        }
        coerced
    }
}

// =============================================================================
// Bridge
// =============================================================================

/// The accessors installed on one element.
///
/// Cloning shares the accessor list.
#[derive(Debug, Clone)]
pub struct PropertyBridge {
    accessors: Rc<[PropertyAccessor]>,
}

impl PropertyBridge {
    /// One accessor per default, in declaration order.
    pub fn from_defaults(defaults: &DefaultValues) -> Self {
        let accessors: Vec<PropertyAccessor> = defaults
            .iter()
            .map(|(key, value)| PropertyAccessor::new(key, value.kind()))
            .collect();
        Self {
            accessors: accessors.into(),
        }
    }

    pub fn accessor(&self, key: &str) -> Option<&PropertyAccessor> {
        self.accessors.iter().find(|a| a.key == key)
    }

    /// Accessor whose observed attribute is `name` (case-insensitive).
    pub fn accessor_for_attribute(&self, name: &str) -> Option<&PropertyAccessor> {
        self.accessors
            .iter()
            .find(|a| a.attribute.eq_ignore_ascii_case(name))
    }

    /// Property names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().map(|a| a.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn get(&self, props: &Store<PropertyModel>, key: &str) -> Option<PropValue> {
        let accessor = self.accessor(key)?;
        props.with(|model| accessor.get(model))
    }

    /// Coerce and write. Returns the stored value, or `None` for an unknown key.
    pub fn set(&self, props: &Store<PropertyModel>, key: &str, value: PropValue) -> Option<PropValue> {
        let accessor = self.accessor(key)?;
        let coerced = accessor.coerce(value);
        let stored = coerced.clone();
        props.update(|model| model.with(&accessor.key, coerced));
        Some(stored)
    }

    /// Apply attribute values to a model being seeded.
    pub fn apply_attributes(&self, model: PropertyModel, attrs: &AttributeMap) -> PropertyModel {
        attrs.iter().fold(model, |model, (name, value)| {
            match self.accessor_for_attribute(name) {
                Some(accessor) => model.with(&accessor.key, accessor.coerce(value.into())),
                None => model,
            }
        })
    }

    /// Write the value of attribute `name` into its property, if `name`
    /// names one (case-insensitive). Returns the stored value.
    ///
    /// Called for every attribute change, including a re-set to the same
    /// value. A removed attribute (`None`) leaves its property untouched.
    pub fn reflect_attribute(
        &self,
        props: &Store<PropertyModel>,
        name: &str,
        value: Option<&str>,
    ) -> Option<PropValue> {
        let value = value?;
        let key = self.accessor_for_attribute(name)?.key.clone();
        self.set(props, &key, PropValue::Text(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn bridge_and_store() -> (PropertyBridge, Store<PropertyModel>) {
        let defaults = DefaultValues::new()
            .with("count", 0)
            .with("ratio", 0.5)
            .with("enabled", false)
            .with("maxLabel", "none");
        let bridge = PropertyBridge::from_defaults(&defaults);
        let props = Store::new(PropertyModel::seed(Vec::new(), defaults.iter()));
        (bridge, props)
    }

    #[test]
    fn test_accessor_kinds_fixed_from_defaults() {
        let (bridge, _) = bridge_and_store();
        let kinds: Vec<_> = ["count", "ratio", "enabled", "maxLabel"]
            .iter()
            .map(|k| bridge.accessor(k).map(PropertyAccessor::kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(DefaultValueKind::Integer),
                Some(DefaultValueKind::Float),
                Some(DefaultValueKind::Boolean),
                Some(DefaultValueKind::Text),
            ]
        );
        assert_eq!(
            bridge.names().collect::<Vec<_>>(),
            vec!["count", "ratio", "enabled", "maxLabel"]
        );
    }

    #[test]
    fn test_set_coerces_into_key_type() {
        let (bridge, props) = bridge_and_store();

        bridge.set(&props, "count", "42".into());
        bridge.set(&props, "ratio", "2.25".into());
        bridge.set(&props, "enabled", "on".into());
        bridge.set(&props, "maxLabel", 7.into());

        assert_eq!(bridge.get(&props, "count"), Some(PropValue::Integer(42)));
        assert_eq!(bridge.get(&props, "ratio"), Some(PropValue::Float(2.25)));
        assert_eq!(bridge.get(&props, "enabled"), Some(PropValue::Boolean(true)));
        assert_eq!(bridge.get(&props, "maxLabel"), Some(PropValue::Text("7".into())));
    }

    #[test]
    fn test_set_unknown_key() {
        let (bridge, props) = bridge_and_store();
        assert_eq!(bridge.set(&props, "missing", "1".into()), None);
        assert!(!props.get().contains("missing"));
    }

    #[test]
    fn test_set_notifies_once() {
        let (bridge, props) = bridge_and_store();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let _sub = props.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        bridge.set(&props, "count", "1".into());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_accessor_for_attribute_case_insensitive() {
        let (bridge, _) = bridge_and_store();
        assert_eq!(
            bridge.accessor_for_attribute("maxlabel").map(PropertyAccessor::key),
            Some("maxLabel")
        );
        assert_eq!(
            bridge.accessor_for_attribute("MAXLABEL").map(PropertyAccessor::key),
            Some("maxLabel")
        );
    }

    #[test]
    fn test_apply_attributes() {
        let (bridge, props) = bridge_and_store();
        let attrs = AttributeMap::new()
            .with("count", Some("5"))
            .with("maxlabel", Some("big"))
            .with("title", Some("ignored"));

        let model = bridge.apply_attributes(props.get(), &attrs);
        assert_eq!(model.get("count"), Some(&PropValue::Integer(5)));
        assert_eq!(model.get("maxLabel"), Some(&PropValue::Text("big".into())));
        assert!(!model.contains("title"));
    }

    #[test]
    fn test_reflect_attribute() {
        let (bridge, props) = bridge_and_store();

        assert_eq!(
            bridge.reflect_attribute(&props, "count", Some("5")),
            Some(PropValue::Integer(5))
        );
        assert_eq!(
            bridge.reflect_attribute(&props, "MAXLABEL", Some("big")),
            Some(PropValue::Text("big".into()))
        );
        assert_eq!(bridge.reflect_attribute(&props, "title", Some("x")), None);

        // Removal keeps the property
        assert_eq!(bridge.reflect_attribute(&props, "count", None), None);
        assert_eq!(bridge.get(&props, "count"), Some(PropValue::Integer(5)));
    }

    #[test]
    fn test_same_value_attribute_wins_over_property_write() {
        let (bridge, props) = bridge_and_store();

        bridge.reflect_attribute(&props, "count", Some("5"));
        bridge.set(&props, "count", 7.into());
        assert_eq!(bridge.get(&props, "count"), Some(PropValue::Integer(7)));

        // Last write wins in both directions, even for an unchanged attribute
        bridge.reflect_attribute(&props, "count", Some("5"));
        assert_eq!(bridge.get(&props, "count"), Some(PropValue::Integer(5)));
    }
}
