//! Core types for spark-elements.
//!
//! These types define the foundation that everything builds on.
//! They flow through the stores, the lifecycle adapter and the mount point.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by mounts and subscriptions.
///
/// Call this to release the resources it guards.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Prop Value
// =============================================================================

/// Sentinel stored for an integer property when the written value has no
/// integer reading (`parseInt` would have produced `NaN`) or lies outside
/// the `i64` range.
///
/// An `Integer(i64::MIN)` written directly is stored as is and reads the
/// same as the sentinel.
pub const INTEGER_NAN: i64 = i64::MIN;

/// A property value.
///
/// Serialises to a plain JSON scalar, so a model snapshot reads the same as
/// the object a script would see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl PropValue {
    /// The coercion kind this value declares when used as a default.
    pub fn kind(&self) -> DefaultValueKind {
        match self {
            PropValue::Integer(_) => DefaultValueKind::Integer,
            PropValue::Float(_) => DefaultValueKind::Float,
            PropValue::Boolean(_) => DefaultValueKind::Boolean,
            PropValue::Text(_) => DefaultValueKind::Text,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Integer(v) => write!(f, "{v}"),
            PropValue::Float(v) => write!(f, "{v}"),
            PropValue::Boolean(v) => write!(f, "{v}"),
            PropValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Integer(value as i64)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Integer(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Boolean(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

// =============================================================================
// Default Value Kind - Coercion dispatch
// =============================================================================

/// Fixed type of a property, taken from its declared default.
///
/// Computed once per key at construction; every write is coerced into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultValueKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl DefaultValueKind {
    /// Coerce an externally supplied value into this kind.
    ///
    /// The result always has this kind. Unreadable numbers become
    /// [`INTEGER_NAN`] or `f64::NAN`.
    pub fn coerce(self, value: PropValue) -> PropValue {
        match self {
            DefaultValueKind::Integer => PropValue::Integer(to_integer(&value)),
            DefaultValueKind::Float => PropValue::Float(to_float(&value)),
            DefaultValueKind::Boolean => PropValue::Boolean(to_bool(&value)),
            DefaultValueKind::Text => match value {
                PropValue::Text(s) => PropValue::Text(s),
                other => PropValue::Text(other.to_string()),
            },
        }
    }
}

const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn to_integer(value: &PropValue) -> i64 {
    match value {
        PropValue::Integer(v) => *v,
        // -2^63 <= t < 2^63; `as` would saturate outside it
        PropValue::Float(v) if v.is_finite() && (I64_LOWER..I64_UPPER).contains(&v.trunc()) => {
            v.trunc() as i64
        }
        PropValue::Float(_) | PropValue::Boolean(_) => INTEGER_NAN,
        PropValue::Text(s) => parse_int_prefix(s).unwrap_or(INTEGER_NAN),
    }
}

fn to_float(value: &PropValue) -> f64 {
    match value {
        PropValue::Integer(v) => *v as f64,
        PropValue::Float(v) => *v,
        PropValue::Boolean(_) => f64::NAN,
        PropValue::Text(s) => parse_float_prefix(s).unwrap_or(f64::NAN),
    }
}

fn to_bool(value: &PropValue) -> bool {
    match value {
        PropValue::Boolean(v) => *v,
        other => {
            let text = other.to_string().to_ascii_lowercase();
            matches!(text.as_str(), "on" | "yes" | "true")
        }
    }
}

/// Read a leading integer like `parseInt` without a radix: leading
/// whitespace and trailing garbage are ignored ("42px" reads as 42) and a
/// `0x`/`0X` prefix switches to hexadecimal ("0x10" reads as 16).
///
/// `None` when no digits follow or the value does not fit in an `i64`.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let end = digits
        .bytes()
        .take_while(|b| (*b as char).is_digit(radix))
        .count();
    if end == 0 {
        return None;
    }
    // Parse with the sign attached so i64::MIN itself fits
    let signed = format!("{}{}", if negative { "-" } else { "" }, &digits[..end]);
    i64::from_str_radix(&signed, radix).ok()
}

/// Read the longest leading decimal number, ignoring leading whitespace
/// ("1.5e3rem" reads as 1500.0).
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    if s[i..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let digits_from = |start: usize| bytes[start.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    let int_digits = digits_from(i);
    i += int_digits;

    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = digits_from(i + 1);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = digits_from(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    s[..i].parse().ok()
}

// =============================================================================
// Default Values
// =============================================================================

/// Declared property defaults, in declaration order.
///
/// The keys become the element's properties; the lower-cased keys become its
/// observed attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultValues(IndexMap<String, PropValue>);

impl DefaultValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a default.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parse defaults from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attribute names observed for these defaults (lower-cased keys).
    pub fn observed_attributes(&self) -> Vec<String> {
        self.0.keys().map(|k| k.to_lowercase()).collect()
    }
}

// =============================================================================
// Attribute Map
// =============================================================================

/// Current attribute values of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, String>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this map with `name` set, or removed when `value` is `None`.
    pub fn with(&self, name: &str, value: Option<&str>) -> Self {
        let mut next = self.0.clone();
        match value {
            Some(v) => {
                next.insert(name.to_string(), v.to_string());
            }
            None => {
                next.remove(name);
            }
        }
        Self(next)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Property Model
// =============================================================================

/// Property values of one element.
///
/// The key set is fixed when the model is seeded; [`PropertyModel::with`]
/// only replaces values of existing keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyModel(IndexMap<String, PropValue>);

impl PropertyModel {
    /// Seed a model: host fields first, declared defaults win.
    pub fn seed<'a>(
        host_fields: impl IntoIterator<Item = (String, PropValue)>,
        defaults: impl IntoIterator<Item = (&'a str, &'a PropValue)>,
    ) -> Self {
        let mut map: IndexMap<String, PropValue> = host_fields.into_iter().collect();
        for (key, value) in defaults {
            map.insert(key.to_string(), value.clone());
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Copy of this model with `key` replaced. Unknown keys leave it unchanged.
    pub fn with(&self, key: &str, value: PropValue) -> Self {
        let mut next = self.0.clone();
        if let Some(slot) = next.get_mut(key) {
            *slot = value;
        }
        Self(next)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Lifecycle / Root
// =============================================================================

/// Lifecycle state of an element instance.
///
/// `Unattached` only exists while construction is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unattached,
    Constructed,
    Connected,
    /// Terminal.
    Disconnected,
}

/// Where an element renders its view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootMode {
    /// Open shadow root.
    #[default]
    Shadow,
    /// Directly into the element's children.
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Coercion
    // =========================================================================

    #[test]
    fn test_integer_coercion() {
        let kind = DefaultValueKind::Integer;
        assert_eq!(kind.coerce("5".into()), PropValue::Integer(5));
        assert_eq!(kind.coerce("  -12px".into()), PropValue::Integer(-12));
        assert_eq!(kind.coerce("3.9".into()), PropValue::Integer(3));
        assert_eq!(kind.coerce(7.8.into()), PropValue::Integer(7));
        assert_eq!(kind.coerce(PropValue::Integer(9)), PropValue::Integer(9));
    }

    #[test]
    fn test_integer_coercion_sentinel() {
        let kind = DefaultValueKind::Integer;
        assert_eq!(kind.coerce("abc".into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(kind.coerce("".into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(kind.coerce("-".into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(kind.coerce(true.into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(
            kind.coerce(f64::NAN.into()),
            PropValue::Integer(INTEGER_NAN)
        );
    }

    #[test]
    fn test_integer_overflow_is_sentinel() {
        let kind = DefaultValueKind::Integer;
        assert_eq!(
            kind.coerce("99999999999999999999".into()),
            PropValue::Integer(INTEGER_NAN)
        );
        assert_eq!(kind.coerce(1e30.into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(kind.coerce((-1e30).into()), PropValue::Integer(INTEGER_NAN));
        assert_eq!(
            kind.coerce(9_223_372_036_854_775_808.0.into()),
            PropValue::Integer(INTEGER_NAN)
        );

        // Largest in-range values still convert
        assert_eq!(
            kind.coerce("9223372036854775807".into()),
            PropValue::Integer(i64::MAX)
        );
        assert_eq!(kind.coerce(1e18.into()), PropValue::Integer(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_integer_hex_prefix() {
        assert_eq!(parse_int_prefix("0x10"), Some(16));
        assert_eq!(parse_int_prefix("  -0XfFpx"), Some(-255));
        assert_eq!(parse_int_prefix("0x"), None);
        assert_eq!(parse_int_prefix("0"), Some(0));
        assert_eq!(parse_int_prefix("010"), Some(10));
    }

    #[test]
    fn test_float_coercion() {
        let kind = DefaultValueKind::Float;
        assert_eq!(kind.coerce("1.5".into()), PropValue::Float(1.5));
        assert_eq!(kind.coerce(" 1.5e3rem".into()), PropValue::Float(1500.0));
        assert_eq!(kind.coerce(".25".into()), PropValue::Float(0.25));
        assert_eq!(kind.coerce("-Infinity".into()), PropValue::Float(f64::NEG_INFINITY));
        assert_eq!(kind.coerce(PropValue::Integer(2)), PropValue::Float(2.0));
        assert_eq!(kind.coerce("7e".into()), PropValue::Float(7.0));

        let nan = kind.coerce("none".into());
        assert!(nan.as_float().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_bool_coercion() {
        let kind = DefaultValueKind::Boolean;
        for truthy in ["on", "YES", "True", "true"] {
            assert_eq!(kind.coerce(truthy.into()), PropValue::Boolean(true));
        }
        for falsy in ["off", "no", "1", "", "truthy"] {
            assert_eq!(kind.coerce(falsy.into()), PropValue::Boolean(false));
        }
        assert_eq!(kind.coerce(true.into()), PropValue::Boolean(true));
        assert_eq!(kind.coerce(1.into()), PropValue::Boolean(false));
    }

    #[test]
    fn test_text_coercion_keeps_text() {
        let kind = DefaultValueKind::Text;
        assert_eq!(kind.coerce("hello".into()), PropValue::Text("hello".into()));
        assert_eq!(kind.coerce(42.into()), PropValue::Text("42".into()));
        assert_eq!(kind.coerce(false.into()), PropValue::Text("false".into()));
    }

    // =========================================================================
    // Maps
    // =========================================================================

    #[test]
    fn test_observed_attributes_lowercased() {
        let defaults = DefaultValues::new().with("maxCount", 10).with("label", "x");
        assert_eq!(defaults.observed_attributes(), vec!["maxcount", "label"]);
    }

    #[test]
    fn test_defaults_from_json() {
        let defaults =
            DefaultValues::from_json(r#"{"count": 0, "ratio": 0.5, "on": false, "name": "a"}"#)
                .unwrap();
        let kinds: Vec<_> = defaults.iter().map(|(_, v)| v.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DefaultValueKind::Integer,
                DefaultValueKind::Float,
                DefaultValueKind::Boolean,
                DefaultValueKind::Text,
            ]
        );
    }

    #[test]
    fn test_attribute_map_set_and_remove() {
        let map = AttributeMap::new().with("count", Some("1")).with("count", Some("2"));
        assert_eq!(map.get("count"), Some("2"));
        assert_eq!(map.len(), 1);

        let removed = map.with("count", None);
        assert!(!removed.contains("count"));
        // Original untouched
        assert_eq!(map.get("count"), Some("2"));
    }

    #[test]
    fn test_property_model_seed_defaults_win() {
        let defaults = DefaultValues::new().with("count", 0);
        let model = PropertyModel::seed(
            vec![
                ("count".to_string(), PropValue::Integer(99)),
                ("id".to_string(), PropValue::Text("host".into())),
            ],
            defaults.iter(),
        );
        assert_eq!(model.get("count"), Some(&PropValue::Integer(0)));
        assert_eq!(model.get("id"), Some(&PropValue::Text("host".into())));
    }

    #[test]
    fn test_property_model_keys_fixed() {
        let model = PropertyModel::seed(Vec::new(), DefaultValues::new().with("a", 1).iter());
        let next = model.with("b", PropValue::Integer(2));
        assert!(!next.contains("b"));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_property_model_serialises_plain() {
        let defaults = DefaultValues::new().with("count", 5).with("enabled", true);
        let model = PropertyModel::seed(Vec::new(), defaults.iter());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"count":5,"enabled":true}"#);
    }
}
