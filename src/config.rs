//! Element configuration.
//!
//! [`ElementConfig`] is the serialisable form (defaults, JSON files);
//! [`AdapterOptions`] is the flag set the adapter checks at runtime.

use bitflags::bitflags;
use serde::Deserialize;

use crate::error::Result;
use crate::types::RootMode;

bitflags! {
    /// Runtime switches for an element definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AdapterOptions: u8 {
        /// Reflect observed attribute changes into typed properties.
        const REFLECT_ATTRIBUTES = 1 << 0;
        /// Run the definition's `on_connected` hook on connect.
        const RUN_ON_CONNECT     = 1 << 1;
        /// Register instances with the devtools control block.
        const DEVTOOLS           = 1 << 2;
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        AdapterOptions::REFLECT_ATTRIBUTES | AdapterOptions::RUN_ON_CONNECT
    }
}

/// Configuration of one element definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementConfig {
    /// Shadow or light root.
    pub root: RootMode,
    pub reflect_attributes: bool,
    pub run_on_connect: bool,
    pub devtools: bool,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self::from(AdapterOptions::default())
    }
}

impl ElementConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn options(&self) -> AdapterOptions {
        let mut options = AdapterOptions::empty();
        options.set(AdapterOptions::REFLECT_ATTRIBUTES, self.reflect_attributes);
        options.set(AdapterOptions::RUN_ON_CONNECT, self.run_on_connect);
        options.set(AdapterOptions::DEVTOOLS, self.devtools);
        options
    }
}

impl From<AdapterOptions> for ElementConfig {
    fn from(options: AdapterOptions) -> Self {
        Self {
            root: RootMode::default(),
            reflect_attributes: options.contains(AdapterOptions::REFLECT_ATTRIBUTES),
            run_on_connect: options.contains(AdapterOptions::RUN_ON_CONNECT),
            devtools: options.contains(AdapterOptions::DEVTOOLS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ElementConfig::default();
        assert_eq!(config.root, RootMode::Shadow);
        assert_eq!(config.options(), AdapterOptions::default());
        assert!(!config.devtools);
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = ElementConfig::from_json(r#"{"root": "light", "devtools": true}"#).unwrap();
        assert_eq!(config.root, RootMode::Light);
        assert!(config.reflect_attributes);
        assert!(config.options().contains(AdapterOptions::DEVTOOLS));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(ElementConfig::from_json(r#"{"shadow": true}"#).is_err());
    }
}
