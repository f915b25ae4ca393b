//! Wire types exchanged with the devtools extension.
//!
//! Field names follow what the panel script reads (`Data`, `Id`, `Val`).

use serde::{Deserialize, Serialize};

use crate::store::StoreId;

/// Port name the content script connects with.
pub const CONTENT_PORT: &str = "content-page";

/// Port name the devtools panel connects with.
pub const DEVTOOLS_PORT: &str = "devtools-page";

/// Named message relayed between content script, background page and panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum BridgeMessage {
    #[serde(rename = "content-page-connected")]
    ContentPageConnected,

    #[serde(rename = "sutil-new-store")]
    NewStore {
        #[serde(rename = "Id")]
        id: StoreId,
    },
}

/// One store in a [`StoreSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreEntry {
    #[serde(rename = "Id")]
    pub id: StoreId,
    #[serde(rename = "Val")]
    pub val: serde_json::Value,
}

/// Answer to a store inspection request: `{"Data": [{"Id": .., "Val": ..}]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    #[serde(rename = "Data")]
    pub data: Vec<StoreEntry>,
}

/// Panel-settable runtime options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DevtoolsOptions {
    pub slow_animations: bool,
    /// Master switch for the crate's log events (see [`super::log_target_enabled`]).
    pub logging_enabled: bool,
}

impl Default for DevtoolsOptions {
    fn default() -> Self {
        Self {
            slow_animations: false,
            logging_enabled: true,
        }
    }
}

/// One registered element in a mount point listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountPointInfo {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Tag")]
    pub tag: String,
    #[serde(rename = "Stores")]
    pub stores: Vec<StoreId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bridge_message_names() {
        let connected = serde_json::to_value(BridgeMessage::ContentPageConnected).unwrap();
        assert_eq!(connected, json!({"name": "content-page-connected"}));

        let new_store = serde_json::to_value(BridgeMessage::NewStore { id: StoreId(4) }).unwrap();
        assert_eq!(new_store, json!({"name": "sutil-new-store", "Id": 4}));
    }

    #[test]
    fn test_bridge_message_parse() {
        let msg: BridgeMessage =
            serde_json::from_str(r#"{"name":"content-page-connected"}"#).unwrap();
        assert_eq!(msg, BridgeMessage::ContentPageConnected);
    }

    #[test]
    fn test_options_wire_names() {
        let options = DevtoolsOptions {
            slow_animations: true,
            logging_enabled: false,
        };
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            json!({"SlowAnimations": true, "LoggingEnabled": false})
        );

        let partial: DevtoolsOptions = serde_json::from_str(r#"{"SlowAnimations": true}"#).unwrap();
        assert!(partial.slow_animations);
        assert!(partial.logging_enabled);
    }

    #[test]
    fn test_store_snapshot_shape() {
        let snapshot = StoreSnapshot {
            data: vec![StoreEntry {
                id: StoreId(1),
                val: json!({"count": 5}),
            }],
        };
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            json!({"Data": [{"Id": 1, "Val": {"count": 5}}]})
        );
    }
}
