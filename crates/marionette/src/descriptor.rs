//! Actor descriptor snapshots and the queries built on them.
//!
//! Descriptors are always fetched fresh; nothing here caches across calls
//! and no consistency is guaranteed between two fetches of the same
//! address.

use crate::address::{Address, CapabilityId};
use crate::client::EngineClient;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Capability id of the system UI ruleset present on every actor; exposes
/// the name projection used by child-by-name scans.
pub const SYSTEM_UI_CAPABILITY: &str = "system.actor-ui";

/// Query operation on [`SYSTEM_UI_CAPABILITY`] returning the actor's
/// human-assigned name as a JSON string.
pub const NAME_OPERATION: &str = "name";

/// Normalized snapshot of one actor: child addresses, channel aliases and
/// installed capability identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDescriptor {
    #[serde(default)]
    pub children: Vec<Address>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub installed_capabilities: Vec<CapabilityRef>,
}

impl ActorDescriptor {
    pub fn has_capability(&self, capability: &CapabilityId) -> bool {
        self.installed_capabilities
            .iter()
            .any(|entry| &entry.id == capability)
    }
}

/// A named/tagged alias of an actor carrying its own permission scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Address,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRef {
    pub id: CapabilityId,
}

impl EngineClient {
    /// Fetch a fresh descriptor for `address`.
    pub async fn fetch_descriptor(&self, address: &Address) -> Result<ActorDescriptor> {
        let payload = self
            .transport
            .get(&["c", address.as_str(), "descriptor"])
            .await?;
        let url = self.transport.endpoint(&["c", address.as_str(), "descriptor"]);
        serde_json::from_value(payload).map_err(|e| Error::UnexpectedPayload {
            url: url.to_string(),
            detail: format!("descriptor did not deserialize: {}", e),
        })
    }

    /// Return the first channel of `address` whose tag set contains `tag`.
    ///
    /// Match order follows the order the runtime returned the channels in.
    pub async fn find_channel_by_tag(&self, address: &Address, tag: &str) -> Result<Channel> {
        let descriptor = self.fetch_descriptor(address).await?;
        descriptor
            .channels
            .into_iter()
            .find(|channel| channel.tags.iter().any(|t| t == tag))
            .ok_or_else(|| Error::ChannelNotFound {
                address: address.clone(),
                tag: tag.to_string(),
            })
    }

    /// Fetch the human-assigned name of `address` via the system UI
    /// capability.
    pub async fn actor_name(&self, address: &Address) -> Result<String> {
        let payload = self
            .query(
                address,
                &CapabilityId::from(SYSTEM_UI_CAPABILITY),
                NAME_OPERATION,
                &Value::Object(Map::new()),
            )
            .await?;
        payload
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::UnexpectedPayload {
                url: self
                    .transport
                    .endpoint(&[
                        "c",
                        address.as_str(),
                        "query",
                        SYSTEM_UI_CAPABILITY,
                        NAME_OPERATION,
                    ])
                    .to_string(),
                detail: "name projection was not a string".to_string(),
            })
    }

    /// Scan the children of `address` for the first one whose name query
    /// returns exactly `name`.
    ///
    /// A child that fails to respond (still initializing, unreachable) is
    /// skipped, never fatal. Returns `None` once every child has been
    /// tried. Cost is O(children) round trips; callers are infrequent and
    /// externally triggered.
    pub async fn find_child_by_name(
        &self,
        address: &Address,
        name: &str,
    ) -> Result<Option<Address>> {
        let descriptor = self.fetch_descriptor(address).await?;
        for child in descriptor.children {
            match self.actor_name(&child).await {
                Ok(child_name) if child_name == name => {
                    debug!(%child, name, "matched child by name");
                    return Ok(Some(child));
                }
                Ok(_) => {}
                Err(e) => {
                    trace!(%child, error = %e, "skipping unresponsive child");
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_deserializes_wire_shape() {
        let descriptor: ActorDescriptor = serde_json::from_value(json!({
            "children": ["child-1", "child-2"],
            "channels": [
                {"id": "chan-1", "tags": ["initialization"], "name": "admin"},
                {"id": "chan-2", "tags": []}
            ],
            "installedCapabilities": [{"id": "app.workspace-owner"}]
        }))
        .unwrap();

        assert_eq!(descriptor.children.len(), 2);
        assert_eq!(descriptor.channels.len(), 2);
        assert_eq!(descriptor.channels[0].name.as_deref(), Some("admin"));
        assert!(descriptor.has_capability(&CapabilityId::from("app.workspace-owner")));
        assert!(!descriptor.has_capability(&CapabilityId::from("app.other")));
    }

    #[test]
    fn descriptor_fields_default_when_absent() {
        let descriptor: ActorDescriptor = serde_json::from_value(json!({})).unwrap();
        assert!(descriptor.children.is_empty());
        assert!(descriptor.channels.is_empty());
        assert!(descriptor.installed_capabilities.is_empty());
    }
}
