//! Hierarchy resolution: walking the fixed chain from the well-known root
//! to a target actor's operational channel.
//!
//! Nothing here is cached. Every call re-walks the full chain, trading
//! round trips for never returning a stale address.

use crate::address::{Address, CapabilityId};
use crate::client::EngineClient;
use crate::errors::{Error, ResolveHop, Result};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Capability id of the supervision ruleset exposing the `children`
/// name→metadata map used by [`EngineClient::resolve_by_name`].
pub const SUPERVISOR_CAPABILITY: &str = "system.supervisor";

/// Query operation on [`SUPERVISOR_CAPABILITY`] returning the children map.
pub const CHILDREN_OPERATION: &str = "children";

/// Names and tags of the fixed resolution chain.
///
/// The production values live in `Default`; tests substitute their own to
/// exercise the chain against scripted hierarchies.
#[derive(Debug, Clone)]
pub struct HierarchyPath {
    /// Human-assigned name of the owner actor among the root's children.
    pub owner_name: String,
    /// Tag of the owner's elevated-permission channel.
    pub elevated_tag: String,
    /// Capability queried on the elevated channel for the nested actor.
    pub owner_capability: CapabilityId,
    /// Query operation yielding the nested workspace actor's address.
    pub workspace_operation: String,
    /// Tag selecting the workspace-scoped channel on the nested actor.
    pub domain_tag: String,
}

impl Default for HierarchyPath {
    fn default() -> Self {
        Self {
            owner_name: "Owner".to_string(),
            elevated_tag: "initialization".to_string(),
            owner_capability: CapabilityId::from("app.workspace-owner"),
            workspace_operation: "workspace_address".to_string(),
            domain_tag: "workspace".to_string(),
        }
    }
}

impl EngineClient {
    /// Walk the fixed chain from the well-known root to the workspace
    /// actor's domain-tagged channel.
    ///
    /// The hops run strictly in sequence, each depending on the previous
    /// result: root context → named child → elevated channel → workspace
    /// address query → domain-tagged channel. Each hop's failure is
    /// wrapped as a resolution error naming that hop; partial setup is an
    /// expected condition, not an exceptional one.
    pub async fn resolve(&self, path: &HierarchyPath) -> Result<Address> {
        let root = self
            .root_address()
            .await
            .map_err(|e| Error::resolution(ResolveHop::RootContext, e))?;

        let owner = self
            .find_child_by_name(&root, &path.owner_name)
            .await
            .map_err(|e| Error::resolution(ResolveHop::OwnerChild, e))?
            .ok_or_else(|| {
                Error::resolution(
                    ResolveHop::OwnerChild,
                    format!("no child named {:?} under {}", path.owner_name, root),
                )
            })?;
        debug!(%owner, "found owner actor");

        let elevated = self
            .find_channel_by_tag(&owner, &path.elevated_tag)
            .await
            .map_err(|e| Error::resolution(ResolveHop::ElevatedChannel, e))?;

        let workspace = self
            .query(
                &elevated.id,
                &path.owner_capability,
                &path.workspace_operation,
                &Value::Object(Map::new()),
            )
            .await
            .map_err(|e| Error::resolution(ResolveHop::WorkspaceQuery, e))
            .and_then(|payload| {
                payload
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(Address::from)
                    .ok_or_else(|| {
                        Error::resolution(
                            ResolveHop::WorkspaceQuery,
                            "workspace address query returned an empty result",
                        )
                    })
            })?;
        debug!(%workspace, "found workspace actor");

        let channel = self
            .find_channel_by_tag(&workspace, &path.domain_tag)
            .await
            .map_err(|e| Error::resolution(ResolveHop::DomainChannel, e))?;

        info!(address = %channel.id, "resolved workspace channel");
        Ok(channel.id)
    }

    /// Resolve a human-assigned name to a child's domain-tagged channel.
    ///
    /// Lists the current children of `parent` via the supervisor children
    /// map and takes the first exact name match in the runtime's iteration
    /// order. Duplicate names are not disambiguated; that policy is open.
    pub async fn resolve_by_name(
        &self,
        parent: &Address,
        name: &str,
        domain_tag: &str,
    ) -> Result<Address> {
        let payload = self
            .query(
                parent,
                &CapabilityId::from(SUPERVISOR_CAPABILITY),
                CHILDREN_OPERATION,
                &Value::Object(Map::new()),
            )
            .await?;

        let children = payload.as_object().ok_or_else(|| Error::UnexpectedPayload {
            url: self
                .transport
                .endpoint(&[
                    "c",
                    parent.as_str(),
                    "query",
                    SUPERVISOR_CAPABILITY,
                    CHILDREN_OPERATION,
                ])
                .to_string(),
            detail: "children query did not return a name map".to_string(),
        })?;

        let child = children
            .get(name)
            .and_then(|entry| entry.get("address"))
            .and_then(Value::as_str)
            .map(Address::from)
            .ok_or_else(|| Error::ChildNotFound {
                parent: parent.clone(),
                name: name.to_string(),
            })?;
        debug!(%child, name, "matched child in supervisor map");

        let channel = self.find_channel_by_tag(&child, domain_tag).await?;
        Ok(channel.id)
    }
}
