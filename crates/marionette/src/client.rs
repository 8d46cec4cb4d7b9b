use crate::address::{Address, CapabilityId};
use crate::errors::{Error, Result};
use crate::transport::HttpTransport;
use serde_json::Value;
use tracing::debug;

/// High-level client for one engine instance.
///
/// Holds no mutable state between calls: every operation re-fetches and
/// re-validates from scratch, so the client is safe to share and invoke
/// concurrently. Descriptor, resolver, installer and envelope operations
/// are implemented in their own modules.
#[derive(Debug, Clone)]
pub struct EngineClient {
    pub(crate) transport: HttpTransport,
}

impl EngineClient {
    /// Create a client for the engine at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(base_url)?,
        })
    }

    /// Create a client over an explicitly configured transport.
    pub fn with_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub fn base_url(&self) -> &url::Url {
        self.transport.base_url()
    }

    /// Resolve the well-known root address from the engine context.
    pub async fn root_address(&self) -> Result<Address> {
        let url = self.transport.endpoint(&["api", "root-context"]);
        let payload = self.transport.get(&["api", "root-context"]).await?;
        let address = payload
            .get("address")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::UnexpectedPayload {
                url: url.to_string(),
                detail: "root context is missing the address field".to_string(),
            })?;
        debug!(%address, "resolved root address");
        Ok(Address::from(address))
    }

    /// Issue a synchronous read against an installed capability.
    ///
    /// This is the throwing counterpart of the envelope surface, used by
    /// the resolver and the bootstrap orchestrator where a failure means
    /// the current step cannot continue.
    pub async fn query(
        &self,
        address: &Address,
        capability: &CapabilityId,
        operation: &str,
        args: &Value,
    ) -> Result<Value> {
        self.transport
            .post(
                &["c", address.as_str(), "query", capability.as_str(), operation],
                args,
            )
            .await
    }

    /// Raise an asynchronous event; side effects are applied by the
    /// runtime after the 2xx acknowledgement, not before.
    pub async fn event(
        &self,
        address: &Address,
        domain: &str,
        event_type: &str,
        args: &Value,
    ) -> Result<Value> {
        self.transport
            .post(&["c", address.as_str(), "event", domain, event_type], args)
            .await
    }
}
