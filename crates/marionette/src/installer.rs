//! Idempotent on-demand installation of actor capabilities.

use crate::address::{Address, CapabilityId};
use crate::client::EngineClient;
use crate::errors::{Error, Result};
use crate::poll::{poll_until, PollConfig, PollError};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl EngineClient {
    /// Whether `capability` is currently listed in the descriptor of
    /// `address`. A failed descriptor read propagates; treating it as
    /// "absent" would mask a real outage behind a blind install.
    pub async fn has_capability(
        &self,
        address: &Address,
        capability: &CapabilityId,
    ) -> Result<bool> {
        let descriptor = self.fetch_descriptor(address).await?;
        Ok(descriptor.has_capability(capability))
    }

    /// Install `capability` on `address` unless it is already present.
    ///
    /// Returns once the install event is accepted (2xx), not once the
    /// capability is usable: visibility is eventually consistent. Callers
    /// needing immediate use follow up with [`wait_installed`] or accept a
    /// settle delay. Calling twice in sequence issues exactly one install
    /// event; the second call sees the capability listed and performs no
    /// network write.
    ///
    /// [`wait_installed`]: EngineClient::wait_installed
    pub async fn ensure_installed(
        &self,
        address: &Address,
        capability: &CapabilityId,
        source_url: &str,
    ) -> Result<()> {
        if self.has_capability(address, capability).await? {
            debug!(%capability, %address, "capability already installed");
            return Ok(());
        }
        self.transport
            .post(
                &["c", address.as_str(), "install"],
                &json!({ "url": source_url, "config": {} }),
            )
            .await?;
        info!(%capability, %address, "capability install accepted");
        Ok(())
    }

    /// Bounded settle-check: poll the descriptor of `address` until
    /// `capability` appears or the attempt budget is exhausted.
    ///
    /// Probe failures inside the loop count as "not yet" and are retried;
    /// this is one of the two places the crate retries at all.
    pub async fn wait_installed(
        &self,
        address: &Address,
        capability: &CapabilityId,
        poll: &PollConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let client = self;
        let outcome = poll_until(poll, cancel, move |attempt| async move {
            match client.has_capability(address, capability).await {
                Ok(true) => Some(()),
                Ok(false) => None,
                Err(e) => {
                    debug!(attempt, error = %e, "settle-check probe failed");
                    None
                }
            }
        })
        .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(PollError::Exhausted { attempts }) => Err(Error::Timeout {
                stage: format!("capability settle-check for {}", capability),
                attempts,
            }),
            Err(PollError::Cancelled) => Err(Error::Cancelled),
        }
    }
}
