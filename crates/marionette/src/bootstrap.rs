//! Bootstrap orchestrator: drives the one-time multi-actor creation
//! sequence and tracks which stage it is in, so a timeout names the hop
//! that never completed instead of failing generically.
//!
//! The runtime offers no push notification for creation progress;
//! bounded polling is the only completion detection that cannot hang.

use crate::address::{Address, CapabilityId};
use crate::client::EngineClient;
use crate::errors::{Error, Result};
use crate::poll::{poll_until, PollConfig, PollError};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Discrete stages of the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    NotStarted,
    /// Installing the bootstrap capability on the root actor.
    Installing,
    /// Waiting for the bootstrap-tagged channel to appear on the root.
    AwaitingChannel,
    /// Polling the status operation until the owner identifier appears.
    AwaitingStatus,
    Complete,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapStage::NotStarted => "bootstrap not-started",
            BootstrapStage::Installing => "bootstrap install",
            BootstrapStage::AwaitingChannel => "bootstrap channel discovery",
            BootstrapStage::AwaitingStatus => "bootstrap status poll",
            BootstrapStage::Complete => "bootstrap complete",
        };
        write!(f, "{}", name)
    }
}

/// Configuration of one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Capability installed on the root to kick the sequence off.
    pub capability: CapabilityId,
    /// Resource locator of the capability's definition.
    pub source_url: String,
    /// Tag of the channel the root grows once installation lands.
    pub channel_tag: String,
    /// Status-report operation queried on that channel.
    pub status_operation: String,
    /// Status payload field whose presence marks completion.
    pub owner_field: String,
    /// Shared attempt budget across the channel and status stages.
    pub poll: PollConfig,
}

impl BootstrapConfig {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            capability: CapabilityId::from("app.bootstrap"),
            source_url: source_url.into(),
            channel_tag: "bootstrap".to_string(),
            status_operation: "bootstrap_status".to_string(),
            owner_field: "ownerAddress".to_string(),
            poll: PollConfig::default(),
        }
    }
}

/// Final status payload of a completed bootstrap: the parsed owner
/// address plus the full payload carrying every created actor's
/// identifiers.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub owner_address: Address,
    pub status: Value,
}

/// One bootstrap run against one engine.
#[derive(Debug)]
pub struct BootstrapSequence<'a> {
    client: &'a EngineClient,
    config: BootstrapConfig,
    stage: BootstrapStage,
}

impl<'a> BootstrapSequence<'a> {
    pub fn new(client: &'a EngineClient, config: BootstrapConfig) -> Self {
        Self {
            client,
            config,
            stage: BootstrapStage::NotStarted,
        }
    }

    /// The last stage this sequence reached.
    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// Drive the sequence to completion.
    ///
    /// Install the bootstrap capability on the root, then spend one
    /// shared attempt budget first discovering the bootstrap-tagged
    /// channel and then polling its status operation. Returns the full
    /// status payload the instant the owner field is populated. A
    /// spent budget surfaces as a timeout naming the stage reached.
    pub async fn run(&mut self, cancel: Option<&CancellationToken>) -> Result<BootstrapReport> {
        let root = self.client.root_address().await?;

        self.stage = BootstrapStage::Installing;
        self.client
            .ensure_installed(&root, &self.config.capability, &self.config.source_url)
            .await?;
        self.stage = BootstrapStage::AwaitingChannel;
        info!(%root, "bootstrap install accepted, polling for completion");

        // Stage progress is tracked through Cell/RefCell so the poll
        // closure can record it without holding &mut self across awaits.
        let stage = Cell::new(self.stage);
        let channel: RefCell<Option<Address>> = RefCell::new(None);
        let client = self.client;
        let config = &self.config;
        let root = &root;

        let outcome = poll_until(&config.poll, cancel, |attempt| {
            let stage = &stage;
            let channel = &channel;
            async move {
                if channel.borrow().is_none() {
                    match client.find_channel_by_tag(root, &config.channel_tag).await {
                        Ok(found) => {
                            debug!(attempt, channel = %found.id, "bootstrap channel appeared");
                            *channel.borrow_mut() = Some(found.id);
                            stage.set(BootstrapStage::AwaitingStatus);
                        }
                        Err(e) => {
                            debug!(attempt, error = %e, "bootstrap channel not yet present");
                            return None;
                        }
                    }
                }
                let target = channel.borrow().clone()?;
                match client
                    .query(
                        &target,
                        &config.capability,
                        &config.status_operation,
                        &Value::Object(Map::new()),
                    )
                    .await
                {
                    Ok(status) => status
                        .get(&config.owner_field)
                        .and_then(Value::as_str)
                        .filter(|owner| !owner.is_empty())
                        .map(Address::from)
                        .map(|owner_address| BootstrapReport {
                            owner_address,
                            status,
                        }),
                    Err(e) => {
                        debug!(attempt, error = %e, "bootstrap status not yet available");
                        None
                    }
                }
            }
        })
        .await;

        self.stage = stage.get();
        match outcome {
            Ok(report) => {
                self.stage = BootstrapStage::Complete;
                info!(owner = %report.owner_address, "bootstrap complete");
                Ok(report)
            }
            Err(PollError::Exhausted { attempts }) => Err(Error::Timeout {
                stage: self.stage.to_string(),
                attempts,
            }),
            Err(PollError::Cancelled) => Err(Error::Cancelled),
        }
    }
}
