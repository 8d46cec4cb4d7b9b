use clap::Parser;
use marionette::{Address, CapabilityId, PollConfig};
use std::time::Duration;
use tracing::debug;

use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct InstallArgs {
    /// Address of the actor to install on
    #[arg(required = true)]
    pub address: String,

    /// Capability id being installed
    #[arg(required = true)]
    pub capability: String,

    /// Resource locator of the capability's definition
    #[arg(required = true)]
    pub url: String,

    /// Poll until the capability is visible, not just accepted
    #[arg(long)]
    pub wait: bool,

    /// Settle-check attempts when --wait is set
    #[arg(long, default_value_t = 30)]
    pub attempts: u32,

    /// Settle-check interval in seconds when --wait is set
    #[arg(long, default_value_t = 1)]
    pub interval_secs: u64,
}

/// Install a capability on an actor. Idempotent: an already-installed
/// capability issues no write.
pub async fn execute_async(args: &InstallArgs, ctx: &CommandContext) -> CliResult<()> {
    let client = ctx.create_client()?;
    let address = Address::from(args.address.as_str());
    let capability = CapabilityId::from(args.capability.as_str());

    debug!(%address, %capability, "ensuring capability installed");
    client
        .ensure_installed(&address, &capability, &args.url)
        .await?;

    if args.wait {
        let poll = PollConfig::new(Duration::from_secs(args.interval_secs), args.attempts);
        client
            .wait_installed(&address, &capability, &poll, Some(&ctx.shutdown_token))
            .await?;
        ctx.output
            .success(&format!("{} installed and visible on {}", capability, address));
    } else {
        ctx.output.success(&format!(
            "{} install accepted on {} (visibility is eventually consistent)",
            capability, address
        ));
    }
    Ok(())
}
