use clap::Parser;
use marionette::{BootstrapConfig, BootstrapSequence, PollConfig};
use std::time::Duration;
use tracing::debug;

use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct BootstrapArgs {
    /// Resource locator of the bootstrap capability's definition
    #[arg(required = true)]
    pub source_url: String,

    /// Attempt budget shared by the channel and status stages
    #[arg(long, default_value_t = 30)]
    pub attempts: u32,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 1)]
    pub interval_secs: u64,
}

/// Run the bootstrap sequence against the root actor and wait for the
/// created sub-actors to be reported.
pub async fn execute_async(args: &BootstrapArgs, ctx: &CommandContext) -> CliResult<()> {
    let client = ctx.create_client()?;
    let mut config = BootstrapConfig::new(args.source_url.clone());
    config.poll = PollConfig::new(Duration::from_secs(args.interval_secs), args.attempts);

    debug!(source = %args.source_url, attempts = args.attempts, "starting bootstrap");
    let mut sequence = BootstrapSequence::new(&client, config);
    let report = sequence.run(Some(&ctx.shutdown_token)).await?;

    if ctx.output.is_json() {
        return ctx.output.json_value(&report.status);
    }
    ctx.output
        .success(&format!("bootstrap complete, owner: {}", report.owner_address));
    ctx.output.json_value(&report.status)?;
    Ok(())
}
