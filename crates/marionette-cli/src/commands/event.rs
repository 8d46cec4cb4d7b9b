use clap::Parser;
use marionette::OperationEnvelope;
use tracing::debug;

use crate::commands::{parse_args, query::render_result};
use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct EventArgs {
    /// Target channel address
    #[arg(required = true)]
    pub address: String,

    /// Event domain
    #[arg(required = true)]
    pub domain: String,

    /// Event type
    #[arg(required = true)]
    pub event_type: String,

    /// Event attributes as a JSON object
    #[arg(long)]
    pub args: Option<String>,

    /// Correlation id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,
}

/// Raise an event through the uniform envelope. Side effects land
/// asynchronously; success only means the engine accepted the event.
pub async fn execute_async(args: &EventArgs, ctx: &CommandContext) -> CliResult<()> {
    let arguments = parse_args(args.args.as_deref())?;
    let mut envelope = OperationEnvelope::event(
        args.address.as_str(),
        args.domain.as_str(),
        args.event_type.as_str(),
    )
    .with_arguments(arguments);
    if let Some(id) = &args.id {
        envelope = envelope.with_correlation_id(id.clone());
    }

    debug!(address = %args.address, domain = %args.domain, event_type = %args.event_type, "raising event");
    let client = ctx.create_client()?;
    let result = client.execute(envelope).await;
    render_result(ctx, result)
}
