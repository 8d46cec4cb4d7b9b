use clap::Parser;
use marionette::{OperationEnvelope, OperationResult};
use tracing::debug;

use crate::commands::parse_args;
use crate::error::{CliError, CliResult};
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Target channel address
    #[arg(required = true)]
    pub address: String,

    /// Capability id exposing the operation
    #[arg(required = true)]
    pub capability: String,

    /// Operation name
    #[arg(required = true)]
    pub operation: String,

    /// Operation arguments as a JSON object
    #[arg(long)]
    pub args: Option<String>,

    /// Correlation id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,
}

/// Execute a query operation through the uniform envelope.
pub async fn execute_async(args: &QueryArgs, ctx: &CommandContext) -> CliResult<()> {
    let arguments = parse_args(args.args.as_deref())?;
    let mut envelope = OperationEnvelope::query(
        args.address.as_str(),
        args.capability.as_str(),
        args.operation.as_str(),
    )
    .with_arguments(arguments);
    if let Some(id) = &args.id {
        envelope = envelope.with_correlation_id(id.clone());
    }

    debug!(address = %args.address, capability = %args.capability, operation = %args.operation, "executing query");
    let client = ctx.create_client()?;
    let result = client.execute(envelope).await;
    render_result(ctx, result)
}

/// Surface an operation result: JSON verbatim, or a summary line plus the
/// payload. A failed result carries its code/message into the exit error.
pub(crate) fn render_result(ctx: &CommandContext, result: OperationResult) -> CliResult<()> {
    if ctx.output.is_json() {
        ctx.output.json_value(&result)?;
        if result.success {
            return Ok(());
        }
    }

    if !result.success {
        return Err(CliError::OperationFailed {
            code: result
                .error_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            message: result
                .error_message
                .unwrap_or_else(|| "no error message".to_string()),
        });
    }

    if let Some(embedded) = result.embedded_error() {
        ctx.output
            .warning(&format!("payload embeds an error: {}", embedded));
    }
    ctx.output
        .success(&format!("ok ({})", result.correlation_id));
    if let Some(data) = &result.data {
        ctx.output.json_value(data)?;
    }
    Ok(())
}
