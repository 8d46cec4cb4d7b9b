use clap::Parser;
use marionette::{Address, HierarchyPath};
use serde_json::json;
use tracing::debug;

use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct FindArgs {
    /// Human-assigned name of the child actor
    #[arg(required = true)]
    pub name: String,

    /// Parent address to search under; resolved from the root when omitted
    #[arg(long)]
    pub parent: Option<String>,

    /// Tag selecting the returned channel on the matched child
    #[arg(long, default_value = "workspace")]
    pub domain_tag: String,
}

/// Resolve a named child actor's domain-tagged channel.
pub async fn execute_async(args: &FindArgs, ctx: &CommandContext) -> CliResult<()> {
    let client = ctx.create_client()?;
    let parent = match &args.parent {
        Some(parent) => Address::from(parent.as_str()),
        None => client.resolve(&HierarchyPath::default()).await?,
    };
    debug!(%parent, name = %args.name, "looking up child by name");

    let address = client
        .resolve_by_name(&parent, &args.name, &args.domain_tag)
        .await?;

    if ctx.output.is_json() {
        return ctx
            .output
            .json_value(&json!({ "name": args.name, "address": address }));
    }
    ctx.output
        .success(&format!("{} -> {}", args.name, address));
    Ok(())
}
