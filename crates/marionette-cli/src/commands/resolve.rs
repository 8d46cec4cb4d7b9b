use clap::Parser;
use marionette::HierarchyPath;
use serde_json::json;
use tracing::debug;

use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Name of the owner actor among the root's children
    #[arg(long)]
    pub owner_name: Option<String>,

    /// Tag selecting the workspace channel on the nested actor
    #[arg(long)]
    pub domain_tag: Option<String>,
}

/// Walk the fixed chain from the well-known root to the workspace channel.
pub async fn execute_async(args: &ResolveArgs, ctx: &CommandContext) -> CliResult<()> {
    let mut path = HierarchyPath::default();
    if let Some(owner_name) = &args.owner_name {
        path.owner_name = owner_name.clone();
    }
    if let Some(domain_tag) = &args.domain_tag {
        path.domain_tag = domain_tag.clone();
    }
    debug!(owner = %path.owner_name, tag = %path.domain_tag, "resolving workspace channel");

    let client = ctx.create_client()?;
    let address = client.resolve(&path).await?;

    if ctx.output.is_json() {
        return ctx.output.json_value(&json!({ "address": address }));
    }
    ctx.output
        .success(&format!("workspace channel: {}", address));
    Ok(())
}
