use clap::Parser;
use marionette::Address;
use tracing::debug;

use crate::error::CliResult;
use crate::CommandContext;

#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Address of the actor to inspect
    #[arg(required = true)]
    pub address: String,
}

/// Fetch and display an actor's descriptor.
pub async fn execute_async(args: &InspectArgs, ctx: &CommandContext) -> CliResult<()> {
    debug!(address = %args.address, "inspecting actor");
    let client = ctx.create_client()?;
    let address = Address::from(args.address.as_str());
    let descriptor = client.fetch_descriptor(&address).await?;

    if ctx.output.is_json() {
        return ctx.output.json_value(&descriptor);
    }

    ctx.output
        .success(&format!("descriptor for {}", args.address));
    println!("  children: {}", descriptor.children.len());
    for child in &descriptor.children {
        println!("    {}", child);
    }
    println!("  channels: {}", descriptor.channels.len());
    for channel in &descriptor.channels {
        let name = channel.name.as_deref().unwrap_or("-");
        println!(
            "    {}  tags=[{}]  name={}",
            channel.id,
            channel.tags.join(", "),
            name
        );
    }
    println!(
        "  installed capabilities: {}",
        descriptor.installed_capabilities.len()
    );
    for capability in &descriptor.installed_capabilities {
        println!("    {}", capability.id);
    }
    Ok(())
}
