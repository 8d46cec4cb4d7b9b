pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use clap::{Parser, Subcommand};
use marionette::EngineClient;
use tokio_util::sync::CancellationToken;

/// Marionette CLI - discover and operate actors of a hierarchical runtime
/// reachable over HTTP.
#[derive(Debug, Parser)]
#[command(name = "marionette")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Engine base URL (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Display output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch and display an actor's descriptor
    #[command(name = "inspect")]
    Inspect(commands::inspect::InspectArgs),

    /// Resolve the workspace channel by walking the hierarchy from the root
    #[command(name = "resolve")]
    Resolve(commands::resolve::ResolveArgs),

    /// Resolve a named child actor's domain channel
    #[command(name = "find")]
    Find(commands::find::FindArgs),

    /// Execute a query operation through the uniform envelope
    #[command(name = "query")]
    Query(commands::query::QueryArgs),

    /// Raise an event through the uniform envelope
    #[command(name = "event")]
    Event(commands::event::EventArgs),

    /// Install a capability on an actor (idempotent)
    #[command(name = "install")]
    Install(commands::install::InstallArgs),

    /// Run the bootstrap sequence and wait for completion
    #[command(name = "bootstrap")]
    Bootstrap(commands::bootstrap::BootstrapArgs),
}

/// Shared resources handed to every command.
pub struct CommandContext {
    pub config: config::Config,
    pub output: output::OutputManager,
    pub shutdown_token: CancellationToken,
    base_url_override: Option<String>,
}

impl CommandContext {
    /// Build a client for the configured engine instance.
    pub fn create_client(&self) -> error::CliResult<EngineClient> {
        let base_url = self
            .base_url_override
            .as_deref()
            .unwrap_or(&self.config.engine.base_url);
        let transport = marionette::HttpTransport::with_timeout(base_url, self.config.timeout())?;
        Ok(EngineClient::with_transport(transport))
    }
}

/// Run the marionette CLI with cancellation support.
pub async fn run(
    cli: Cli,
    config: config::Config,
    shutdown_token: CancellationToken,
) -> anyhow::Result<()> {
    let output = output::OutputManager::new(&config.output, cli.json);
    let ctx = CommandContext {
        config,
        output,
        shutdown_token,
        base_url_override: cli.base_url.clone(),
    };

    let result = match &cli.command {
        Commands::Inspect(args) => commands::inspect::execute_async(args, &ctx).await,
        Commands::Resolve(args) => commands::resolve::execute_async(args, &ctx).await,
        Commands::Find(args) => commands::find::execute_async(args, &ctx).await,
        Commands::Query(args) => commands::query::execute_async(args, &ctx).await,
        Commands::Event(args) => commands::event::execute_async(args, &ctx).await,
        Commands::Install(args) => commands::install::execute_async(args, &ctx).await,
        Commands::Bootstrap(args) => commands::bootstrap::execute_async(args, &ctx).await,
    };

    if let Err(e) = &result {
        if needs_error_line(e, ctx.output.is_json()) {
            ctx.output.error(&e.to_string());
        }
    }
    result.map_err(anyhow::Error::from)
}

/// Whether a command failure still needs a stderr line. In JSON mode a
/// failed operation result has already been printed verbatim to stdout;
/// a second line would report the same failure twice.
fn needs_error_line(error: &error::CliError, json: bool) -> bool {
    !(json && matches!(error, error::CliError::OperationFailed { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn operation_failures_in_json_mode_skip_the_stderr_line() {
        let failed = CliError::OperationFailed {
            code: "HTTP_ERROR".to_string(),
            message: "upstream returned HTTP 503".to_string(),
        };
        assert!(!needs_error_line(&failed, true));
        assert!(needs_error_line(&failed, false));

        // Failures that never produced JSON output keep their line.
        let config = CliError::config("unreadable file");
        assert!(needs_error_line(&config, true));
    }
}
