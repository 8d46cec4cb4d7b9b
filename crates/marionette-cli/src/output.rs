use crate::config::OutputConfig;
use crate::error::CliResult;
use console::style;
use serde::Serialize;

/// Output handler for the CLI: plain styled lines by default, raw JSON
/// when `--json` is set.
#[derive(Debug, Clone)]
pub struct OutputManager {
    colors: bool,
    json: bool,
}

impl OutputManager {
    pub fn new(config: &OutputConfig, json: bool) -> Self {
        Self {
            colors: config.colors && console::colors_enabled(),
            json,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if self.colors {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("ok: {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colors {
            println!("{} {}", style("!").yellow(), message);
        } else {
            println!("warning: {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colors {
            eprintln!("{} {}", style("✗").red(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }

    /// Print a serializable value as pretty JSON.
    pub fn json_value<T: Serialize>(&self, value: &T) -> CliResult<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
