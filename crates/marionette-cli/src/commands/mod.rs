pub mod bootstrap;
pub mod event;
pub mod find;
pub mod inspect;
pub mod install;
pub mod query;
pub mod resolve;

use crate::error::{CliError, CliResult};
use serde_json::{Map, Value};

/// Parse a `--args` JSON string into an argument map.
pub(crate) fn parse_args(raw: Option<&str>) -> CliResult<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).map_err(|e| {
                CliError::invalid_input("args", raw, format!("not valid JSON: {}", e))
            })?;
            value.as_object().cloned().ok_or_else(|| {
                CliError::invalid_input("args", raw, "must be a JSON object".to_string())
            })
        }
    }
}
