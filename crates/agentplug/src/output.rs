//! Rendering of item results for the terminal.
//!
//! Text lines follow the agent's test-mode layout:
//!
//! ```text
//! vfs.file.exists[/etc/passwd]                  [u|1]
//! vfs.file.exists                               [m|ZBX_NOTSUPPORTED] [invalid argument: missing first parameter]
//! ```

use agentplug_core::AgentError;
use agentplug_core::plugin::ItemValue;
use serde::Serialize;

/// Width of the item column in text output.
const ITEM_COLUMN_WIDTH: usize = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    item: &'a str,
    #[serde(rename = "type")]
    value_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a ItemValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    clock: i64,
}

fn type_code(value: &ItemValue) -> &'static str {
    match value {
        ItemValue::Uint(_) => "u",
        ItemValue::Float(_) => "d",
        ItemValue::Text(_) => "t",
    }
}

/// Renders one evaluated item as a single output line.
pub fn render(
    item: &str,
    result: &Result<ItemValue, AgentError>,
    format: OutputFormat,
    clock: i64,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(match result {
            Ok(value) => format!(
                "{:<width$} [{}|{}]",
                item,
                type_code(value),
                value,
                width = ITEM_COLUMN_WIDTH
            ),
            Err(e) => format!(
                "{:<width$} [m|ZBX_NOTSUPPORTED] [{}]",
                item,
                e,
                width = ITEM_COLUMN_WIDTH
            ),
        }),
        OutputFormat::Json => {
            let report = match result {
                Ok(value) => JsonReport {
                    item,
                    value_type: type_code(value),
                    value: Some(value),
                    error: None,
                    clock,
                },
                Err(e) => JsonReport {
                    item,
                    value_type: "m",
                    value: None,
                    error: Some(e.to_string()),
                    clock,
                },
            };
            serde_json::to_string(&report)
        }
    }
}
