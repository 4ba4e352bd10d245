//! Claude CLI output parsing
//!
//! Turns an [`InvocationResult`] into the text shown to the user, pulling the
//! session id out of the `--output-format json` record when there is one.
//! Malformed output is never an error: it is passed through as raw text.

use serde::Deserialize;
use serde_json::Value;

use crate::invoker::InvocationResult;

/// Shown when the CLI produced nothing useful
pub const EMPTY_RESPONSE: &str = "(empty response)";

/// Text for the user plus the session id to carry forward, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub text: String,
    pub session_id: Option<String>,
}

impl ParsedResponse {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
        }
    }
}

/// The fields we read from the CLI's JSON record
#[derive(Debug, Deserialize)]
struct ClaudeJsonOutput {
    #[serde(default)]
    session_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    is_error: Option<Value>,
}

/// Keeps `"result": null` distinguishable from a missing field
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Outcome of decoding the captured output
#[derive(Debug)]
enum Decoded {
    Record(ClaudeJsonOutput),
    Raw,
}

fn decode(output: &str) -> Decoded {
    let value = match serde_json::from_str::<Value>(output) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            tracing::warn!("CLI output is JSON but not an object, returning raw output");
            return Decoded::Raw;
        }
        Err(e) => {
            tracing::warn!("Failed to parse JSON response, returning raw output: {}", e);
            return Decoded::Raw;
        }
    };

    match serde_json::from_value::<ClaudeJsonOutput>(value) {
        Ok(record) => Decoded::Record(record),
        Err(e) => {
            tracing::warn!("Unexpected JSON response shape, returning raw output: {}", e);
            Decoded::Raw
        }
    }
}

/// Render a JSON scalar the way it should appear as text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Interpret a finished invocation
pub fn parse(result: &InvocationResult, timeout_secs: u64) -> ParsedResponse {
    if result.timed_out {
        return ParsedResponse::text_only(format!("Command timed out after {}s", timeout_secs));
    }

    let output = result.raw_output.trim();

    if result.exit_code != 0 && output.is_empty() {
        return ParsedResponse::text_only(format!("Process exited with code {}", result.exit_code));
    }

    if output.is_empty() {
        return ParsedResponse::text_only(EMPTY_RESPONSE);
    }

    parse_output(output)
}

/// Interpret non-empty captured output
pub fn parse_output(output: &str) -> ParsedResponse {
    let record = match decode(output) {
        Decoded::Record(record) => record,
        Decoded::Raw => return ParsedResponse::text_only(output),
    };

    let session_id = record
        .session_id
        .as_ref()
        .filter(|v| !v.is_null())
        .map(value_text)
        .filter(|id| !id.is_empty());

    if record.is_error == Some(Value::Bool(true)) {
        tracing::warn!("Claude CLI reported an error result");
    }

    let text = match record.result {
        Some(ref value) => {
            let text = value_text(value);
            if text.is_empty() {
                EMPTY_RESPONSE.to_string()
            } else {
                text
            }
        }
        None => output.to_string(),
    };

    ParsedResponse { text, session_id }
}
