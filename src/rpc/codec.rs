//! Request and response envelopes of the remote library protocol.
//!
//! Requests are `{"method", "args", "kwargs"}` objects terminated by a
//! newline. Responses are `{"status", "return"}` on success or
//! `{"status", "error"}` on failure, optionally with `output` and
//! `traceback`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{RpcError, UNKNOWN_REMOTE_ERROR};

/// Dispatch method that runs a named keyword.
pub const RUN_KEYWORD: &str = "run_keyword";

/// Method listing the keywords the remote library offers.
pub const GET_KEYWORD_NAMES: &str = "get_keyword_names";

/// Status value signalling success.
pub const STATUS_PASS: &str = "PASS";

/// Outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            args,
            kwargs,
        }
    }

    /// Build the `run_keyword` request for `keyword` with positional `args`.
    ///
    /// The wire shape is `args = [keyword, [arg, ...]]`, `kwargs = {}`.
    pub fn run_keyword(keyword: &str, args: Vec<Value>) -> Self {
        Self::new(
            RUN_KEYWORD,
            vec![Value::String(keyword.to_string()), Value::Array(args)],
            Map::new(),
        )
    }

    /// Serialize to UTF-8 JSON followed by a single `\n`.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Inbound response.
///
/// A missing `status` deserializes to an empty string and is therefore a
/// failure, like any other non-PASS value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "return", default)]
    pub return_value: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub traceback: Option<String>,
}

impl ResponseEnvelope {
    /// Parse one framed response document.
    ///
    /// Only a JSON object is an envelope; serde would otherwise accept a
    /// positional array for this struct.
    pub fn decode(bytes: &[u8], address: &str) -> Result<Self, RpcError> {
        let invalid = |cause: String| {
            RpcError::protocol(
                address,
                format!(
                    "Failed to parse response ({}): {:?}",
                    cause,
                    String::from_utf8_lossy(bytes)
                ),
            )
        };

        let value: Value = serde_json::from_slice(bytes).map_err(|e| invalid(e.to_string()))?;
        if !value.is_object() {
            return Err(invalid("response is not a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }

    pub fn is_pass(&self) -> bool {
        self.status == STATUS_PASS
    }

    /// The `return` value on PASS, otherwise `RpcError::Remote`.
    pub fn into_result(self, address: &str) -> Result<Value, RpcError> {
        if self.is_pass() {
            return Ok(self.return_value);
        }

        Err(RpcError::Remote {
            address: address.to_string(),
            error: self
                .error
                .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string()),
            traceback: self.traceback,
        })
    }
}
