//! `RpcClient`: encode a call, run it over a fresh session, decode the answer.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::codec::{RequestEnvelope, ResponseEnvelope, GET_KEYWORD_NAMES, RUN_KEYWORD};
use super::error::RpcError;
use super::session::Session;
use crate::config::ClientConfig;

/// Client for the remote keyword library.
///
/// The client holds only its configuration. Every call opens its own TCP
/// connection, so one client (or any number of clones) can be used from
/// many tasks at once without coordination.
///
/// # Example
///
/// ```ignore
/// use netlib_rpc::{ClientConfig, RpcClient};
/// use serde_json::json;
///
/// let client = RpcClient::new(ClientConfig::default());
/// let handle = client
///     .run_keyword("Connect To Device", ("172.10.1.1", "ASR9906", "admin", "admin"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RpcClient {
    config: ClientConfig,
}

impl RpcClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request with an explicit method, args and kwargs.
    ///
    /// # Errors
    ///
    /// Any [`RpcError`]; the first failure encountered is returned and the
    /// call is never retried.
    pub async fn call(
        &self,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        self.send(RequestEnvelope::new(method, args, kwargs)).await
    }

    /// Run `keyword` on the remote library with positional `args`.
    ///
    /// `args` may be anything that serializes to a JSON array (a `Vec`,
    /// slice, or tuple); any other value is sent as a single argument.
    pub async fn run_keyword<A>(&self, keyword: &str, args: A) -> Result<Value, RpcError>
    where
        A: Serialize,
    {
        let args = match serde_json::to_value(args) {
            Ok(Value::Array(items)) => items,
            Ok(single) => vec![single],
            Err(e) => {
                return Err(RpcError::protocol(
                    &self.config.address(),
                    format!("Failed to serialize arguments for {:?}: {}", keyword, e),
                ))
            }
        };

        self.send(RequestEnvelope::run_keyword(keyword, args)).await
    }

    /// Names of the keywords the remote library offers.
    pub async fn get_keyword_names(&self) -> Result<Vec<String>, RpcError> {
        let value = self.call(GET_KEYWORD_NAMES, Vec::new(), Map::new()).await?;
        serde_json::from_value(value).map_err(|e| {
            RpcError::protocol(
                &self.config.address(),
                format!("Keyword names are not a list of strings: {}", e),
            )
        })
    }

    async fn send(&self, request: RequestEnvelope) -> Result<Value, RpcError> {
        let address = self.config.address();
        let bytes = request.encode().map_err(|e| {
            RpcError::protocol(&address, format!("Failed to serialize request: {}", e))
        })?;

        if request.method == RUN_KEYWORD {
            debug!("run_keyword {:?} on {}", request.args.first(), address);
        } else {
            debug!("Calling {} on {}", request.method, address);
        }

        let raw = Session::execute(&self.config, &bytes).await?;
        let response = ResponseEnvelope::decode(&raw, &address)?;

        if let Some(output) = response.output.as_deref() {
            debug!("Remote output from {}: {}", address, output);
        }

        response.into_result(&address).inspect_err(|e| {
            if e.is_remote() {
                warn!("{} failed: {}", request.method, e);
            }
        })
    }
}
