//! Named wrappers for the keywords of the remote network library.
//!
//! Each method forwards a fixed keyword name and argument list to
//! [`RpcClient::run_keyword`] and returns the remote `return` value as-is.
//! Handles returned by `connect_to_device` are opaque strings owned by the
//! remote side.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::rpc::{RpcClient, RpcError};

/// VRF used when none is given.
pub const DEFAULT_VRF: &str = "default";

/// Echo count used by `ping_test` when none is given.
pub const DEFAULT_PING_COUNT: u32 = 5;

pub const CONNECT_TO_DEVICE: &str = "Connect To Device";
pub const EXECUTE_COMMAND: &str = "Execute Command";
pub const GET_OSPF_NEIGHBORS: &str = "Get OSPF Neighbors";
pub const GET_BGP_SUMMARY: &str = "Get BGP Summary";
pub const GET_INTERFACE_STATUS: &str = "Get Interface Status";
pub const PING_TEST: &str = "Ping Test";
pub const CLOSE_CONNECTION: &str = "Close Connection";

/// The remote network keyword library.
#[derive(Debug, Clone)]
pub struct NetworkLibrary {
    client: RpcClient,
}

impl NetworkLibrary {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(RpcClient::new(config))
    }

    pub fn with_client(client: RpcClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Open a device session; returns the connection handle.
    pub async fn connect_to_device(
        &self,
        hostname: &str,
        device_type: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, RpcError> {
        self.client
            .run_keyword(CONNECT_TO_DEVICE, [hostname, device_type, username, password])
            .await
    }

    /// Run a CLI command; returns its output.
    pub async fn execute_command(&self, handle: &str, command: &str) -> Result<Value, RpcError> {
        self.client
            .run_keyword(EXECUTE_COMMAND, [handle, command])
            .await
    }

    /// List of neighbor records.
    pub async fn get_ospf_neighbors(&self, handle: &str) -> Result<Value, RpcError> {
        self.client.run_keyword(GET_OSPF_NEIGHBORS, [handle]).await
    }

    /// Peer summary for `vrf` (defaults to [`DEFAULT_VRF`]).
    pub async fn get_bgp_summary(
        &self,
        handle: &str,
        vrf: Option<&str>,
    ) -> Result<Value, RpcError> {
        self.client
            .run_keyword(GET_BGP_SUMMARY, [handle, vrf.unwrap_or(DEFAULT_VRF)])
            .await
    }

    /// Admin/protocol state of one interface.
    pub async fn get_interface_status(
        &self,
        handle: &str,
        interface: &str,
    ) -> Result<Value, RpcError> {
        self.client
            .run_keyword(GET_INTERFACE_STATUS, [handle, interface])
            .await
    }

    /// Ping `target` from the device; returns sent/received counts.
    pub async fn ping_test(
        &self,
        handle: &str,
        target: &str,
        vrf: Option<&str>,
        count: Option<u32>,
    ) -> Result<Value, RpcError> {
        let vrf = vrf.unwrap_or(DEFAULT_VRF);
        let count = count.unwrap_or(DEFAULT_PING_COUNT);
        self.client
            .run_keyword(PING_TEST, (handle, target, vrf, count))
            .await
    }

    pub async fn close_connection(&self, handle: &str) -> Result<Value, RpcError> {
        self.client.run_keyword(CLOSE_CONNECTION, [handle]).await
    }

    /// Keywords the remote library advertises.
    pub async fn keyword_names(&self) -> Result<Vec<String>, RpcError> {
        self.client.get_keyword_names().await
    }
}
