//! One TCP connection carrying exactly one request/response exchange.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::error::{Phase, RpcError};
use super::framing::{read_message, write_message};
use crate::config::ClientConfig;

/// A connected, single-use session.
///
/// [`exchange`](Self::exchange) consumes the session, so a stream can never
/// carry a second request. The socket is shut down and dropped on every
/// path out of `exchange`; dropping an unused session also closes it.
pub struct Session {
    stream: TcpStream,
    address: String,
    timeout: Duration,
}

impl Session {
    /// Open a connection to the configured target.
    ///
    /// # Errors
    ///
    /// - `RpcError::Timeout` if the connect does not finish within the timeout
    /// - `RpcError::ConnectionFailed` if it is refused, unreachable, or the
    ///   host name does not resolve
    pub async fn connect(config: &ClientConfig) -> Result<Self, RpcError> {
        let address = config.address();
        let connect = TcpStream::connect((config.host.as_str(), config.port));

        let stream = match timeout(config.timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(RpcError::from_io(e, &address, Phase::Connect)),
            Err(_) => return Err(RpcError::timeout(&address, Phase::Connect)),
        };

        // Requests are written in one go; don't let Nagle hold the tail back.
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY for {}: {}", address, e);
        }

        debug!("Connected to {}", address);

        Ok(Self {
            stream,
            address,
            timeout: config.timeout,
        })
    }

    /// Connect, send `request`, and return the framed response bytes.
    pub async fn execute(config: &ClientConfig, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        Self::connect(config).await?.exchange(request).await
    }

    /// Target `host:port` of this session.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send `request` and read one framed response, then close the socket.
    ///
    /// The close happens regardless of the outcome and never replaces the
    /// exchange's own error.
    pub async fn exchange(mut self, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        let result = self.send_receive(request).await;
        self.close().await;
        result
    }

    async fn send_receive(&mut self, request: &[u8]) -> Result<Vec<u8>, RpcError> {
        write_message(&mut self.stream, request, self.timeout, &self.address).await?;
        debug!("Sent {} bytes to {}", request.len(), self.address());

        let response = read_message(&mut self.stream, self.timeout, &self.address).await?;
        debug!("Framed {} byte response from {}", response.len(), self.address());

        Ok(response)
    }

    /// Best-effort shutdown. The stream itself is released when `self` drops
    /// at the end of this function.
    async fn close(mut self) {
        match timeout(self.timeout, self.stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!("Ignoring socket shutdown error for {}: {}", self.address(), e);
            }
            Err(_) => {
                debug!("Socket shutdown timed out for {}; dropping stream", self.address());
            }
        }
    }
}
