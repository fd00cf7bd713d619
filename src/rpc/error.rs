//! Failure taxonomy for a single remote call.
//!
//! Every way a call can go wrong ends up as exactly one [`RpcError`]. The
//! classification helpers here are the only place that decides which
//! variant a low-level failure becomes.

use std::fmt;
use std::io;

use thiserror::Error;

/// Placeholder used when the remote side fails without an `error` field.
pub const UNKNOWN_REMOTE_ERROR: &str = "Unknown error";

/// Step of the exchange a transport failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Connect => "connect",
            Phase::Write => "write",
            Phase::Read => "read",
        })
    }
}

/// Error returned by every remote call.
///
/// The variants separate "the remote library rejected the call"
/// (`Remote`) from "could not reach or talk to the remote library"
/// (everything else).
#[derive(Debug, Error)]
pub enum RpcError {
    /// An operation did not complete within the configured timeout.
    #[error("Timeout during {phase} with {address}")]
    Timeout {
        /// Target `host:port`
        address: String,
        /// Operation that timed out
        phase: Phase,
    },

    /// The connection could not be established or broke mid-exchange.
    #[error("Connection error with {address} during {phase}: {source}")]
    ConnectionFailed {
        /// Target `host:port`
        address: String,
        /// Operation that failed
        phase: Phase,
        #[source]
        source: io::Error,
    },

    /// The bytes exchanged do not form a valid envelope.
    #[error("Protocol error with {address}: {detail}")]
    Protocol {
        /// Target `host:port`
        address: String,
        /// Parse cause or raw payload description
        detail: String,
    },

    /// The remote library answered with a non-PASS status.
    #[error("Remote library error from {address}: {error}")]
    Remote {
        /// Target `host:port`
        address: String,
        /// Error string reported by the remote side
        error: String,
        /// Remote traceback, when the server sends one
        traceback: Option<String>,
    },
}

impl RpcError {
    /// Whether the call was cut short by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout { .. })
    }

    /// Whether the remote library itself rejected the call.
    pub fn is_remote(&self) -> bool {
        matches!(self, RpcError::Remote { .. })
    }

    /// Whether the call failed before a usable answer was received.
    pub fn is_transport(&self) -> bool {
        !self.is_remote()
    }

    /// The `host:port` the failing call was aimed at.
    pub fn address(&self) -> &str {
        match self {
            RpcError::Timeout { address, .. }
            | RpcError::ConnectionFailed { address, .. }
            | RpcError::Protocol { address, .. }
            | RpcError::Remote { address, .. } => address,
        }
    }

    pub(crate) fn timeout(address: &str, phase: Phase) -> Self {
        RpcError::Timeout {
            address: address.to_string(),
            phase,
        }
    }

    pub(crate) fn protocol(address: &str, detail: impl Into<String>) -> Self {
        RpcError::Protocol {
            address: address.to_string(),
            detail: detail.into(),
        }
    }

    /// Map an I/O failure onto the taxonomy.
    ///
    /// OS-level timeouts count as `Timeout`; refused, reset, unreachable and
    /// name resolution failures are `ConnectionFailed`.
    pub(crate) fn from_io(err: io::Error, address: &str, phase: Phase) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                RpcError::timeout(address, phase)
            }
            _ => RpcError::ConnectionFailed {
                address: address.to_string(),
                phase,
                source: err,
            },
        }
    }
}
