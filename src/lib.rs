//! Network Library RPC client
//!
//! This library talks to an out-of-process network automation keyword
//! library (device connect, command execution, OSPF/BGP/interface queries,
//! ping) over a small JSON-over-TCP protocol:
//!
//! - `config` - Target host, port and per-operation timeout
//! - `rpc` - Transport: envelopes, framing, sessions, errors
//! - `library` - One method per remote keyword
//!
//! # Example
//!
//! ```ignore
//! use netlib_rpc::{ClientConfig, NetworkLibrary};
//!
//! let lib = NetworkLibrary::new(ClientConfig::from_env()?);
//! let handle = lib.connect_to_device("172.10.1.1", "ASR9906", "admin", "admin").await?;
//! let ping = lib.ping_test(handle.as_str().unwrap_or_default(), "8.8.8.8", None, None).await?;
//! ```

pub mod config;
pub mod library;
pub mod rpc;

pub use config::{ClientConfig, ConfigError};
pub use library::NetworkLibrary;
pub use rpc::{RpcClient, RpcError};
