//! Client transport for the remote keyword library.
//!
//! Every call is an independent exchange over its own TCP connection:
//!
//! ```text
//! ┌─────────────────┐        one TCP connection        ┌─────────────────────┐
//! │  NetworkLibrary │  ─── request JSON + "\n" ──────► │  remote keyword     │
//! │   (RpcClient)   │  ◄── response JSON (no framing)  │  library server     │
//! └─────────────────┘                                  └─────────────────────┘
//! ```
//!
//! # Protocol
//!
//! ```text
//! {"method":"run_keyword","args":["Ping Test",["h1","8.8.8.8","default",5]],"kwargs":{}}\n
//! {"status":"PASS","return":{"sent":5,"received":5}}
//! ```
//!
//! The response has no length prefix; see [`read_message`] for how its end
//! is detected.
//!
//! # Usage
//!
//! ```ignore
//! use netlib_rpc::rpc::RpcClient;
//! use netlib_rpc::ClientConfig;
//!
//! let client = RpcClient::new(ClientConfig::from_env()?);
//! let names = client.get_keyword_names().await?;
//! ```

mod client;
mod codec;
mod error;
mod framing;
mod session;

pub use client::RpcClient;
pub use codec::{RequestEnvelope, ResponseEnvelope, GET_KEYWORD_NAMES, RUN_KEYWORD, STATUS_PASS};
pub use error::{Phase, RpcError, UNKNOWN_REMOTE_ERROR};
pub use framing::{read_message, write_message};
pub use session::Session;
