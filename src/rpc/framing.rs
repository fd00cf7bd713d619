//! Parse-driven message framing for the remote library protocol.
//!
//! Responses carry no length prefix and no guaranteed delimiter, so the end
//! of a message is found by attempting to parse the accumulated bytes after
//! every read. The first complete JSON document wins; anything after it is
//! ignored.
//!
//! # Wire Format
//!
//! ```text
//! client -> server:  {"method":"run_keyword","args":[...],"kwargs":{}}\n
//! server -> client:  {"status":"PASS","return":...}
//! ```
//!
//! A server that sends a complete-but-not-final prefix (for example a bare
//! number followed by more digits in a later packet) is framed at the first
//! successful parse.

use std::time::Duration;

use serde::de::IgnoredAny;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use super::error::{Phase, RpcError};

/// Size of each read from the socket.
const READ_CHUNK_SIZE: usize = 4096;

/// Longest slice of a partial payload quoted back in a protocol error.
const MAX_QUOTED_BYTES: usize = 256;

/// Outcome of one parse attempt over the accumulated bytes.
#[derive(Debug)]
enum FrameStatus {
    /// A full document occupies the first `n` bytes.
    Complete(usize),
    /// Not yet parseable; keep reading.
    Pending(Option<serde_json::Error>),
}

fn frame_status(buffer: &[u8]) -> FrameStatus {
    let mut stream = serde_json::Deserializer::from_slice(buffer).into_iter::<IgnoredAny>();
    match stream.next() {
        Some(Ok(_)) => FrameStatus::Complete(stream.byte_offset()),
        Some(Err(e)) => FrameStatus::Pending(Some(e)),
        None => FrameStatus::Pending(None),
    }
}

fn quote_partial(buffer: &[u8]) -> String {
    let end = buffer.len().min(MAX_QUOTED_BYTES);
    let mut quoted = String::from_utf8_lossy(&buffer[..end]).into_owned();
    if buffer.len() > MAX_QUOTED_BYTES {
        quoted.push_str("...");
    }
    quoted
}

/// Read from `reader` until the accumulated bytes hold one complete JSON
/// document, and return exactly that document's bytes.
///
/// Every individual read is bounded by `read_timeout`. Parse failures on a
/// partial buffer are not fatal: a token split across packets (such as
/// `100.` / `0`) only becomes valid once the rest arrives.
///
/// # Errors
///
/// - `RpcError::Timeout` if a read does not complete within `read_timeout`
/// - `RpcError::Protocol` if the peer closes before a complete document
///   arrived (the detail quotes the partial payload)
/// - `RpcError::ConnectionFailed` for any other I/O failure
pub async fn read_message<R>(
    reader: &mut R,
    read_timeout: Duration,
    address: &str,
) -> Result<Vec<u8>, RpcError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut last_error: Option<serde_json::Error> = None;

    loop {
        let bytes_read = match timeout(read_timeout, reader.read(&mut chunk)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(RpcError::from_io(e, address, Phase::Read)),
            Err(_) => return Err(RpcError::timeout(address, Phase::Read)),
        };

        // EOF - connection closed
        if bytes_read == 0 {
            let cause = match last_error {
                Some(e) => format!(" ({})", e),
                None => String::new(),
            };
            return Err(RpcError::protocol(
                address,
                format!(
                    "Connection closed after {} bytes without a complete response{}: {:?}",
                    buffer.len(),
                    cause,
                    quote_partial(&buffer)
                ),
            ));
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
        trace!("Read {} bytes from {} ({} total)", bytes_read, address, buffer.len());

        match frame_status(&buffer) {
            FrameStatus::Complete(len) => {
                if len < buffer.len() {
                    trace!("Ignoring {} trailing bytes from {}", buffer.len() - len, address);
                }
                buffer.truncate(len);
                return Ok(buffer);
            }
            FrameStatus::Pending(err) => last_error = err,
        }
    }
}

/// Write a complete request and flush it, bounded by `write_timeout`.
///
/// # Errors
///
/// Returns `RpcError::Timeout` if the write stalls, or
/// `RpcError::ConnectionFailed` if the peer is gone.
pub async fn write_message<W>(
    writer: &mut W,
    body: &[u8],
    write_timeout: Duration,
    address: &str,
) -> Result<(), RpcError>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        writer.write_all(body).await?;
        writer.flush().await?;
        Ok::<_, std::io::Error>(())
    };

    match timeout(write_timeout, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(RpcError::from_io(e, address, Phase::Write)),
        Err(_) => Err(RpcError::timeout(address, Phase::Write)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    /// Test timeout to prevent hanging tests.
    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    const ADDR: &str = "test:8270";

    #[tokio::test]
    async fn test_read_single_write() {
        let (mut client, mut server) = duplex(1024);
        let message = br#"{"status":"PASS","return":"h1"}"#;
        server.write_all(message).await.unwrap();

        let received = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .expect("Read failed");

        assert_eq!(received, message.to_vec());
    }

    #[tokio::test]
    async fn test_read_split_across_writes() {
        let (mut client, mut server) = duplex(1024);

        let writer = tokio::spawn(async move {
            let parts: [&[u8]; 3] = [
                b"{\"status\":\"PA",
                b"SS\",\"return\":{\"success_pct\":100.",
                b"0}}",
            ];
            for part in parts {
                server.write_all(part).await.unwrap();
                server.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            server
        });

        let received = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .expect("Read failed");
        let _server = writer.await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&received).unwrap();
        assert_eq!(value["return"]["success_pct"], 100.0);
    }

    #[tokio::test]
    async fn test_read_ignores_trailing_bytes() {
        let (mut client, mut server) = duplex(1024);
        server
            .write_all(b"{\"status\":\"PASS\"}\n{\"status\":\"FAIL\"}")
            .await
            .unwrap();

        let received = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .expect("Read failed");

        assert_eq!(received, b"{\"status\":\"PASS\"}".to_vec());
    }

    #[tokio::test]
    async fn test_read_skips_leading_whitespace_only_chunk() {
        let (mut client, mut server) = duplex(1024);

        let writer = tokio::spawn(async move {
            server.write_all(b"  \n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            server.write_all(b"[1,2]").await.unwrap();
            server
        });

        let received = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .expect("Read failed");
        let _server = writer.await.unwrap();

        let value: Vec<u32> = serde_json::from_slice(&received).unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_connection_closed_mid_message() {
        let (mut client, mut server) = duplex(1024);
        server.write_all(b"{\"status\":\"PA").await.unwrap();
        drop(server);

        let err = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .unwrap_err();

        match err {
            RpcError::Protocol { address, detail } => {
                assert_eq!(address, ADDR);
                assert!(detail.contains("Connection closed after 13 bytes"), "{}", detail);
                assert!(detail.contains("status"), "{}", detail);
            }
            other => panic!("Expected Protocol error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_then_close_is_protocol_error() {
        let (mut client, mut server) = duplex(1024);
        server.write_all(b"<html>not json</html>").await.unwrap();
        drop(server);

        let err = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::Protocol { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_empty_close_is_protocol_error() {
        let (mut client, server) = duplex(1024);
        drop(server);

        let err = read_message(&mut client, TEST_TIMEOUT, ADDR)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("after 0 bytes"), "{}", err);
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let (mut client, _server) = duplex(1024);

        let err = read_message(&mut client, Duration::from_millis(50), ADDR)
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                RpcError::Timeout {
                    phase: Phase::Read,
                    ..
                }
            ),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_write_message_delivers_bytes() {
        let (mut client, mut server) = duplex(1024);
        let body = b"{\"method\":\"get_keyword_names\",\"args\":[],\"kwargs\":{}}\n";

        write_message(&mut client, body, TEST_TIMEOUT, ADDR)
            .await
            .expect("Write failed");

        let mut received = vec![0u8; body.len()];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(received, body.to_vec());
    }

    #[tokio::test]
    async fn test_write_to_closed_peer_fails() {
        let (mut client, server) = duplex(16);
        drop(server);

        let err = write_message(&mut client, b"{}\n", TEST_TIMEOUT, ADDR)
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                RpcError::ConnectionFailed {
                    phase: Phase::Write,
                    ..
                }
            ),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_quote_partial_truncates() {
        let long = vec![b'a'; MAX_QUOTED_BYTES + 10];
        let quoted = quote_partial(&long);
        assert!(quoted.ends_with("..."));
        assert_eq!(quoted.len(), MAX_QUOTED_BYTES + 3);
    }
}
