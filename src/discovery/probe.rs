//! Lightweight connectivity probe.
//!
//! A probe is not a connection: it opens a socket with a short timeout
//! and succeeds only if the peer starts sending a frame (the telemetry
//! source pushes its auth challenge immediately on accept). Nothing is
//! parsed and no authentication is attempted.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::core::LENGTH_PREFIX_SIZE;

/// Check whether a telemetry source is listening at `address:port`.
///
/// Succeeds only if the peer accepts the socket and at least a frame
/// prefix is readable within `probe_timeout`. All failures (refused,
/// unreachable, silent peer, timeout) report `false`; probes are
/// expected to fail for most of a sweep.
pub async fn probe(address: &str, port: u16, probe_timeout: Duration) -> bool {
    let mut stream = match timeout(probe_timeout, TcpStream::connect((address, port))).await {
        Ok(Ok(stream)) => stream,
        _ => return false,
    };

    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match timeout(probe_timeout, stream.read_exact(&mut prefix)).await {
        Ok(Ok(_)) => {
            trace!(address, port, "probe answered");
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    const TEST_PROBE_TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_probe_accepts_speaking_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // The source announces its challenge frame immediately.
            stream.write_all(&55u32.to_be_bytes()).await.unwrap();
            let _ = stream.flush().await;
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        assert!(probe("127.0.0.1", port, TEST_PROBE_TIMEOUT).await);
        server.abort();
    }

    #[tokio::test]
    async fn test_probe_rejects_silent_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        assert!(!probe("127.0.0.1", port, TEST_PROBE_TIMEOUT).await);
        server.abort();
    }

    #[tokio::test]
    async fn test_probe_rejects_refused_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!probe("127.0.0.1", port, TEST_PROBE_TIMEOUT).await);
    }
}
