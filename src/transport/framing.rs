//! Length-prefixed frame transport over TCP.
//!
//! One frame = a 4-byte unsigned big-endian length prefix followed by
//! exactly that many bytes of UTF-8 payload. The framing layer is
//! trusted: a prefix outside `(0, 10 MiB]` abandons the connection,
//! no resync is attempted.

use std::io;
use std::time::Duration;

use socket2::SockRef;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::core::{TransportError, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};

/// Framed message transport over a single TCP socket.
///
/// Owns the socket for its lifetime; dropping the transport closes it
/// on every exit path.
#[derive(Debug)]
pub struct FramedTransport {
    stream: TcpStream,
    read_timeout: Duration,
}

impl FramedTransport {
    /// Connect to `address:port` and prepare the socket for streaming.
    ///
    /// The connect itself is bounded by `connect_timeout`; each later
    /// read phase is bounded by `read_timeout`. The socket is set up
    /// with `TCP_NODELAY` and keepalive for low-latency streaming over
    /// flaky wireless links.
    pub async fn connect(
        address: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let stream = timeout(connect_timeout, TcpStream::connect((address, port)))
            .await
            .map_err(|_| TransportError::ConnectTimeout)?
            .map_err(|e| match e.kind() {
                io::ErrorKind::ConnectionRefused => TransportError::ConnectRefused,
                _ => TransportError::Io(e),
            })?;

        stream.set_nodelay(true)?;
        SockRef::from(&stream).set_keepalive(true)?;

        Ok(Self {
            stream,
            read_timeout,
        })
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
        }
    }

    /// Read one complete frame and return its UTF-8 payload.
    ///
    /// Blocks until a frame arrives, the peer closes the stream
    /// ([`TransportError::ConnectionClosed`]), or the read timeout
    /// elapses ([`TransportError::ReadTimeout`]). A length prefix
    /// outside `(0, 10 MiB]` fails with
    /// [`TransportError::ProtocolViolation`] before any payload
    /// allocation. Expired reads are abandoned, never retried in
    /// place.
    pub async fn read_frame(&mut self) -> Result<String, TransportError> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.read_exact_timed(&mut prefix).await?;

        let length = u32::from_be_bytes(prefix);
        if length == 0 || length as usize > MAX_FRAME_SIZE {
            return Err(TransportError::ProtocolViolation { length });
        }

        let mut payload = vec![0u8; length as usize];
        self.read_exact_timed(&mut payload).await?;

        trace!(length, "frame received");
        Ok(String::from_utf8(payload)?)
    }

    /// Write one frame: length prefix, payload bytes, flush.
    pub async fn write_frame(&mut self, payload: &str) -> Result<(), TransportError> {
        let bytes = payload.as_bytes();
        let prefix = (bytes.len() as u32).to_be_bytes();

        self.stream.write_all(&prefix).await?;
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;

        trace!(length = bytes.len(), "frame sent");
        Ok(())
    }

    /// Best-effort graceful shutdown for the explicit-stop path.
    pub async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    async fn read_exact_timed(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        match timeout(self.read_timeout, self.stream.read_exact(buf)).await {
            Err(_) => Err(TransportError::ReadTimeout),
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(TransportError::ConnectionClosed)
            }
            Ok(Err(e)) => Err(TransportError::Io(e)),
            Ok(Ok(_)) => Ok(()),
        }
    }
}
