//! Challenge/response authentication handshake.
//!
//! Runs once per session, directly after socket connect and before the
//! receive loop. The server speaks first:
//!
//! ```text
//! server -> {"type":"auth_required","challenge":"...","timestamp":...}
//! client -> {"token":"<auth_token>_<challenge>","timestamp":<unix secs>}
//! server -> {"type":"auth_success"}
//! ```
//!
//! There is no handshake-level retry: any failure is a connection
//! failure for the owning session.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::framing::FramedTransport;
use crate::core::{AuthError, MSG_TYPE_AUTH_REQUIRED, MSG_TYPE_AUTH_SUCCESS};

/// Server-issued challenge, consumed once per connection attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthChallenge {
    /// Message type; must be `auth_required`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque challenge string echoed back inside the response token.
    pub challenge: String,
    /// Server wall clock, Unix seconds.
    pub timestamp: i64,
}

/// Client answer to a challenge.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// `<auth_token>_<challenge>`.
    pub token: String,
    /// Client wall clock, Unix seconds.
    pub timestamp: i64,
}

/// Server verdict after the response. Extra fields (server version,
/// capability flags) are tolerated and ignored.
#[derive(Debug, Clone, Deserialize)]
struct AuthVerdict {
    #[serde(rename = "type")]
    kind: String,
}

/// Run the handshake on a freshly connected transport.
pub async fn authenticate(
    transport: &mut FramedTransport,
    auth_token: &str,
) -> Result<(), AuthError> {
    let opening = transport.read_frame().await?;
    let challenge: AuthChallenge = serde_json::from_str(&opening)
        .map_err(|e| AuthError::Protocol(format!("malformed challenge: {e}")))?;
    if challenge.kind != MSG_TYPE_AUTH_REQUIRED {
        return Err(AuthError::Protocol(format!(
            "expected {MSG_TYPE_AUTH_REQUIRED}, got {}",
            challenge.kind
        )));
    }

    let response = AuthResponse {
        token: format!("{auth_token}_{}", challenge.challenge),
        timestamp: unix_time_secs(),
    };
    let encoded = serde_json::to_string(&response)
        .map_err(|e| AuthError::Protocol(format!("encoding response: {e}")))?;
    transport.write_frame(&encoded).await?;

    let closing = transport.read_frame().await?;
    let verdict: AuthVerdict = serde_json::from_str(&closing)
        .map_err(|e| AuthError::Failed(format!("malformed verdict: {e}")))?;
    if verdict.kind != MSG_TYPE_AUTH_SUCCESS {
        return Err(AuthError::Failed(format!(
            "server answered {}",
            verdict.kind
        )));
    }

    debug!("handshake complete");
    Ok(())
}

/// Current wall-clock time in whole Unix seconds.
fn unix_time_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::core::TransportError;

    const TEST_READ_TIMEOUT: Duration = Duration::from_millis(500);

    async fn handshake_pair() -> (FramedTransport, FramedTransport) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();

        (
            FramedTransport::from_stream(client, TEST_READ_TIMEOUT),
            FramedTransport::from_stream(server, TEST_READ_TIMEOUT),
        )
    }

    #[tokio::test]
    async fn test_handshake_success() {
        let (mut client, mut server) = handshake_pair().await;

        let server_task = tokio::spawn(async move {
            server
                .write_frame(r#"{"type":"auth_required","challenge":"abc","timestamp":1000}"#)
                .await
                .unwrap();

            let answer = server.read_frame().await.unwrap();
            let response: serde_json::Value = serde_json::from_str(&answer).unwrap();
            assert_eq!(response["token"], "carrotview2024_abc");
            assert!(response["timestamp"].as_i64().unwrap() > 0);

            server
                .write_frame(r#"{"type":"auth_success","server_version":"1.0"}"#)
                .await
                .unwrap();
        });

        authenticate(&mut client, "carrotview2024").await.unwrap();
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_wrong_opening_is_protocol_error() {
        let (mut client, mut server) = handshake_pair().await;

        server
            .write_frame(r#"{"type":"hello","challenge":"abc","timestamp":1}"#)
            .await
            .unwrap();

        let err = authenticate(&mut client, "carrotview2024")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_handshake_missing_challenge_field_is_protocol_error() {
        let (mut client, mut server) = handshake_pair().await;

        server
            .write_frame(r#"{"type":"auth_required","timestamp":1}"#)
            .await
            .unwrap();

        let err = authenticate(&mut client, "carrotview2024")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_handshake_rejection_is_failed() {
        let (mut client, mut server) = handshake_pair().await;

        let server_task = tokio::spawn(async move {
            server
                .write_frame(r#"{"type":"auth_required","challenge":"abc","timestamp":1000}"#)
                .await
                .unwrap();
            let _ = server.read_frame().await.unwrap();
            server
                .write_frame(r#"{"type":"auth_rejected"}"#)
                .await
                .unwrap();
        });

        let err = authenticate(&mut client, "wrong-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Failed(_)));
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_silent_server_is_transport_error() {
        let (mut client, _server) = handshake_pair().await;

        let err = authenticate(&mut client, "carrotview2024")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Transport(TransportError::ReadTimeout)
        ));
    }
}
