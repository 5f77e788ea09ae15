// File: probe.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use log::trace;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout_at;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ServerName};
use tokio_rustls::TlsConnector;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raw bytes read back from one probe, plus the wall-clock time from just
/// before connecting to the moment the read terminated.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub raw: String,
    pub elapsed: Duration,
}

/// One-shot raw transport. Every call opens a fresh connection so timing
/// measurements are never contaminated by socket reuse, and a single
/// deadline covers connect, write and read.
#[derive(Debug, Clone)]
pub struct RawSender {
    timeout: Duration,
}

/// The target's certificate validity is irrelevant to a protocol-level
/// desync test, so the TLS handshake accepts anything.
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

fn insecure_connector() -> TlsConnector {
    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

impl RawSender {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Sends `payload` verbatim and reads until the peer closes or the
    /// deadline fires. Exactly one attempt, no retries.
    ///
    /// A deadline that expires mid-read is not an error: the (possibly
    /// empty) partial response is returned, because a back-end that hangs
    /// waiting for more body bytes is itself the signal being probed for.
    /// Dial failures, handshake failures and resets surface as errors.
    pub async fn send(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
        payload: &[u8],
    ) -> Result<ProbeResponse, BoxError> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;

        let stream = match timeout_at(deadline, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(format!("connect to {}:{} failed: {}", host, port, e).into()),
            Err(_) => return Err(format!("connect to {}:{} timed out", host, port).into()),
        };

        let raw = if use_tls {
            let domain = ServerName::try_from(host)?;
            let mut tls_stream =
                match timeout_at(deadline, insecure_connector().connect(domain, stream)).await {
                    Ok(Ok(tls_stream)) => tls_stream,
                    Ok(Err(e)) => return Err(format!("tls handshake failed: {}", e).into()),
                    Err(_) => return Err("tls handshake timed out".into()),
                };
            exchange(&mut tls_stream, payload, deadline).await?
        } else {
            let mut stream = stream;
            exchange(&mut stream, payload, deadline).await?
        };

        let elapsed = start.elapsed();
        trace!(
            "probe to {}:{} returned {} bytes in {:?}",
            host,
            port,
            raw.len(),
            elapsed
        );

        Ok(ProbeResponse { raw, elapsed })
    }
}

async fn exchange<S>(
    stream: &mut S,
    payload: &[u8],
    deadline: tokio::time::Instant,
) -> Result<String, BoxError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout_at(deadline, stream.write_all(payload)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(format!("write failed: {}", e).into()),
        Err(_) => return Err("write timed out".into()),
    }

    let mut response = Vec::new();
    loop {
        let mut chunk = [0u8; 4096];
        match timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return Err(format!("read failed: {}", e).into()),
            // Deadline while the peer stalls: keep what arrived.
            Err(_) => break,
        }
    }

    Ok(String::from_utf8_lossy(&response).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_send_reads_full_response_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await.unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\n\r\nhello")
                .await
                .unwrap();
        });

        let sender = RawSender::new(Duration::from_secs(2));
        let response = sender
            .send("127.0.0.1", addr.port(), false, b"GET / HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        assert!(response.raw.contains("hello"));
        assert!(response.elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_read_deadline_yields_partial_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await.unwrap();
            stream.write_all(b"HTTP/1.1 2").await.unwrap();
            // Stall well past the caller's deadline without closing.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let sender = RawSender::new(Duration::from_millis(300));
        let response = sender
            .send("127.0.0.1", addr.port(), false, b"POST / HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        assert_eq!(response.raw, "HTTP/1.1 2");
        assert!(response.elapsed >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_stalled_backend_yields_empty_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let sender = RawSender::new(Duration::from_millis(200));
        let response = sender
            .send("127.0.0.1", addr.port(), false, b"POST / HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        assert!(response.raw.is_empty());
        assert!(response.elapsed >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_dial_failure_is_a_hard_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sender = RawSender::new(Duration::from_millis(500));
        let result = sender
            .send("127.0.0.1", addr.port(), false, b"GET / HTTP/1.1\r\n\r\n")
            .await;

        assert!(result.is_err());
    }
}
