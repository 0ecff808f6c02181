//! Connection handling for the Docker daemon.
//!
//! Supports two transport modes:
//! - **Unix socket**: `unix:///var/run/docker.sock`, the standard local setup
//! - **TCP**: `tcp://host:port` (or `http://host:port`), used by remote
//!   daemons, Docker Desktop's TCP listener, and the fake API in tests
//!
//! Each request gets its own HTTP/1 connection. The daemon calls made while
//! provisioning are few and far between, so pooling would buy nothing.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::error::DockerError;

/// Where the Docker daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerHost {
    Unix(PathBuf),
    Tcp(String),
}

impl DockerHost {
    /// Parse a `DOCKER_HOST`-style address.
    pub fn parse(uri: &str) -> Result<Self, DockerError> {
        if let Some(path) = uri.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(DockerError::UnsupportedHost(uri.to_string()));
            }
            return Ok(DockerHost::Unix(PathBuf::from(path)));
        }
        let authority = uri
            .strip_prefix("tcp://")
            .or_else(|| uri.strip_prefix("http://"))
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| DockerError::UnsupportedHost(uri.to_string()))?;
        Ok(DockerHost::Tcp(authority.to_string()))
    }

    /// Value for the `Host` header. The daemon ignores it on a Unix socket,
    /// but HTTP/1.1 requires one.
    pub fn authority(&self) -> &str {
        match self {
            DockerHost::Unix(_) => "docker",
            DockerHost::Tcp(authority) => authority,
        }
    }
}

impl fmt::Display for DockerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerHost::Unix(path) => write!(f, "unix://{}", path.display()),
            DockerHost::Tcp(authority) => write!(f, "tcp://{authority}"),
        }
    }
}

/// Open a connection to `host` and send a single request over it.
pub(crate) async fn send(
    host: &DockerHost,
    request: Request<Full<Bytes>>,
) -> Result<Response<Incoming>, DockerError> {
    let connect_err = |source| DockerError::Connect {
        host: host.to_string(),
        source,
    };
    match host {
        #[cfg(unix)]
        DockerHost::Unix(path) => {
            let stream = tokio::net::UnixStream::connect(path)
                .await
                .map_err(connect_err)?;
            exchange(TokioIo::new(stream), request).await
        }
        #[cfg(not(unix))]
        DockerHost::Unix(_) => Err(DockerError::UnsupportedHost(host.to_string())),
        DockerHost::Tcp(authority) => {
            let stream = TcpStream::connect(authority.as_str())
                .await
                .map_err(connect_err)?;
            exchange(TokioIo::new(stream), request).await
        }
    }
}

async fn exchange<T>(
    io: T,
    request: Request<Full<Bytes>>,
) -> Result<Response<Incoming>, DockerError>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, connection) = hyper::client::conn::http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::debug!(error = %err, "docker connection closed with error");
        }
    });
    Ok(sender.send_request(request).await?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
