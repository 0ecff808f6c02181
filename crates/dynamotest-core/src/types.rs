//! Core types for dynamotest-core.
//!
//! A [`SandboxHandle`] is created once by the provisioner and never mutated
//! afterwards; everything downstream only reads from it.

use std::fmt;
use std::str::FromStr;

/// Loopback address a container port was published on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL a database client should target, e.g. `http://127.0.0.1:32768`.
    pub fn url(&self) -> String {
        format!("http://{self}")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointParseError {
    #[error("endpoint {0:?} is missing a port")]
    MissingPort(String),
    #[error("endpoint {0:?} has an invalid port")]
    InvalidPort(String),
    #[error("endpoint {0:?} has an empty host")]
    EmptyHost(String),
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| EndpointParseError::MissingPort(s.to_string()))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| EndpointParseError::InvalidPort(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

/// A running emulator container and the host endpoint its API is reachable on.
///
/// The instance id is only meaningful between provisioning and disposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxHandle {
    instance_id: String,
    endpoint: Endpoint,
}

impl SandboxHandle {
    pub fn new(instance_id: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            instance_id: instance_id.into(),
            endpoint,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
