//! Request and response bodies for the Docker Engine API.
//!
//! Field names follow the API's PascalCase. Only the fields dynamotest reads
//! or writes are modelled; everything else is ignored on deserialisation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /containers/create`.
///
/// ```rust
/// use dynamotest_docker::ContainerSpec;
///
/// let spec = ContainerSpec::new("amazon/dynamodb-local:latest")
///     .publish("8000/tcp", "127.0.0.1")
///     .label("dynamotest.managed", "true");
/// assert_eq!(spec.image, "amazon/dynamodb-local:latest");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    pub image: String,
    pub exposed_ports: HashMap<String, Empty>,
    pub labels: HashMap<String, String>,
    pub host_config: HostConfig,
}

/// Docker encodes sets as objects with empty-object values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    pub port_bindings: HashMap<String, Vec<PortBinding>>,
}

/// One host-side binding of a container port. An empty `host_port` asks the
/// daemon to pick a free one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

impl ContainerSpec {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    /// Expose `port_key` (e.g. `8000/tcp`) and bind it to an ephemeral port
    /// on `host_ip`.
    pub fn publish(mut self, port_key: impl Into<String>, host_ip: impl Into<String>) -> Self {
        let port_key = port_key.into();
        self.exposed_ports.insert(port_key.clone(), Empty {});
        self.host_config.port_bindings.insert(
            port_key,
            vec![PortBinding {
                host_ip: host_ip.into(),
                host_port: String::new(),
            }],
        );
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Response of `POST /containers/create`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateContainerResponse {
    pub id: String,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Response of `GET /containers/{id}/json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInspect {
    pub id: String,
    #[serde(default)]
    pub state: ContainerState,
    #[serde(default)]
    pub network_settings: NetworkSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub running: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    /// Unpublished ports map to `null`.
    #[serde(default)]
    pub ports: HashMap<String, Option<Vec<PortBinding>>>,
}

impl ContainerInspect {
    /// First host binding published for `port_key`, as `(host_ip, port)`.
    pub fn host_port(&self, port_key: &str) -> Option<(String, u16)> {
        self.network_settings
            .ports
            .get(port_key)?
            .as_ref()?
            .iter()
            .find_map(|binding| {
                let port = binding.host_port.parse().ok()?;
                Some((binding.host_ip.clone(), port))
            })
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

/// One line of the newline-delimited progress stream from `POST /images/create`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullProgress {
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
