//! dynamotest-docker — the slice of the Docker Engine API dynamotest needs.
//!
//! [`DockerClient`] speaks plain HTTP/1.1 to the daemon, either over its Unix
//! socket or over TCP, opening one connection per request. Only the calls
//! required to run a throwaway container are implemented: ping, image
//! inspect/pull, container create/start/inspect/remove.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DockerClient, RemoveOptions};
pub use error::DockerError;
pub use models::{ContainerInspect, ContainerSpec, ContainerState, PortBinding};
pub use transport::DockerHost;
