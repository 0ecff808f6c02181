//! Sandbox provisioning and disposal.
//!
//! [`provision`] starts one DynamoDB Local container with its API published
//! on an ephemeral loopback port and hands back a [`SandboxHandle`] plus the
//! [`Disposer`] that removes it again.
//!
//! Environment faults (no daemon, image cannot start, container cannot be
//! removed) are fatal in [`provision`] and [`Disposer::dispose`]; the
//! `try_` variants return the error instead.

use dynamotest_core::{Endpoint, SandboxHandle, Settings};
use dynamotest_docker::{ContainerSpec, DockerClient, RemoveOptions};

use crate::error::SandboxError;

/// Label stamped on every container this crate starts, so stray ones can be
/// found with `docker ps --filter label=dynamotest.managed`.
pub const MANAGED_LABEL: &str = "dynamotest.managed";

/// Start an emulator container, panicking if the environment cannot.
pub async fn provision(settings: &Settings) -> (SandboxHandle, Disposer) {
    match try_provision(settings).await {
        Ok(provisioned) => provisioned,
        Err(err) => panic!("could not provision DynamoDB Local: {err}"),
    }
}

/// Start an emulator container.
pub async fn try_provision(settings: &Settings) -> Result<(SandboxHandle, Disposer), SandboxError> {
    let docker =
        DockerClient::from_uri(&settings.docker_host()).map_err(SandboxError::DaemonUnreachable)?;
    docker
        .ping()
        .await
        .map_err(SandboxError::DaemonUnreachable)?;

    let emulator = &settings.emulator;
    let image = emulator.image();
    let pull_err = |source| SandboxError::Pull {
        image: image.clone(),
        source,
    };
    if !docker.image_exists(&image).await.map_err(pull_err)? {
        tracing::info!(%image, "pulling emulator image");
        docker
            .pull_image(&emulator.repository, &emulator.tag)
            .await
            .map_err(pull_err)?;
    }

    let port_key = emulator.port_key();
    let spec = ContainerSpec::new(&image)
        .publish(&port_key, &emulator.host_ip)
        .label(MANAGED_LABEL, "true");
    let start_err = |source| SandboxError::Start {
        image: image.clone(),
        source,
    };
    let id = docker.create_container(&spec).await.map_err(start_err)?;

    // From here on the container exists and must be cleaned up on failure.
    let disposer = Disposer::new(docker.clone(), id.clone());
    let started = async {
        docker.start_container(&id).await.map_err(start_err)?;
        let inspect = docker.inspect_container(&id).await.map_err(start_err)?;
        inspect
            .host_port(&port_key)
            .ok_or_else(|| SandboxError::PortNotPublished {
                id: id.clone(),
                port: port_key.clone(),
            })
    }
    .await;

    let (host_ip, port) = match started {
        Ok(binding) => binding,
        Err(err) => {
            if let Err(cleanup) = disposer.try_dispose().await {
                tracing::warn!(container = %id, error = %cleanup, "could not remove failed container");
            }
            return Err(err);
        }
    };

    let endpoint = Endpoint::new(reachable_host(&host_ip, &emulator.host_ip), port);
    tracing::debug!(container = %id, %endpoint, %image, "emulator container started");
    Ok((SandboxHandle::new(id, endpoint), disposer))
}

/// The daemon may report the wildcard address it bound; connect to the
/// configured loopback address instead.
fn reachable_host(reported: &str, configured: &str) -> String {
    match reported {
        "" | "0.0.0.0" | "::" => configured.to_string(),
        host => host.to_string(),
    }
}

/// Removes one provisioned container. Consumed on use, so a sandbox cannot be
/// disposed twice through the same disposer.
#[derive(Debug)]
pub struct Disposer {
    docker: DockerClient,
    instance_id: String,
    disposed: bool,
}

impl Disposer {
    fn new(docker: DockerClient, instance_id: String) -> Self {
        Self {
            docker,
            instance_id,
            disposed: false,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Force-remove the container and its volumes, panicking on failure.
    pub async fn dispose(self) {
        if let Err(err) = self.try_dispose().await {
            panic!("could not purge DynamoDB Local: {err}");
        }
    }

    /// Force-remove the container and its volumes.
    ///
    /// On failure the container may still exist, and dropping the disposer
    /// logs it as leaked.
    pub async fn try_dispose(mut self) -> Result<(), SandboxError> {
        self.remove().await
    }

    async fn remove(&mut self) -> Result<(), SandboxError> {
        self.docker
            .remove_container(&self.instance_id, RemoveOptions::purge())
            .await
            .map_err(|source| SandboxError::Remove {
                id: self.instance_id.clone(),
                source,
            })?;
        self.disposed = true;
        tracing::debug!(container = %self.instance_id, "emulator container removed");
        Ok(())
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        if !self.disposed {
            tracing::warn!(
                container = %self.instance_id,
                "sandbox dropped without being disposed; the container is still running"
            );
        }
    }
}
