//! Typed client for the Docker Engine API.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::DockerError;
use crate::models::{
    ContainerInspect, ContainerSpec, CreateContainerResponse, ErrorBody, PullProgress,
};
use crate::transport::{self, DockerHost};

/// Characters left unescaped in query values: RFC 3986 unreserved plus the
/// separators image references use.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

/// Options for `DELETE /containers/{id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Kill the container first if it is running.
    pub force: bool,
    /// Remove anonymous volumes along with the container.
    pub volumes: bool,
}

impl RemoveOptions {
    /// Force-remove the container and its anonymous volumes.
    pub fn purge() -> Self {
        Self {
            force: true,
            volumes: true,
        }
    }
}

/// Handle to a Docker daemon. Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct DockerClient {
    host: DockerHost,
}

impl DockerClient {
    pub fn new(host: DockerHost) -> Self {
        Self { host }
    }

    /// Build a client from a `DOCKER_HOST`-style address.
    pub fn from_uri(uri: &str) -> Result<Self, DockerError> {
        DockerHost::parse(uri).map(Self::new)
    }

    pub fn host(&self) -> &DockerHost {
        &self.host
    }

    /// `GET /_ping`. Succeeds when the daemon is reachable and healthy.
    pub async fn ping(&self) -> Result<(), DockerError> {
        self.call(Method::GET, "/_ping", None).await.map(|_| ())
    }

    /// Whether `image` (`repository:tag`) is present locally.
    pub async fn image_exists(&self, image: &str) -> Result<bool, DockerError> {
        match self
            .call(Method::GET, &format!("/images/{image}/json"), None)
            .await
        {
            Ok(_) => Ok(true),
            Err(DockerError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// `POST /images/create`. Blocks until the pull stream ends; an `error`
    /// entry anywhere in the stream fails the pull.
    pub async fn pull_image(&self, repository: &str, tag: &str) -> Result<(), DockerError> {
        let path = format!(
            "/images/create?fromImage={}&tag={}",
            encode(repository),
            encode(tag)
        );
        let body = self.call(Method::POST, &path, None).await?;
        for line in body.split(|b| *b == b'\n').filter(|line| !line.is_empty()) {
            let progress: PullProgress = serde_json::from_slice(line)?;
            if let Some(error) = progress.error {
                return Err(DockerError::Pull(error));
            }
        }
        Ok(())
    }

    /// `POST /containers/create`. Returns the new container's id.
    pub async fn create_container(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        let body = serde_json::to_vec(spec)?;
        let response = self
            .call(Method::POST, "/containers/create", Some(body))
            .await?;
        let created: CreateContainerResponse = serde_json::from_slice(&response)?;
        for warning in created.warnings.iter().flatten() {
            tracing::warn!(container = %created.id, "docker: {warning}");
        }
        Ok(created.id)
    }

    /// `POST /containers/{id}/start`. Starting a running container is not an
    /// error.
    pub async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        self.call(Method::POST, &format!("/containers/{id}/start"), None)
            .await
            .map(|_| ())
    }

    /// `GET /containers/{id}/json`.
    pub async fn inspect_container(&self, id: &str) -> Result<ContainerInspect, DockerError> {
        let body = self
            .call(Method::GET, &format!("/containers/{id}/json"), None)
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `DELETE /containers/{id}`.
    pub async fn remove_container(&self, id: &str, options: RemoveOptions) -> Result<(), DockerError> {
        let path = format!(
            "/containers/{id}?force={}&v={}",
            options.force, options.volumes
        );
        self.call(Method::DELETE, &path, None).await.map(|_| ())
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        json: Option<Vec<u8>>,
    ) -> Result<Bytes, DockerError> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(path)
            .header(header::HOST, self.host.authority());
        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(json))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder
            .body(body)
            .map_err(|err| DockerError::Request(err.to_string()))?;

        tracing::debug!(%method, path, host = %self.host, "docker api request");
        let response = transport::send(&self.host, request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        check(status, bytes)
    }
}

/// Map a non-2xx response onto a [`DockerError`]. 304 (already started /
/// already stopped) counts as success.
fn check(status: StatusCode, body: Bytes) -> Result<Bytes, DockerError> {
    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        return Ok(body);
    }
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .map(|err| err.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
    if status == StatusCode::NOT_FOUND {
        return Err(DockerError::NotFound(message));
    }
    Err(DockerError::Api {
        status: status.as_u16(),
        message,
    })
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
