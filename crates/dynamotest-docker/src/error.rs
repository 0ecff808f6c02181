use std::io;

/// Errors from Docker Engine API calls.
///
/// `NotFound` is split out from `Api` because callers routinely need to tell
/// "already gone" apart from a genuine failure.
#[derive(thiserror::Error, Debug)]
pub enum DockerError {
    #[error("unsupported docker host {0:?}: expected unix:// or tcp://")]
    UnsupportedHost(String),

    #[error("could not connect to docker at {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("http: {0}")]
    Http(#[from] hyper::Error),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("docker api returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("image pull failed: {0}")]
    Pull(String),

    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DockerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DockerError::NotFound(_))
    }
}
