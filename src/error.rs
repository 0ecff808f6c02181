//! Error types for the provisioning, connection and loading layers.
//!
//! Provisioning and connection errors back the fatal entry points
//! ([`provision`](crate::provision), [`connect`](crate::connect)), which
//! panic with their `Display` output. [`LoadError`] is the reported channel:
//! it always names the table that failed.

use dynamotest_docker::DockerError;

/// Boxed cause from a [`TableStore`](crate::TableStore) call.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum SandboxError {
    #[error("could not connect to docker: {0}")]
    DaemonUnreachable(#[source] DockerError),

    #[error("could not pull {image}: {source}")]
    Pull {
        image: String,
        #[source]
        source: DockerError,
    },

    #[error("could not start {image}: {source}")]
    Start {
        image: String,
        #[source]
        source: DockerError,
    },

    #[error("container {id} did not publish port {port}")]
    PortNotPublished { id: String, port: String },

    #[error("could not remove container {id}: {source}")]
    Remove {
        id: String,
        #[source]
        source: DockerError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("DynamoDB Local at {endpoint} did not answer after {attempts} attempt(s): {source}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        #[source]
        source: Box<aws_sdk_dynamodb::Error>,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("table definition has no table name")]
    MissingTableName,

    #[error("could not create table '{table}': {source}")]
    CreateTable {
        table: String,
        #[source]
        source: BoxError,
    },

    #[error("could not build write request {index} for table '{table}': {source}")]
    InvalidRow {
        table: String,
        index: usize,
        #[source]
        source: aws_sdk_dynamodb::error::BuildError,
    },

    #[error("could not write data to table '{table}': {source}")]
    BatchWrite {
        table: String,
        #[source]
        source: BoxError,
    },

    #[error("{count} item(s) left unprocessed writing to table '{table}'")]
    Unprocessed { table: String, count: usize },

    #[error("could not marshal seed row {index} for table '{table}': {source}")]
    Marshal {
        table: String,
        index: usize,
        #[source]
        source: serde_dynamo::Error,
    },
}

impl LoadError {
    /// Name of the table the failure belongs to, when one was known.
    pub fn table(&self) -> Option<&str> {
        match self {
            LoadError::MissingTableName => None,
            LoadError::CreateTable { table, .. }
            | LoadError::InvalidRow { table, .. }
            | LoadError::BatchWrite { table, .. }
            | LoadError::Unprocessed { table, .. }
            | LoadError::Marshal { table, .. } => Some(table),
        }
    }
}
