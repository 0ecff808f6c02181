//! The client handed to tests.

use std::ops::Deref;

use aws_sdk_dynamodb::operation::create_table::CreateTableInput;

use crate::loader::{self, IntoSeedRow};

/// A DynamoDB client connected to one sandbox.
///
/// Dereferences to [`aws_sdk_dynamodb::Client`], so every SDK operation is
/// available directly. Cloning is cheap and clones share the underlying
/// connection pool, which is how one sandbox serves many concurrent tests.
#[derive(Debug, Clone)]
pub struct Client {
    inner: aws_sdk_dynamodb::Client,
    container_id: String,
}

impl Client {
    pub fn new(inner: aws_sdk_dynamodb::Client, container_id: impl Into<String>) -> Self {
        Self {
            inner,
            container_id: container_id.into(),
        }
    }

    /// Id of the container backing this client.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn inner(&self) -> &aws_sdk_dynamodb::Client {
        &self.inner
    }

    pub fn into_inner(self) -> aws_sdk_dynamodb::Client {
        self.inner
    }

    /// Create a uniquely named table from `template` and seed it with `rows`,
    /// returning the generated name. Panics on any failure, including a row
    /// that cannot be marshaled.
    ///
    /// See [`loader::create_single_schema`] for the fallible form.
    pub async fn create_testing_table<R, I>(
        &self,
        prefix: &str,
        template: &CreateTableInput,
        rows: I,
    ) -> String
    where
        R: IntoSeedRow,
        I: IntoIterator<Item = R>,
    {
        match loader::create_single_schema(self, prefix, template, rows).await {
            Ok(name) => name,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Deref for Client {
    type Target = aws_sdk_dynamodb::Client;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
