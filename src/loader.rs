//! Schema creation and seed loading.
//!
//! A [`SchemaSeed`] pairs one table definition with the rows it should start
//! with. [`Loader::load`] walks the seeds strictly in order:
//!
//! ```text
//! declared ──► creating ──┬──► created-empty
//!                         ├──► seeding ──► seeded
//!                         └──► failed
//! ```
//!
//! The first failure stops the whole load and is reported with the table
//! name. Tables created earlier in the same call are left in place; cleanup
//! happens when the sandbox is disposed.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::operation::create_table::CreateTableInput;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use dynamotest_core::config::LoaderSettings;
use serde::Serialize;

use crate::client::Client;
use crate::error::{BoxError, LoadError};

/// One row, as the attribute map DynamoDB stores.
pub type Item = HashMap<String, AttributeValue>;

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// The two database calls the loader depends on.
///
/// Implemented for [`aws_sdk_dynamodb::Client`] and [`Client`]; tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create the table described by `input`, allowing up to `max_attempts`
    /// attempts at the transport level.
    async fn create_schema(&self, input: CreateTableInput, max_attempts: u32) -> Result<(), BoxError>;

    /// Submit `requests` for `table` as one `BatchWriteItem` call. Returns
    /// how many requests came back unprocessed.
    async fn write_batch(&self, table: &str, requests: Vec<WriteRequest>) -> Result<usize, BoxError>;
}

#[async_trait]
impl TableStore for aws_sdk_dynamodb::Client {
    async fn create_schema(&self, input: CreateTableInput, max_attempts: u32) -> Result<(), BoxError> {
        self.create_table()
            .set_table_name(input.table_name)
            .set_attribute_definitions(input.attribute_definitions)
            .set_key_schema(input.key_schema)
            .set_local_secondary_indexes(input.local_secondary_indexes)
            .set_global_secondary_indexes(input.global_secondary_indexes)
            .set_billing_mode(input.billing_mode)
            .set_provisioned_throughput(input.provisioned_throughput)
            .set_stream_specification(input.stream_specification)
            .set_sse_specification(input.sse_specification)
            .set_tags(input.tags)
            .set_table_class(input.table_class)
            .set_deletion_protection_enabled(input.deletion_protection_enabled)
            .set_resource_policy(input.resource_policy)
            .set_on_demand_throughput(input.on_demand_throughput)
            .set_warm_throughput(input.warm_throughput)
            .customize()
            .config_override(
                aws_sdk_dynamodb::config::Builder::default()
                    .retry_config(RetryConfig::standard().with_max_attempts(max_attempts)),
            )
            .send()
            .await
            .map_err(|err| BoxError::from(aws_sdk_dynamodb::Error::from(err)))?;
        Ok(())
    }

    async fn write_batch(&self, table: &str, requests: Vec<WriteRequest>) -> Result<usize, BoxError> {
        let output = self
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|err| BoxError::from(aws_sdk_dynamodb::Error::from(err)))?;
        Ok(output
            .unprocessed_items()
            .and_then(|unprocessed| unprocessed.get(table))
            .map_or(0, Vec::len))
    }
}

#[async_trait]
impl TableStore for Client {
    async fn create_schema(&self, input: CreateTableInput, max_attempts: u32) -> Result<(), BoxError> {
        self.inner().create_schema(input, max_attempts).await
    }

    async fn write_batch(&self, table: &str, requests: Vec<WriteRequest>) -> Result<usize, BoxError> {
        self.inner().write_batch(table, requests).await
    }
}

// ---------------------------------------------------------------------------
// Seed rows
// ---------------------------------------------------------------------------

/// Anything that can become a seed row.
///
/// Pre-typed [`Item`]s pass through untouched; [`Record`] wrappers and
/// `serde_json::Value` objects are marshaled with `serde_dynamo`.
pub trait IntoSeedRow {
    fn into_seed_row(self) -> Result<Item, serde_dynamo::Error>;
}

impl IntoSeedRow for Item {
    fn into_seed_row(self) -> Result<Item, serde_dynamo::Error> {
        Ok(self)
    }
}

impl IntoSeedRow for serde_json::Value {
    fn into_seed_row(self) -> Result<Item, serde_dynamo::Error> {
        serde_dynamo::to_item(self)
    }
}

/// Wraps a plain `Serialize` record so it can be used as a seed row.
///
/// ```rust
/// use dynamotest::{IntoSeedRow, Record};
///
/// #[derive(serde::Serialize)]
/// struct User { id: String, age: u32 }
///
/// let item = Record(User { id: "1".into(), age: 42 }).into_seed_row().unwrap();
/// assert_eq!(item.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T>(pub T);

impl<T: Serialize> IntoSeedRow for Record<T> {
    fn into_seed_row(self) -> Result<Item, serde_dynamo::Error> {
        serde_dynamo::to_item(self.0)
    }
}

// ---------------------------------------------------------------------------
// Schema seeds and load state
// ---------------------------------------------------------------------------

/// A table definition plus the rows to load into it.
#[derive(Debug, Clone)]
pub struct SchemaSeed {
    pub table: CreateTableInput,
    pub rows: Vec<Item>,
}

impl SchemaSeed {
    pub fn new(table: CreateTableInput) -> Self {
        Self {
            table,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Item>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.table_name()
    }
}

/// Where one schema is in its load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Declared,
    Creating,
    CreatedEmpty,
    Seeding,
    Seeded,
    Failed,
}

impl SchemaState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SchemaState::CreatedEmpty | SchemaState::Seeded | SchemaState::Failed
        )
    }

    pub fn can_transition_to(self, next: SchemaState) -> bool {
        use SchemaState::*;
        matches!(
            (self, next),
            (Declared, Creating)
                | (Declared, Failed)
                | (Creating, CreatedEmpty)
                | (Creating, Seeding)
                | (Creating, Failed)
                | (Seeding, Seeded)
                | (Seeding, Failed)
        )
    }

    fn advance(&mut self, next: SchemaState, table: &str) {
        debug_assert!(
            self.can_transition_to(next),
            "invalid schema transition {self} -> {next}"
        );
        tracing::debug!(table, from = %self, to = %next, "schema state");
        *self = next;
    }
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaState::Declared => write!(f, "declared"),
            SchemaState::Creating => write!(f, "creating"),
            SchemaState::CreatedEmpty => write!(f, "created-empty"),
            SchemaState::Seeding => write!(f, "seeding"),
            SchemaState::Seeded => write!(f, "seeded"),
            SchemaState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome for one successfully loaded schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    pub state: SchemaState,
    pub rows_written: usize,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Creates tables and seeds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    create_table_max_attempts: u32,
    batch_size: usize,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(&LoaderSettings::default())
    }
}

impl Loader {
    pub fn new(settings: &LoaderSettings) -> Self {
        Self {
            create_table_max_attempts: settings.create_table_max_attempts,
            batch_size: settings.effective_batch_size(),
        }
    }

    /// Create and seed each schema in order, stopping at the first failure.
    pub async fn load<S, I>(&self, store: &S, seeds: I) -> Result<Vec<LoadReport>, LoadError>
    where
        S: TableStore + ?Sized,
        I: IntoIterator<Item = SchemaSeed>,
    {
        let mut reports = Vec::new();
        for seed in seeds {
            reports.push(self.load_one(store, seed).await?);
        }
        Ok(reports)
    }

    async fn load_one<S>(&self, store: &S, seed: SchemaSeed) -> Result<LoadReport, LoadError>
    where
        S: TableStore + ?Sized,
    {
        let SchemaSeed { table, rows } = seed;
        let name = table
            .table_name()
            .map(str::to_owned)
            .ok_or(LoadError::MissingTableName)?;
        let mut state = SchemaState::Declared;

        state.advance(SchemaState::Creating, &name);
        if let Err(source) = store.create_schema(table, self.create_table_max_attempts).await {
            state.advance(SchemaState::Failed, &name);
            return Err(LoadError::CreateTable { table: name, source });
        }

        if rows.is_empty() {
            state.advance(SchemaState::CreatedEmpty, &name);
            tracing::info!("Table '{name}' has been created, and no initial data has been added");
            return Ok(LoadReport {
                table: name,
                state,
                rows_written: 0,
            });
        }

        state.advance(SchemaState::Seeding, &name);
        match self.seed(store, &name, rows).await {
            Ok(rows_written) => {
                state.advance(SchemaState::Seeded, &name);
                tracing::info!(rows = rows_written, "Table '{name}' has been created");
                Ok(LoadReport {
                    table: name,
                    state,
                    rows_written,
                })
            }
            Err(err) => {
                state.advance(SchemaState::Failed, &name);
                Err(err)
            }
        }
    }

    async fn seed<S>(&self, store: &S, table: &str, rows: Vec<Item>) -> Result<usize, LoadError>
    where
        S: TableStore + ?Sized,
    {
        let mut pending = rows
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                put_request(item).map_err(|source| LoadError::InvalidRow {
                    table: table.to_string(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = pending.len();

        while !pending.is_empty() {
            let rest = pending.split_off(pending.len().min(self.batch_size));
            let batch = std::mem::replace(&mut pending, rest);
            let unprocessed = store
                .write_batch(table, batch)
                .await
                .map_err(|source| LoadError::BatchWrite {
                    table: table.to_string(),
                    source,
                })?;
            if unprocessed > 0 {
                return Err(LoadError::Unprocessed {
                    table: table.to_string(),
                    count: unprocessed,
                });
            }
        }
        Ok(total)
    }

    /// Create one table named `prefix-<random>` from `template`, seed it with
    /// `rows`, and return the generated name.
    ///
    /// The random suffix keeps tests that share one sandbox from colliding.
    /// The template's own table name is ignored.
    pub async fn create_single_schema<S, R, I>(
        &self,
        store: &S,
        prefix: &str,
        template: &CreateTableInput,
        rows: I,
    ) -> Result<String, LoadError>
    where
        S: TableStore + ?Sized,
        R: IntoSeedRow,
        I: IntoIterator<Item = R>,
    {
        let name = unique_table_name(prefix);
        let mut table = template.clone();
        table.table_name = Some(name.clone());

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                row.into_seed_row().map_err(|source| LoadError::Marshal {
                    table: name.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.load(store, [SchemaSeed { table, rows }]).await?;
        Ok(name)
    }
}

/// [`Loader::load`] with default settings.
pub async fn load<S, I>(store: &S, seeds: I) -> Result<Vec<LoadReport>, LoadError>
where
    S: TableStore + ?Sized,
    I: IntoIterator<Item = SchemaSeed>,
{
    Loader::default().load(store, seeds).await
}

/// [`Loader::create_single_schema`] with default settings.
pub async fn create_single_schema<S, R, I>(
    store: &S,
    prefix: &str,
    template: &CreateTableInput,
    rows: I,
) -> Result<String, LoadError>
where
    S: TableStore + ?Sized,
    R: IntoSeedRow,
    I: IntoIterator<Item = R>,
{
    Loader::default()
        .create_single_schema(store, prefix, template, rows)
        .await
}

/// `prefix-<32 hex chars>`.
pub fn unique_table_name(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

fn put_request(item: Item) -> Result<WriteRequest, BuildError> {
    let put = PutRequest::builder().set_item(Some(item)).build()?;
    Ok(WriteRequest::builder().put_request(put).build())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
