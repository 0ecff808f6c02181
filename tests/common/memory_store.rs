//! In-memory [`TableStore`] that records every call, for loader tests that
//! do not need an emulator.

use async_trait::async_trait;
use dynamotest::aws_sdk_dynamodb::operation::create_table::CreateTableInput;
use dynamotest::aws_sdk_dynamodb::types::WriteRequest;
use dynamotest::{BoxError, TableStore};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// One call made against a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateTable { table: String, max_attempts: u32 },
    BatchWrite { table: String, rows: usize },
}

#[derive(Default)]
struct StoreState {
    tables: BTreeMap<String, Vec<WriteRequest>>,
    calls: Vec<Call>,
    fail_create: HashSet<String>,
    fail_write: HashSet<String>,
    unprocessed: HashMap<String, usize>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `CreateTable` for `table` fail.
    pub fn fail_create(self, table: &str) -> Self {
        self.state.lock().unwrap().fail_create.insert(table.to_string());
        self
    }

    /// Make every `BatchWriteItem` against `table` fail.
    pub fn fail_write(self, table: &str) -> Self {
        self.state.lock().unwrap().fail_write.insert(table.to_string());
        self
    }

    /// Report `count` rows as unprocessed on every write to `table`.
    pub fn leave_unprocessed(self, table: &str, count: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .unprocessed
            .insert(table.to_string(), count);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.state.lock().unwrap().tables.keys().cloned().collect()
    }

    /// Write requests accepted for `table`, in order. `None` if the table was
    /// never created.
    pub fn writes(&self, table: &str) -> Option<Vec<WriteRequest>> {
        self.state.lock().unwrap().tables.get(table).cloned()
    }

    /// Sizes of the batches written to `table`, in order.
    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BatchWrite { table: t, rows } if t == table => Some(rows),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn create_schema(&self, input: CreateTableInput, max_attempts: u32) -> Result<(), BoxError> {
        let table = input.table_name().unwrap_or_default().to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateTable {
            table: table.clone(),
            max_attempts,
        });
        if state.fail_create.contains(&table) {
            return Err(format!("injected CreateTable failure for {table}").into());
        }
        if state.tables.contains_key(&table) {
            return Err("Cannot create preexisting table".into());
        }
        state.tables.insert(table, Vec::new());
        Ok(())
    }

    async fn write_batch(&self, table: &str, requests: Vec<WriteRequest>) -> Result<usize, BoxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::BatchWrite {
            table: table.to_string(),
            rows: requests.len(),
        });
        if state.fail_write.contains(table) {
            return Err(format!("injected BatchWriteItem failure for {table}").into());
        }
        let unprocessed = state.unprocessed.get(table).copied().unwrap_or(0);
        let Some(rows) = state.tables.get_mut(table) else {
            return Err("Cannot do operations on a non-existent table".into());
        };
        rows.extend(requests);
        Ok(unprocessed)
    }
}
