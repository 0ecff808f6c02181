//! dynamotest — disposable DynamoDB Local containers for integration tests.
//!
//! Each sandbox is a fresh `amazon/dynamodb-local` container with its API
//! published on an ephemeral loopback port. The crate covers the lifecycle
//! around it: starting the container, waiting until the emulator answers,
//! creating and seeding tables, and removing the container afterwards.
//!
//! # Architecture
//!
//! ```text
//! Provisioner ──► Connection Establisher ──► Client ──► Loader
//!      │                                       │
//!      └──────────── Disposer ◄── test / session end
//! ```
//!
//! Two ways to use it:
//!
//! - **Per test**: [`start`] returns a [`Client`] and a [`Disposer`]; call
//!   [`Disposer::dispose`] when the test is done.
//! - **Per suite**: [`run_with_session`] shares one sandbox across a suite
//!   and tests fetch it with [`current_client`].
//!
//! Environment faults (no Docker daemon, container will not start or will not
//! go away, emulator never answers) panic; each has a `try_` variant
//! returning the error. Table setup failures are returned as [`LoadError`].

pub mod client;
pub mod connect;
pub mod error;
pub mod loader;
pub mod sandbox;
pub mod session;

pub use client::Client;
pub use connect::{client_config, connect, start, start_default, try_connect};
pub use error::{BoxError, ConnectError, LoadError, SandboxError};
pub use loader::{
    create_single_schema, load, unique_table_name, IntoSeedRow, Item, LoadReport, Loader, Record,
    SchemaSeed, SchemaState, TableStore,
};
pub use sandbox::{provision, try_provision, Disposer};
pub use session::{current_client, run_with_session, run_with_session_using, try_current_client};

pub use aws_sdk_dynamodb;
pub use dynamotest_core::{config, Endpoint, RetryPolicy, SandboxHandle, Settings};
pub use dynamotest_docker as docker;
