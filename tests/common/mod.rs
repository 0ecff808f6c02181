//! Shared test utilities for dynamotest integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The fakes bind to `127.0.0.1:0`, so harnesses can run
//! in parallel without coordinating ports.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod memory_store;

pub use assertions::*;
pub use builders::*;
pub use fake_docker_api::FakeDockerApi;
pub use fake_dynamodb::FakeDynamoDb;
pub use fixtures::*;
pub use memory_store::{Call, MemoryStore};

use dynamotest::Settings;

/// Install a test-friendly tracing subscriber once per binary. Respects
/// `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Settings aimed at a fake Docker daemon, with a short retry budget so
/// failures surface quickly.
pub fn settings_for(docker: &FakeDockerApi) -> Settings {
    let mut settings = Settings::defaults();
    settings.docker.host = docker.docker_host();
    settings.retry.initial_interval_ms = 10;
    settings.retry.max_interval_ms = 50;
    settings.retry.max_attempts = 5;
    settings
}

/// Fake emulator plus a fake daemon whose containers publish it.
pub async fn fake_environment() -> (FakeDockerApi, FakeDynamoDb, Settings) {
    init_tracing();
    let dynamo = FakeDynamoDb::start().await.expect("fake DynamoDB should start");
    let docker = FakeDockerApi::start(dynamo.port())
        .await
        .expect("fake Docker API should start");
    let settings = settings_for(&docker);
    (docker, dynamo, settings)
}
