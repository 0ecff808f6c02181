//! Connection establishment against a provisioned sandbox.
//!
//! The emulator takes a few seconds to accept connections after its
//! container starts. [`try_connect`] rebuilds the client configuration from
//! scratch on every attempt and only returns once a `ListTables` round trip
//! succeeds, so callers never receive a client that cannot talk to the
//! emulator yet.

use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use dynamotest_core::{retry, Endpoint, SandboxHandle, Settings};

use crate::client::Client;
use crate::error::ConnectError;
use crate::sandbox::{self, Disposer};

/// DynamoDB Local performs no authentication; these only satisfy the signer.
const DUMMY_KEY: &str = "dummy";
const CREDENTIALS_SOURCE: &str =
    "Hard-coded credentials; values are irrelevant for local DynamoDB";

/// Client configuration pointing at `endpoint` with placeholder credentials.
pub fn client_config(endpoint: &Endpoint, region: &str) -> aws_sdk_dynamodb::Config {
    let credentials = Credentials::new(
        DUMMY_KEY,
        DUMMY_KEY,
        Some(DUMMY_KEY.to_string()),
        None,
        CREDENTIALS_SOURCE,
    );
    aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(credentials)
        .endpoint_url(endpoint.url())
        .build()
}

/// Wait for the emulator behind `handle` and return a connected client,
/// panicking once the retry budget is spent.
pub async fn connect(handle: &SandboxHandle, settings: &Settings) -> Client {
    match try_connect(handle, settings).await {
        Ok(client) => client,
        Err(err) => panic!("could not connect to the Docker instance of DynamoDB Local: {err}"),
    }
}

/// Wait for the emulator behind `handle` and return a connected client.
pub async fn try_connect(handle: &SandboxHandle, settings: &Settings) -> Result<Client, ConnectError> {
    let endpoint = handle.endpoint();
    let region = settings.client.region.as_str();
    tracing::info!(%endpoint, container = handle.instance_id(), "using host:port of DynamoDB Local");

    let inner = retry(&settings.retry.policy(), |attempt| async move {
        let client = aws_sdk_dynamodb::Client::from_conf(client_config(endpoint, region));
        client
            .list_tables()
            .limit(1)
            .customize()
            .config_override(
                aws_sdk_dynamodb::config::Builder::default().retry_config(RetryConfig::disabled()),
            )
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        tracing::debug!(%endpoint, attempt, "DynamoDB Local is accepting requests");
        Ok::<_, aws_sdk_dynamodb::Error>(client)
    })
    .await
    .map_err(|err| ConnectError::Exhausted {
        endpoint: endpoint.to_string(),
        attempts: err.attempts,
        source: Box::new(err.last),
    })?;

    Ok(Client::new(inner, handle.instance_id()))
}

/// Provision a sandbox and connect to it: the per-test entry point.
///
/// ```rust,no_run
/// # async fn example() {
/// let (client, disposer) = dynamotest::start(&dynamotest::Settings::load().unwrap()).await;
/// // ... exercise `client` ...
/// disposer.dispose().await;
/// # }
/// ```
pub async fn start(settings: &Settings) -> (Client, Disposer) {
    let (handle, disposer) = sandbox::provision(settings).await;
    match try_connect(&handle, settings).await {
        Ok(client) => (client, disposer),
        Err(err) => {
            // Remove the container before failing so it does not outlive the test.
            if let Err(cleanup) = disposer.try_dispose().await {
                tracing::warn!(container = handle.instance_id(), error = %cleanup, "could not remove unreachable container");
            }
            panic!("could not connect to the Docker instance of DynamoDB Local: {err}");
        }
    }
}

/// [`start`] with settings read from the environment.
pub async fn start_default() -> (Client, Disposer) {
    let settings = Settings::load().unwrap_or_else(|err| panic!("invalid dynamotest settings: {err:#}"));
    start(&settings).await
}
