//! Process-wide session: one sandbox shared by a whole test suite.
//!
//! [`run_with_session`] owns the lifecycle. It provisions and connects once,
//! installs the client as the session, runs the suite, then uninstalls and
//! disposes the sandbox whether the suite returned or panicked. Tests reach
//! the shared client through [`current_client`], which fails fast when no
//! session is running.
//!
//! Rust's built-in test harness has no suite-level setup hook, so the usual
//! home for this is a `harness = false` test target:
//!
//! ```rust,no_run
//! fn main() {
//!     let runtime = tokio::runtime::Runtime::new().unwrap();
//!     let code = runtime.block_on(dynamotest::run_with_session(|| async {
//!         let client = dynamotest::current_client();
//!         // ... run the suite against `client` ...
//!         0
//!     }));
//!     std::process::exit(code);
//! }
//! ```
//!
//! Tables created by concurrent tests in one session must use unique names;
//! see [`Client::create_testing_table`](crate::Client::create_testing_table).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{PoisonError, RwLock};

use dynamotest_core::Settings;
use futures::FutureExt;

use crate::client::Client;
use crate::connect;

/// The process-wide session slot. `Reserved` covers the window in which the
/// sandbox is being started, so a second session fails before it creates a
/// container of its own.
#[derive(Debug)]
enum Slot {
    Vacant,
    Reserved,
    Installed(Client),
}

static SESSION: RwLock<Slot> = RwLock::new(Slot::Vacant);

/// Run `runner` with a shared sandbox installed as the session, returning its
/// exit code unchanged. Settings are read from the environment.
pub async fn run_with_session<F, Fut>(runner: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = i32>,
{
    let settings =
        Settings::load().unwrap_or_else(|err| panic!("invalid dynamotest settings: {err:#}"));
    run_with_session_using(&settings, runner).await
}

/// [`run_with_session`] with explicit settings.
///
/// Panics without touching Docker when another session is already running.
pub async fn run_with_session_using<F, Fut>(settings: &Settings, runner: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = i32>,
{
    reserve();
    let (client, disposer) = match AssertUnwindSafe(connect::start(settings))
        .catch_unwind()
        .await
    {
        Ok(started) => started,
        Err(panic) => {
            release();
            std::panic::resume_unwind(panic);
        }
    };
    let container = client.container_id().to_string();
    install(client);
    tracing::info!(%container, "session started");

    let outcome = AssertUnwindSafe(runner()).catch_unwind().await;

    release();
    disposer.dispose().await;
    tracing::info!(%container, "session torn down");

    match outcome {
        Ok(code) => code,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// The session's client. Panics if [`run_with_session`] is not running.
pub fn current_client() -> Client {
    try_current_client().unwrap_or_else(|| {
        panic!("no DynamoDB Local session is running; wrap the suite in dynamotest::run_with_session")
    })
}

/// The session's client, if a session is running.
pub fn try_current_client() -> Option<Client> {
    match &*SESSION.read().unwrap_or_else(PoisonError::into_inner) {
        Slot::Installed(client) => Some(client.clone()),
        Slot::Vacant | Slot::Reserved => None,
    }
}

fn reserve() {
    let mut slot = SESSION.write().unwrap_or_else(PoisonError::into_inner);
    match &*slot {
        Slot::Vacant => *slot = Slot::Reserved,
        Slot::Reserved => panic!("a DynamoDB Local session is already starting"),
        Slot::Installed(existing) => panic!(
            "a DynamoDB Local session is already running (container {})",
            existing.container_id()
        ),
    }
}

fn install(client: Client) {
    *SESSION.write().unwrap_or_else(PoisonError::into_inner) = Slot::Installed(client);
}

fn release() {
    *SESSION.write().unwrap_or_else(PoisonError::into_inner) = Slot::Vacant;
}
