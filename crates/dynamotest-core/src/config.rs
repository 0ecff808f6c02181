//! Configuration types for dynamotest.
//!
//! [`Settings::load`] layers `DYNAMOTEST__*` environment variables on top of
//! the embedded defaults. [`Settings::defaults`] returns the same defaults
//! without consulting the environment (useful in tests). No configuration file
//! is ever read or written.
//!
//! Nested keys use a double underscore, e.g. `DYNAMOTEST__EMULATOR__TAG=2.5.2`
//! or `DYNAMOTEST__RETRY__MAX_ATTEMPTS=5`.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_SETTINGS: &str = r#"
[docker]
host = ""

[emulator]
repository     = "amazon/dynamodb-local"
tag            = "latest"
container_port = 8000
host_ip        = "127.0.0.1"

[client]
region = "us-east-1"

[retry]
initial_interval_ms = 500
max_interval_ms     = 5000
multiplier          = 1.5
max_attempts        = 20

[loader]
create_table_max_attempts = 10
batch_size                = 25
"#;

const ENV_PREFIX: &str = "DYNAMOTEST";
const ENV_SEPARATOR: &str = "__";

/// Fallback when neither the settings nor `DOCKER_HOST` name a daemon.
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Upper bound the service places on a single `BatchWriteItem` call.
pub const MAX_BATCH_SIZE: usize = 25;

// ---------------------------------------------------------------------------
// Public settings types
// ---------------------------------------------------------------------------

/// Top-level settings for provisioning, connecting and seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub docker: DockerSettings,
    #[serde(default)]
    pub emulator: EmulatorSettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub loader: LoaderSettings,
}

/// `[docker]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerSettings {
    /// `unix:///path/to/docker.sock` or `tcp://host:port`. Empty defers to
    /// `DOCKER_HOST`.
    #[serde(default)]
    pub host: String,
}

/// `[emulator]` section: which image to run and how to publish its port.
#[derive(Debug, Clone, Deserialize)]
pub struct EmulatorSettings {
    #[serde(default = "default_repository")]
    pub repository: String,
    /// Floating on purpose: the emulator tracks a managed service, so tests
    /// should run against whatever is current.
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_container_port")]
    pub container_port: u16,
    #[serde(default = "default_host_ip")]
    pub host_ip: String,
}

fn default_repository() -> String { "amazon/dynamodb-local".to_string() }
fn default_tag() -> String { "latest".to_string() }
fn default_container_port() -> u16 { 8000 }
fn default_host_ip() -> String { "127.0.0.1".to_string() }

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            tag: default_tag(),
            container_port: default_container_port(),
            host_ip: default_host_ip(),
        }
    }
}

impl EmulatorSettings {
    /// Full image reference, `repository:tag`.
    pub fn image(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// Docker port key for the emulator's API, e.g. `8000/tcp`.
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }
}

/// `[client]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// The emulator ignores the region, but the client refuses to build
    /// without one.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String { "us-east-1".to_string() }

impl Default for ClientSettings {
    fn default() -> Self {
        Self { region: default_region() }
    }
}

/// `[retry]` section: backoff used while waiting for the emulator.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_interval_ms() -> u64 { 500 }
fn default_max_interval_ms() -> u64 { 5000 }
fn default_multiplier() -> f64 { 1.5 }
fn default_max_attempts() -> u32 { 20 }

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
            multiplier: self.multiplier,
            max_attempts: self.max_attempts,
        }
    }
}

/// `[loader]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    /// Attempts granted to each `CreateTable` call (the client default is 3).
    #[serde(default = "default_create_table_max_attempts")]
    pub create_table_max_attempts: u32,
    /// Rows per `BatchWriteItem` call, clamped to `1..=25`.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_create_table_max_attempts() -> u32 { 10 }
fn default_batch_size() -> usize { MAX_BATCH_SIZE }

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            create_table_max_attempts: default_create_table_max_attempts(),
            batch_size: default_batch_size(),
        }
    }
}

impl LoaderSettings {
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    /// Embedded defaults overlaid with `DYNAMOTEST__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::build(environment())
    }

    /// Like [`Settings::load`], but reads overrides from `vars` instead of the
    /// process environment. Keys use the same `DYNAMOTEST__SECTION__KEY` form.
    pub fn load_from(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        Self::build(environment().source(Some(vars)))
    }

    /// Return the built-in defaults without touching the environment.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_SETTINGS, config::FileFormat::Toml))
            .build()
            .expect("built-in default settings must be valid TOML")
            .try_deserialize()
            .expect("built-in default settings must deserialize correctly")
    }

    /// Docker daemon address: the configured host, else `DOCKER_HOST`, else
    /// the local Unix socket.
    pub fn docker_host(&self) -> String {
        if !self.docker.host.is_empty() {
            return self.docker.host.clone();
        }
        std::env::var("DOCKER_HOST")
            .ok()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_string())
    }

    fn build(env: config::Environment) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_SETTINGS, config::FileFormat::Toml))
            .add_source(env)
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
