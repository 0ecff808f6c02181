//! dynamotest-core — shared building blocks for dynamotest.
//!
//! This crate holds the pieces every other layer agrees on: the
//! [`SandboxHandle`] describing a running emulator container, the
//! [`Settings`](config::Settings) that drive provisioning and connection, and
//! the [`RetryPolicy`] used while waiting for the emulator to accept
//! connections.
//!
//! # Lifecycle
//!
//! ```text
//! Provisioner ──► Connection Establisher ──► Loader ──► tests
//!      │                                                  │
//!      └──────────────────── Disposal ◄───────────────────┘
//! ```

pub mod config;
pub mod retry;
pub mod types;

pub use config::Settings;
pub use retry::{retry, RetryError, RetryPolicy};
pub use types::{Endpoint, EndpointParseError, SandboxHandle};
