#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! This crate resolves the effective listen address, transport, TLS flag and
//! display URL of a local GUI/REST endpoint, and answers whether a presented
//! API key is accepted.
//!
//! Values come from a persisted [`GuiConfiguration`] layered under two
//! environment overrides:
//!
//! - `STGUIADDRESS` replaces the configured address. It may be a bare
//!   `host:port`, or a URI such as `https://0.0.0.0:8384` or
//!   `unix:///run/gui.sock`, in which case the scheme also selects TLS and the
//!   transport.
//! - `STGUIAPIKEY` is accepted as an API key in addition to the configured one.
//!
//! ```
//! use gui_endpoint::{GuiConfiguration, Network};
//! use std::collections::BTreeMap;
//!
//! let config = GuiConfiguration {
//!     raw_address: "0.0.0.0:8384".to_owned(),
//!     ..Default::default()
//! };
//!
//! // Pin the environment instead of reading the process environment.
//! let env = BTreeMap::from([("STGUIADDRESS".to_owned(), "https://[::]:9090".to_owned())]);
//! let resolver = config.resolver_with(env);
//!
//! assert_eq!(resolver.address(), "[::]:9090");
//! assert_eq!(resolver.network(), Network::Tcp);
//! assert!(resolver.use_tls());
//! assert_eq!(resolver.url(), "https://[::1]:9090/");
//! ```
//!
//! [`GuiConfiguration::resolver`] reads the live process environment on every
//! call instead.
//!
//! ## Features
//!
//! - **`logging`** (default): report fallbacks through the `log` crate
//! - **`tracing`**: report fallbacks as `tracing` events instead

pub mod config;
pub mod constants;
pub mod endpoint;
pub mod env;
pub mod error;
pub(crate) mod observability;
pub mod permissions;
pub mod resolver;

// -----------------------
// Re-exports
// -----------------------

pub use crate::{
    config::{AuthMode, GuiConfiguration, Secret},
    endpoint::{EndpointError, Network, OverrideUri},
    env::{Environment, ProcessEnv},
    error::ConfigError,
    resolver::EndpointResolver,
};
