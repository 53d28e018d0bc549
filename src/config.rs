//! The persisted GUI configuration record.
//!
//! Field names follow the `snake_case` Rust convention; the serde wire names
//! match the persisted camelCase keys (`address`, `useTLS`, `apiKey`, ...).

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::env::{Environment, ProcessEnv};
use crate::error::ConfigError;
use crate::resolver::EndpointResolver;

/// GUI/API endpoint configuration as persisted.
///
/// The `raw_*` fields hold the configured values before environment overrides
/// are applied; use [`GuiConfiguration::resolver`] to obtain the effective ones.
/// Missing fields deserialize to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuiConfiguration {
    /// Whether the GUI is enabled at all. Interpreted by the caller.
    pub enabled: bool,

    /// Configured `host:port`, or a socket path when it starts with `/`.
    #[serde(rename = "address")]
    pub raw_address: String,

    /// Octal permissions for the UNIX socket; empty means "leave as created".
    #[serde(rename = "unixSocketPermissions")]
    pub raw_unix_socket_permissions: String,

    /// Static credential user name.
    pub user: String,

    /// Static credential password.
    pub password: Secret,

    /// Credential validation strategy.
    pub auth_mode: AuthMode,

    /// Configured TLS flag, overridable by the address override scheme.
    #[serde(rename = "useTLS")]
    pub raw_use_tls: bool,

    /// Static API key; empty means no key configured.
    pub api_key: Secret,

    /// Passthrough security relaxation flag.
    pub insecure_admin_access: bool,

    /// Passthrough UI theme name.
    pub theme: String,

    /// Passthrough debugging flag.
    pub debugging: bool,

    /// Passthrough security relaxation flag.
    #[serde(rename = "insecureSkipHostcheck")]
    pub insecure_skip_host_check: bool,

    /// Passthrough security relaxation flag.
    pub insecure_allow_frame_loading: bool,
}

impl GuiConfiguration {
    /// Returns a resolver reading overrides from the live process environment.
    pub fn resolver(&self) -> EndpointResolver<'_, ProcessEnv> {
        EndpointResolver::new(self)
    }

    /// Returns a resolver reading overrides from `env`.
    pub fn resolver_with<E: Environment>(&self, env: E) -> EndpointResolver<'_, E> {
        EndpointResolver::with_env(self, env)
    }
}

/// How GUI credentials are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// No authentication mechanism selected.
    None,

    /// The static `user` / `password` pair.
    #[default]
    Static,

    /// Delegated to an LDAP server.
    Ldap,
}

impl AuthMode {
    /// Returns the persisted name of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Static => "static",
            Self::Ldap => "ldap",
        }
    }
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "static" => Ok(Self::Static),
            "ldap" => Ok(Self::Ldap),
            other => Err(ConfigError::UnknownAuthMode(other.to_owned())),
        }
    }
}

/// A credential string (password or API key).
///
/// An empty secret means "not configured".
///
/// This type is zeroized on drop.
#[derive(Clone, Default, Eq, PartialEq, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps `value` as a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether no secret is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("len", &self.0.len())
            .finish()
    }
}
