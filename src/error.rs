//! Error types for strict parsing of configuration values.
//!
//! The resolver itself never fails; these errors surface only from the
//! strict entry points (`AuthMode::from_str`, [`parse_octal_mode`]).
//!
//! [`parse_octal_mode`]: crate::permissions::parse_octal_mode

use thiserror::Error;

/// An error that arises parsing a GUI configuration value.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum ConfigError {
    /// The auth mode name is not one of `none`, `static` or `ldap`.
    #[error("unknown auth mode {0:?}, expected one of: none, static, ldap")]
    UnknownAuthMode(String),

    /// The Unix socket permissions are not a 32-bit octal number.
    #[error("unix socket permissions {0:?} are not a valid octal mode")]
    InvalidPermissions(String),
}
