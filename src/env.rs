//! Environment snapshots consulted by the endpoint resolver.
//!
//! The resolver never touches process-wide state directly: it asks an
//! [`Environment`] for each variable on every call. [`ProcessEnv`] forwards to
//! the real process environment, while the map implementations let callers
//! pin a fixed snapshot.

use std::collections::{BTreeMap, HashMap};

/// Read-only view of environment variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` if it is not set.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` if it is set to a non-empty string.
    fn non_empty_var(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }
}

/// The live process environment.
///
/// Values are read on every call; non-UTF-8 values are reported as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<S: std::hash::BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
