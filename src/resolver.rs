//! Effective GUI endpoint values derived from a [`GuiConfiguration`] and the
//! environment.
//!
//! Every operation reads the record and, where relevant, the
//! [`GUI_ADDRESS_ENV`] / [`GUI_API_KEY_ENV`] variables at call time. Nothing
//! is cached and nothing fails: malformed input degrades to a documented
//! fallback so the caller's listener or socket setup can report the real
//! problem.

use crate::config::{AuthMode, GuiConfiguration};
use crate::constants::{GUI_ADDRESS_ENV, GUI_API_KEY_ENV};
use crate::endpoint::{
    escape_host, loopback_display_host, tls_from_scheme_prefix, Network, OverrideUri,
};
use crate::env::{Environment, ProcessEnv};
use crate::observability::{log_debug, log_warn};
use crate::permissions::{parse_octal_mode, permission_bits};

/// Resolves the effective GUI endpoint from a configuration record layered
/// under environment overrides.
///
/// The resolver borrows the record and never mutates it. The environment is
/// consulted on every call, so results follow changes to it.
#[derive(Debug, Clone, Copy)]
pub struct EndpointResolver<'a, E = ProcessEnv> {
    config: &'a GuiConfiguration,
    env: E,
}

impl<'a> EndpointResolver<'a, ProcessEnv> {
    /// Creates a resolver reading overrides from the live process environment.
    pub fn new(config: &'a GuiConfiguration) -> Self {
        Self::with_env(config, ProcessEnv)
    }
}

impl<'a, E: Environment> EndpointResolver<'a, E> {
    /// Creates a resolver reading overrides from `env`.
    pub fn with_env(config: &'a GuiConfiguration, env: E) -> Self {
        Self { config, env }
    }

    /// The underlying configuration record.
    pub fn config(&self) -> &'a GuiConfiguration {
        self.config
    }

    fn address_override(&self) -> Option<String> {
        self.env.non_empty_var(GUI_ADDRESS_ENV)
    }

    /// Whether the GUI address is overridden by the environment.
    pub fn is_overridden(&self) -> bool {
        self.address_override().is_some()
    }

    /// Address to listen on: a `host:port` or a socket path.
    ///
    /// A URI-form override contributes its decoded path for `unix*` schemes
    /// and its `host:port` otherwise, which is empty for a scheme-less path
    /// such as `/tmp/gui.sock`. An override that fails to parse as a URI is
    /// returned verbatim.
    pub fn address(&self) -> String {
        let Some(address) = self.address_override() else {
            return self.config.raw_address.clone();
        };

        if !address.contains('/') {
            return address;
        }

        match OverrideUri::parse(&address) {
            Ok(uri) if uri.is_unix() => uri.path().to_owned(),
            Ok(uri) => uri.host().to_owned(),
            Err(err) => {
                log_debug!("Using {GUI_ADDRESS_ENV} value {address:?} as is: {err}");
                address
            }
        }
    }

    /// Transport family of [`address`](Self::address).
    ///
    /// Only a URI-form override with a `unix*` scheme or a configured address
    /// starting with `/` selects [`Network::Unix`]. A bare override never does,
    /// even when it names a socket path, and a scheme-less path override
    /// leaves the choice to the configured address.
    pub fn network(&self) -> Network {
        if let Some(address) = self.address_override().filter(|a| a.contains('/')) {
            match OverrideUri::parse(&address) {
                Ok(uri) if uri.is_unix() => return Network::Unix,
                Ok(_) => {}
                Err(err) => {
                    log_debug!("Assuming tcp for {GUI_ADDRESS_ENV} value {address:?}: {err}");
                    return Network::Tcp;
                }
            }
        }

        if self.config.raw_address.starts_with('/') {
            Network::Unix
        } else {
            Network::Tcp
        }
    }

    /// Whether the GUI is served over TLS.
    ///
    /// An override starting with `http` or `unix` decides on its own
    /// (`https:` / `unixs:` enable TLS); otherwise the configured flag applies.
    pub fn use_tls(&self) -> bool {
        self.address_override()
            .and_then(|address| tls_from_scheme_prefix(&address))
            .unwrap_or(self.config.raw_use_tls)
    }

    /// Permission bits to apply to the UNIX socket, `0` meaning "leave as created".
    pub fn unix_socket_permissions(&self) -> u32 {
        let raw = &self.config.raw_unix_socket_permissions;
        match parse_octal_mode(raw) {
            Ok(mode) => permission_bits(mode),
            Err(err) => {
                if !raw.is_empty() {
                    log_warn!("Ignoring unix socket permissions: {err}");
                }
                0
            }
        }
    }

    /// URL a user should open to reach the GUI.
    ///
    /// A configured socket path yields `unix://<path>` regardless of any
    /// override. Otherwise bind-all hosts are replaced with loopback and the
    /// host is percent-escaped.
    pub fn url(&self) -> String {
        if self.config.raw_address.starts_with('/') {
            return format!("unix://{}", self.config.raw_address);
        }

        let scheme = if self.use_tls() { "https" } else { "http" };
        let host = escape_host(&loopback_display_host(&self.address()));

        format!("{scheme}://{host}/")
    }

    /// Whether some authentication mechanism is configured: LDAP, or a
    /// complete static user/password pair.
    pub fn is_auth_enabled(&self) -> bool {
        self.config.auth_mode == AuthMode::Ldap
            || (!self.config.user.is_empty() && !self.config.password.is_empty())
    }

    /// Whether `api_key` matches the configured key or the environment's key.
    ///
    /// The empty string is never a valid key.
    pub fn is_valid_api_key(&self, api_key: &str) -> bool {
        if api_key.is_empty() {
            return false;
        }

        api_key == self.config.api_key.expose()
            || self
                .env
                .var(GUI_API_KEY_ENV)
                .is_some_and(|env_key| env_key == api_key)
    }

    /// Returns an independent copy of the configuration record.
    pub fn copy(&self) -> GuiConfiguration {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointResolver;
    use crate::config::{AuthMode, GuiConfiguration, Secret};
    use crate::constants::{GUI_ADDRESS_ENV, GUI_API_KEY_ENV};
    use crate::endpoint::Network;
    use std::collections::BTreeMap;

    fn config(raw_address: &str) -> GuiConfiguration {
        GuiConfiguration {
            enabled: true,
            raw_address: raw_address.to_owned(),
            ..Default::default()
        }
    }

    fn env(vars: &[(&str, &str)]) -> BTreeMap<String, String> {
        vars.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn with_override(value: &str) -> BTreeMap<String, String> {
        env(&[(GUI_ADDRESS_ENV, value)])
    }

    #[test]
    fn address_without_override_is_raw_address() {
        let cfg = config("127.0.0.1:8384");
        let resolver = EndpointResolver::with_env(&cfg, env(&[]));

        assert!(!resolver.is_overridden());
        assert_eq!(resolver.address(), "127.0.0.1:8384");
    }

    #[test]
    fn empty_override_is_ignored() {
        let cfg = config("127.0.0.1:8384");
        let resolver = EndpointResolver::with_env(&cfg, with_override(""));

        assert!(!resolver.is_overridden());
        assert_eq!(resolver.address(), "127.0.0.1:8384");
        assert_eq!(resolver.network(), Network::Tcp);
    }

    macro_rules! override_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (raw_address, address_override, expected_address, expected_network) = $value;

                    let cfg = config(raw_address);
                    let resolver = EndpointResolver::with_env(&cfg, with_override(address_override));

                    assert!(resolver.is_overridden());
                    assert_eq!(resolver.address(), expected_address);
                    assert_eq!(resolver.network(), expected_network);
                }
            )*
        }
    }

    override_tests! {
        override_bare_address: ("127.0.0.1:8384", "0.0.0.0:9090", "0.0.0.0:9090", Network::Tcp),
        override_https_uri: ("127.0.0.1:8384", "https://203.0.113.5:9090", "203.0.113.5:9090", Network::Tcp),
        override_http_uri_with_path: ("127.0.0.1:8384", "http://[::]:8384/gui", "[::]:8384", Network::Tcp),
        override_http_uri_empty_host: ("127.0.0.1:8384", "http://:8384", ":8384", Network::Tcp),
        override_unix_uri: ("127.0.0.1:8384", "unix:///tmp/sock", "/tmp/sock", Network::Unix),
        override_unixs_uri: ("127.0.0.1:8384", "unixs:///tmp/sock", "/tmp/sock", Network::Unix),
        override_unparsable_uri: ("127.0.0.1:8384", "http://127.0.0.1:port/", "http://127.0.0.1:port/", Network::Tcp),
        override_relative_path_keeps_unix_raw_network: ("/run/gui.sock", "/tmp/other.sock", "", Network::Unix),
        override_relative_path_keeps_tcp_raw_network: ("127.0.0.1:8384", "/tmp/other.sock", "", Network::Tcp),
        override_network_path_reference: ("127.0.0.1:8384", "//0.0.0.0:9090", "0.0.0.0:9090", Network::Tcp),
        override_port_out_of_range: ("127.0.0.1:8384", "http://0.0.0.0:70000", "0.0.0.0:70000", Network::Tcp),
        override_ipv4_octet_out_of_range: ("127.0.0.1:8384", "http://1.2.3.256:8384", "1.2.3.256:8384", Network::Tcp),
        override_empty_host_non_numeric_port: ("127.0.0.1:8384", "http://:notaport", "http://:notaport", Network::Tcp),
        override_colon_in_first_segment: ("/run/gui.sock", "0.0.0.0:8384/gui", "0.0.0.0:8384/gui", Network::Tcp),
        override_unix_uri_escaped_path: ("127.0.0.1:8384", "unix:///tmp/my%20gui.sock", "/tmp/my gui.sock", Network::Unix),
        override_unix_uri_bad_escape: ("127.0.0.1:8384", "unix:///tmp/%zz", "unix:///tmp/%zz", Network::Tcp),
        override_http_uri_keeps_unix_raw_network: ("/run/gui.sock", "http://127.0.0.1:8384", "127.0.0.1:8384", Network::Unix),
        // A bare override never switches to unix, even when it is a socket name.
        override_bare_socket_name_stays_tcp: ("127.0.0.1:8384", "gui.sock", "gui.sock", Network::Tcp),
        // ...and never switches away from it either.
        override_bare_address_keeps_unix_raw_network: ("/run/gui.sock", "0.0.0.0:8384", "0.0.0.0:8384", Network::Unix),
    }

    #[test]
    fn network_from_raw_address() {
        let unix = config("/var/run/x.sock");
        let tcp = config("127.0.0.1:8384");

        assert_eq!(EndpointResolver::with_env(&unix, env(&[])).network(), Network::Unix);
        assert_eq!(EndpointResolver::with_env(&tcp, env(&[])).network(), Network::Tcp);
    }

    macro_rules! use_tls_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (raw_use_tls, address_override, expected) = $value;

                    let cfg = GuiConfiguration { raw_use_tls, ..config("127.0.0.1:8384") };
                    let resolver = EndpointResolver::with_env(&cfg, with_override(address_override));

                    assert_eq!(resolver.use_tls(), expected);
                }
            )*
        }
    }

    use_tls_tests! {
        use_tls_https_override: (false, "https://x", true),
        use_tls_http_override: (true, "http://x", false),
        use_tls_unixs_override: (false, "unixs:///tmp/sock", true),
        use_tls_unix_override: (true, "unix:///tmp/sock", false),
        use_tls_bare_override_keeps_raw_true: (true, "0.0.0.0:8384", true),
        use_tls_bare_override_keeps_raw_false: (false, "0.0.0.0:8384", false),
        use_tls_no_override_raw_true: (true, "", true),
        use_tls_no_override_raw_false: (false, "", false),
    }

    macro_rules! url_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (raw_address, raw_use_tls, address_override, expected) = $value;

                    let cfg = GuiConfiguration { raw_use_tls, ..config(raw_address) };
                    let resolver = EndpointResolver::with_env(&cfg, with_override(address_override));

                    assert_eq!(resolver.url(), expected);
                }
            )*
        }
    }

    url_tests! {
        url_empty_host: (":8384", false, "", "http://127.0.0.1:8384/"),
        url_ipv4_bind_all: ("0.0.0.0:8384", false, "", "http://127.0.0.1:8384/"),
        url_ipv6_bind_all: ("[::]:8384", false, "", "http://[::1]:8384/"),
        url_specific_host: ("192.0.2.7:8384", true, "", "https://192.0.2.7:8384/"),
        url_https_override: ("127.0.0.1:8384", false, "https://0.0.0.0:9090", "https://127.0.0.1:9090/"),
        url_http_override_empty_host: ("127.0.0.1:8384", true, "http://:8384", "http://127.0.0.1:8384/"),
        url_port_out_of_range_override: ("127.0.0.1:8384", false, "http://0.0.0.0:70000", "http://127.0.0.1:70000/"),
        url_unparsable_override_is_escaped: ("127.0.0.1:8384", false, "http://:notaport", "http://http:%2F%2F:notaport/"),
        url_unix_raw_address: ("/run/gui.sock", false, "", "unix:///run/gui.sock"),
        url_unix_raw_address_ignores_override: ("/run/gui.sock", true, "https://0.0.0.0:9090", "unix:///run/gui.sock"),
    }

    #[test]
    fn unix_socket_permissions() {
        let mut cfg = config("/run/gui.sock");

        cfg.raw_unix_socket_permissions = "755".to_owned();
        assert_eq!(EndpointResolver::with_env(&cfg, env(&[])).unix_socket_permissions(), 0o755);

        cfg.raw_unix_socket_permissions = "0100660".to_owned();
        assert_eq!(EndpointResolver::with_env(&cfg, env(&[])).unix_socket_permissions(), 0o660);

        for invalid in ["", "bogus", "999", "-1", "77777777777777"] {
            cfg.raw_unix_socket_permissions = invalid.to_owned();
            assert_eq!(
                EndpointResolver::with_env(&cfg, env(&[])).unix_socket_permissions(),
                0,
                "{invalid:?}"
            );
        }
    }

    #[test]
    fn auth_enabled() {
        let with = |auth_mode, user: &str, password: &str| GuiConfiguration {
            auth_mode,
            user: user.to_owned(),
            password: Secret::from(password),
            ..Default::default()
        };
        let enabled = |cfg: &GuiConfiguration| EndpointResolver::with_env(cfg, env(&[])).is_auth_enabled();

        assert!(enabled(&with(AuthMode::Ldap, "", "")));
        assert!(enabled(&with(AuthMode::Static, "admin", "secret")));
        assert!(enabled(&with(AuthMode::None, "admin", "secret")));
        assert!(!enabled(&with(AuthMode::None, "admin", "")));
        assert!(!enabled(&with(AuthMode::None, "", "secret")));
        assert!(!enabled(&with(AuthMode::Static, "", "")));
    }

    #[test]
    fn api_key_validation() {
        let cfg = GuiConfiguration {
            api_key: Secret::from("configured"),
            ..Default::default()
        };
        let resolver = EndpointResolver::with_env(&cfg, env(&[(GUI_API_KEY_ENV, "from-env")]));

        assert!(resolver.is_valid_api_key("configured"));
        assert!(resolver.is_valid_api_key("from-env"));
        assert!(!resolver.is_valid_api_key("other"));
        assert!(!resolver.is_valid_api_key(""));
    }

    #[test]
    fn empty_api_key_is_never_valid() {
        let cfg = GuiConfiguration::default();

        for vars in [&[][..], &[(GUI_API_KEY_ENV, "")][..]] {
            let resolver = EndpointResolver::with_env(&cfg, env(vars));
            assert!(!resolver.is_valid_api_key(""));
            assert!(!resolver.is_valid_api_key("anything"));
        }
    }

    #[test]
    fn copy_is_independent_of_record() {
        let cfg = config("127.0.0.1:8384");
        let resolver = EndpointResolver::with_env(&cfg, env(&[]));

        let mut copy = resolver.copy();
        assert_eq!(copy, cfg);

        copy.raw_address = "/tmp/other.sock".to_owned();
        assert_eq!(resolver.address(), "127.0.0.1:8384");
    }

    #[test]
    fn operations_are_idempotent() {
        let cfg = GuiConfiguration {
            raw_unix_socket_permissions: "770".to_owned(),
            api_key: Secret::from("k"),
            ..config("0.0.0.0:8384")
        };
        let resolver = EndpointResolver::with_env(&cfg, with_override("https://[::]:9090"));

        let first = (
            resolver.address(),
            resolver.network(),
            resolver.use_tls(),
            resolver.url(),
            resolver.unix_socket_permissions(),
            resolver.is_valid_api_key("k"),
        );
        for _ in 0..3 {
            let again = (
                resolver.address(),
                resolver.network(),
                resolver.use_tls(),
                resolver.url(),
                resolver.unix_socket_permissions(),
                resolver.is_valid_api_key("k"),
            );
            assert_eq!(again, first);
        }
        assert_eq!(first.3, "https://[::1]:9090/");
    }
}
