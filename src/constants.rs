//! Constants shared by the configuration record and the endpoint resolver.

/// Name of the environment variable that overrides the configured GUI address.
///
/// Accepts a bare `host:port`, a bare socket path, or a URI such as
/// `https://0.0.0.0:8384` or `unix:///run/gui.sock`.
pub const GUI_ADDRESS_ENV: &str = "STGUIADDRESS";

/// Name of the environment variable holding an additional accepted API key.
pub const GUI_API_KEY_ENV: &str = "STGUIAPIKEY";

/// IPv4 loopback host substituted for empty and `0.0.0.0` hosts in display URLs.
pub const IPV4_LOOPBACK: &str = "127.0.0.1";

/// IPv6 loopback host substituted for `[::]` in display URLs.
pub const IPV6_LOOPBACK: &str = "[::1]";

/// Mask applied to parsed Unix socket permissions (owner, group and other rwx bits).
pub const MODE_PERM: u32 = 0o777;
