//! Parsing of octal Unix socket permission strings.

use crate::constants::MODE_PERM;
use crate::error::ConfigError;

/// Parses `raw` as an unsigned 32-bit octal number.
///
/// Only the digits `0`-`7` are accepted: no sign, no `0o` prefix, no digit
/// separators and no surrounding whitespace. The result is **not** masked; use
/// [`permission_bits`] to keep only the permission bits.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPermissions`] if `raw` is empty, contains a
/// non-octal character, or does not fit in 32 bits.
pub fn parse_octal_mode(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidPermissions(raw.to_owned());

    // `from_str_radix` tolerates a leading '+', so the digit check has to come first.
    if raw.is_empty() || !raw.bytes().all(|b| matches!(b, b'0'..=b'7')) {
        return Err(invalid());
    }

    u32::from_str_radix(raw, 8).map_err(|_| invalid())
}

/// Keeps only the owner, group and other permission bits of `mode`.
pub const fn permission_bits(mode: u32) -> u32 {
    mode & MODE_PERM
}
