//! Interface name normalization.
//!
//! Playbook input accepts abbreviated interface names ("eth0", "po10");
//! the device works with canonical names ("Ethernet0", "PortChannel10").
//! Identity comparison between desired and observed config requires the
//! canonical form on both sides.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RestCfgError, RestCfgResult};

/// Canonical SONiC interface name prefixes.
const CANONICAL_PREFIXES: &[&str] = &[
    "Ethernet",
    "PortChannel",
    "Vlan",
    "Loopback",
    "Management",
];

static INTF_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z]+)\s*(\d\S*)\s*$").expect("valid interface regex"));

/// Canonicalizes an interface name.
///
/// The alphabetic prefix must unambiguously abbreviate one canonical
/// prefix (case-insensitive); the numeric suffix is kept as-is.
pub fn normalize_interface_name(name: &str) -> RestCfgResult<String> {
    let captures = INTF_NAME_RE.captures(name).ok_or_else(|| {
        RestCfgError::invalid_config("name", format!("'{}' is not an interface name", name))
    })?;
    let prefix = captures[1].to_ascii_lowercase();
    let suffix = &captures[2];

    let mut matches = CANONICAL_PREFIXES
        .iter()
        .filter(|canonical| canonical.to_ascii_lowercase().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(canonical), None) => Ok(format!("{}{}", canonical, suffix)),
        _ => Err(RestCfgError::invalid_config(
            "name",
            format!("'{}' does not identify a known interface type", name),
        )),
    }
}
