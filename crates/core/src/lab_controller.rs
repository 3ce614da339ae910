//! Lab controller connection details and their validation.
//!
//! Only the shape of the input is checked here. Whether the host is reachable
//! is discovered by the live fetch, never on save.

use std::net::{IpAddr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum length of a DNS host name.
pub const MAX_HOST_LEN: usize = 253;

/// The single configured lab controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabControllerDetails {
    pub host: String,
    pub username: String,
    /// Name of the server-side secret holding the password.
    pub credentials_ref: String,
    pub last_fetched_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Body of `POST /lab-controller`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLabControllerDetails {
    pub host: String,
    pub username: String,
    pub credentials_ref: String,
}

impl SetLabControllerDetails {
    /// Trim surrounding whitespace from every field.
    pub fn normalized(&self) -> Self {
        Self {
            host: self.host.trim().to_string(),
            username: self.username.trim().to_string(),
            credentials_ref: self.credentials_ref.trim().to_string(),
        }
    }
}

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("valid regex")
});

/// Environment-variable style secret names.
static CREDENTIALS_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Validate a controller host: an IP address, a bracketed IPv6 address, or a
/// DNS name. IPv4, bracketed IPv6 and names may carry a `:port` suffix.
pub fn validate_host(host: &str) -> Result<(), CoreError> {
    if host.is_empty() {
        return Err(CoreError::Validation("Controller host must not be empty".to_string()));
    }
    if host.len() > MAX_HOST_LEN {
        return Err(CoreError::Validation(format!(
            "Controller host exceeds {MAX_HOST_LEN} characters"
        )));
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if let Some(rest) = host.strip_prefix('[') {
        return validate_bracketed_v6(host, rest);
    }

    let name = match host.rsplit_once(':') {
        Some((name, port)) => {
            if port.parse::<u16>().is_err() {
                return Err(CoreError::Validation(format!(
                    "Controller host '{host}' has an invalid port"
                )));
            }
            name
        }
        None => host,
    };

    if name.parse::<IpAddr>().is_ok() || HOSTNAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Controller host '{host}' is not a valid IP address or host name"
        )))
    }
}

/// `[v6]` or `[v6]:port`; `rest` is everything after the opening bracket.
fn validate_bracketed_v6(host: &str, rest: &str) -> Result<(), CoreError> {
    let invalid = || {
        CoreError::Validation(format!(
            "Controller host '{host}' is not a valid bracketed IPv6 address"
        ))
    };
    let (addr, tail) = rest.split_once(']').ok_or_else(invalid)?;
    addr.parse::<Ipv6Addr>().map_err(|_| invalid())?;
    match tail.strip_prefix(':') {
        None if tail.is_empty() => Ok(()),
        Some(port) if port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "Controller host '{host}' has an invalid port"
        ))),
    }
}

/// Validate a full set-details request (after [`SetLabControllerDetails::normalized`]).
pub fn validate_details(input: &SetLabControllerDetails) -> Result<(), CoreError> {
    validate_host(&input.host)?;
    if input.username.is_empty() {
        return Err(CoreError::Validation(
            "Controller username must not be empty".to_string(),
        ));
    }
    if !CREDENTIALS_REF_RE.is_match(&input.credentials_ref) {
        return Err(CoreError::Validation(format!(
            "Credentials reference '{}' must be an environment-style name (letters, digits, underscore)",
            input.credentials_ref
        )));
    }
    Ok(())
}
