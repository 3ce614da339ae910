//! Live pull of virtual servers from an F5 BIG-IP lab controller.
//!
//! Talks to the iControl REST endpoint `GET /mgmt/tm/ltm/virtual` with basic
//! auth using [`reqwest`]. The handler layer only sees [`ControllerClient`],
//! so tests substitute a scripted implementation.

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::time::Duration;

use albmig_core::error::CoreError;
use albmig_core::migration::DiscoveredVirtualService;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ControllerConfig;

/// Where and as whom to connect.
#[derive(Clone)]
pub struct ControllerTarget {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ControllerTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerTarget")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors from the live controller layer.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The controller rejected the credentials (401/403).
    #[error("Controller rejected credentials for {host}")]
    Unauthorized { host: String },

    /// Transport failure (DNS, TLS, timeout, connection refused).
    #[error("Controller request to {host} failed: {source}")]
    Request {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// The controller answered with a non-2xx status.
    #[error("Controller {host} returned {status}: {body}")]
    Status { host: String, status: u16, body: String },
}

impl From<ControllerError> for CoreError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Unauthorized { .. } => CoreError::Unauthorized(err.to_string()),
            other => CoreError::ControllerUnreachable(other.to_string()),
        }
    }
}

/// Source of live virtual service inventories.
#[async_trait]
pub trait ControllerClient: Send + Sync {
    async fn list_virtual_services(
        &self,
        target: &ControllerTarget,
    ) -> Result<Vec<DiscoveredVirtualService>, ControllerError>;
}

/// Resolves a credentials reference to a password.
pub trait SecretSource: Send + Sync {
    fn secret(&self, reference: &str) -> Option<String>;
}

/// Reads secrets from environment variables named by the reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn secret(&self, reference: &str) -> Option<String> {
        std::env::var(reference).ok().filter(|v| !v.is_empty())
    }
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, reference: &str) -> Option<String> {
        self.get(reference).cloned()
    }
}

// ---------------------------------------------------------------------------
// iControl REST client
// ---------------------------------------------------------------------------

/// Path of the virtual server collection on a BIG-IP, with profiles inlined.
const VIRTUAL_COLLECTION_PATH: &str = "/mgmt/tm/ltm/virtual?expandSubcollections=true";

/// Subset of an iControl REST virtual server we care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct F5Virtual {
    name: String,
    full_path: Option<String>,
    partition: Option<String>,
    #[serde(default)]
    ip_forward: bool,
    #[serde(default)]
    l2_forward: bool,
    #[serde(default)]
    reject: bool,
    #[serde(default)]
    stateless: bool,
    #[serde(default)]
    internal: bool,
    profiles_reference: Option<F5ProfilesReference>,
}

#[derive(Debug, Deserialize)]
struct F5ProfilesReference {
    #[serde(default)]
    items: Vec<F5Profile>,
}

#[derive(Debug, Deserialize)]
struct F5Profile {
    name: String,
}

#[derive(Debug, Deserialize)]
struct F5VirtualCollection {
    #[serde(default)]
    items: Vec<F5Virtual>,
}

impl F5Virtual {
    fn has_profile(&self, name: &str) -> bool {
        self.profiles_reference
            .as_ref()
            .is_some_and(|profiles| profiles.items.iter().any(|p| p.name == name))
    }

    /// The BIG-IP virtual server type: the flag fields decide first, then the
    /// attached fastL4 / fastHTTP profile.
    fn vs_type(&self) -> &'static str {
        if self.ip_forward {
            "forwarding-ip"
        } else if self.l2_forward {
            "forwarding-l2"
        } else if self.reject {
            "reject"
        } else if self.stateless {
            "stateless"
        } else if self.internal {
            "internal"
        } else if self.has_profile("fastL4") {
            "performance-l4"
        } else if self.has_profile("fasthttp") {
            "performance-http"
        } else {
            "standard"
        }
    }

    fn into_discovered(self) -> DiscoveredVirtualService {
        let vs_type = Some(self.vs_type().to_string());
        let f5_ref = self.full_path.unwrap_or_else(|| {
            let partition = self.partition.as_deref().unwrap_or("Common");
            format!("/{partition}/{}", self.name)
        });
        DiscoveredVirtualService {
            name: self.name,
            f5_ref,
            vs_type,
        }
    }
}

/// [`ControllerClient`] over HTTPS to a BIG-IP.
pub struct HttpControllerClient {
    client: reqwest::Client,
}

impl HttpControllerClient {
    /// Build a client from configuration.
    pub fn new(config: &ControllerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }

    /// Bare IPv6 literals are bracketed; an explicit scheme is kept as given.
    fn collection_url(host: &str) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{VIRTUAL_COLLECTION_PATH}", host.trim_end_matches('/'))
        } else if host.parse::<Ipv6Addr>().is_ok() {
            format!("https://[{host}]{VIRTUAL_COLLECTION_PATH}")
        } else {
            format!("https://{host}{VIRTUAL_COLLECTION_PATH}")
        }
    }
}

#[async_trait]
impl ControllerClient for HttpControllerClient {
    async fn list_virtual_services(
        &self,
        target: &ControllerTarget,
    ) -> Result<Vec<DiscoveredVirtualService>, ControllerError> {
        let url = Self::collection_url(&target.host);
        tracing::debug!(host = %target.host, %url, "Fetching virtual servers from controller");

        let response = self
            .client
            .get(&url)
            .basic_auth(&target.username, Some(&target.password))
            .send()
            .await
            .map_err(|source| ControllerError::Request {
                host: target.host.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ControllerError::Unauthorized {
                host: target.host.clone(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ControllerError::Status {
                host: target.host.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let collection: F5VirtualCollection =
            response
                .json()
                .await
                .map_err(|source| ControllerError::Request {
                    host: target.host.clone(),
                    source,
                })?;

        Ok(collection
            .items
            .into_iter()
            .map(F5Virtual::into_discovered)
            .collect())
    }
}
