//! Conversion bookkeeping documents (status sheet, pivot sheet, iRule
//! discovery) and the generated Avi output.
//!
//! Both documents are opaque JSON payloads keyed by object type. The tracker
//! never looks inside a sub-object; it only checks the top-level keys and the
//! declared schema version.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Schema version written by this release.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// F5 object types allowed as keys of the status sheet.
pub const F5_OBJECT_TYPES: &[&str] = &[
    "profile",
    "monitor",
    "pool",
    "persistence",
    "policy",
    "virtual",
    "data-group",
    "virtual-address",
    "node",
];

/// Avi object types allowed as keys of the Avi output document.
pub const AVI_OBJECT_TYPES: &[&str] = &[
    "ApplicationProfile",
    "NetworkProfile",
    "SSLProfile",
    "PKIProfile",
    "SSLKeyAndCertificate",
    "ApplicationPersistenceProfile",
    "HealthMonitor",
    "IpAddrGroup",
    "StringGroup",
    "HTTPPolicySet",
    "VrfContext",
    "PoolGroup",
    "PriorityLabels",
    "Pool",
    "VirtualService",
    "VSDataScriptSet",
    "NetworkSecurityPolicy",
    "VsVip",
    "Tenant",
];

/// Conversion status of one run, as produced by the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStatusDocument {
    pub id: DbId,
    pub run_id: DbId,
    pub schema_version: i32,
    pub status_sheet: serde_json::Value,
    pub pivot_sheet: serde_json::Value,
    pub irule_discovery: serde_json::Value,
    pub created_at: Timestamp,
}

/// Generated Avi configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AviOutputDocument {
    pub id: DbId,
    pub run_id: DbId,
    pub schema_version: i32,
    pub body: serde_json::Value,
    pub created_at: Timestamp,
}

/// Payload of a conversion status document before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversionStatus {
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    #[serde(default = "empty_object")]
    pub status_sheet: serde_json::Value,
    #[serde(default = "empty_array")]
    pub pivot_sheet: serde_json::Value,
    #[serde(default = "empty_array")]
    pub irule_discovery: serde_json::Value,
}

/// Payload of an Avi output document before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAviOutput {
    #[serde(default = "default_schema_version")]
    pub schema_version: i32,
    pub body: serde_json::Value,
}

/// Body of `POST /generate-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateConfiguration {
    pub conversion_status: NewConversionStatus,
    pub avi_output: NewAviOutput,
}

/// Response of `POST /generate-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedConfiguration {
    pub conversion_status: ConversionStatusDocument,
    pub avi_output: AviOutputDocument,
}

fn default_schema_version() -> i32 {
    CURRENT_SCHEMA_VERSION
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

fn empty_array() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

fn validate_schema_version(version: i32) -> Result<(), CoreError> {
    if version < 1 || version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Validation(format!(
            "Unsupported schema version {version}; supported: 1..={CURRENT_SCHEMA_VERSION}"
        )));
    }
    Ok(())
}

/// Check that `value` is an object whose keys all appear in `allowed`.
fn validate_keyed_object(
    what: &str,
    value: &serde_json::Value,
    allowed: &[&str],
) -> Result<(), CoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::Validation(format!("{what} must be a JSON object")))?;
    if let Some(unknown) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(CoreError::Validation(format!(
            "{what} contains unknown object type '{unknown}'"
        )));
    }
    Ok(())
}

/// Validate a conversion status payload.
pub fn validate_conversion_status(doc: &NewConversionStatus) -> Result<(), CoreError> {
    validate_schema_version(doc.schema_version)?;
    validate_keyed_object("statusSheet", &doc.status_sheet, F5_OBJECT_TYPES)?;
    if !doc.pivot_sheet.is_array() {
        return Err(CoreError::Validation("pivotSheet must be a JSON array".to_string()));
    }
    if !doc.irule_discovery.is_array() {
        return Err(CoreError::Validation(
            "iruleDiscovery must be a JSON array".to_string(),
        ));
    }
    Ok(())
}

/// Validate an Avi output payload.
pub fn validate_avi_output(doc: &NewAviOutput) -> Result<(), CoreError> {
    validate_schema_version(doc.schema_version)?;
    validate_keyed_object("body", &doc.body, AVI_OBJECT_TYPES)
}
