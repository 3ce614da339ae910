//! Discovery import and the virtual service breakdown report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::migration::{DiscoveredVirtualService, MigrationRun, VirtualServiceMigration};
use crate::types::{DbId, Timestamp};

/// Bucket used for virtual services without a known F5 type.
pub const UNKNOWN_VS_TYPE: &str = "unknown";

/// File name of the raw discovery download.
pub const DISCOVERY_EXPORT_FILE_NAME: &str = "bigip_discovery_data.json";

/// Body of `POST /discovery/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryImport {
    pub label: String,
    pub virtual_services: Vec<DiscoveredVirtualService>,
}

/// Response of `POST /discovery/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRun {
    pub run: MigrationRun,
    pub imported_count: usize,
}

/// Virtual service counts per F5 type for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub run_id: Option<DbId>,
    pub total: i64,
    pub types: BTreeMap<String, i64>,
}

impl DiscoveryReport {
    /// Build the report from every virtual service of a run.
    pub fn from_run(run_id: Option<DbId>, services: &[VirtualServiceMigration]) -> Self {
        let mut types = BTreeMap::new();
        for vs in services {
            let key = vs
                .vs_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(UNKNOWN_VS_TYPE);
            *types.entry(key.to_string()).or_insert(0) += 1;
        }
        Self {
            run_id,
            total: services.len() as i64,
            types,
        }
    }
}

/// Raw discovery data of one run, served as a file download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryExport {
    pub run: MigrationRun,
    pub exported_at: Timestamp,
    pub virtual_services: Vec<VirtualServiceMigration>,
}
