//! Ansible playbooks generated from a run's Avi output.
//!
//! A playbook is a single play against the Avi controller with one task per
//! Avi object. Each task calls the `vmware.alb` module named after the object
//! type (`Pool` becomes `avi_pool`) with the object as its arguments, copied
//! unchanged. Controller credentials come from `module_defaults`, so objects
//! never carry them.
//!
//! Tasks are ordered so that referenced objects are created before the
//! objects referring to them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::conversion::AviOutputDocument;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of a playbook name.
pub const MAX_PLAYBOOK_NAME_LEN: usize = 128;

/// Avi object types in creation order.
pub const CREATION_ORDER: &[&str] = &[
    "Tenant",
    "VrfContext",
    "PKIProfile",
    "SSLKeyAndCertificate",
    "SSLProfile",
    "ApplicationProfile",
    "NetworkProfile",
    "ApplicationPersistenceProfile",
    "HealthMonitor",
    "IpAddrGroup",
    "StringGroup",
    "PriorityLabels",
    "Pool",
    "PoolGroup",
    "HTTPPolicySet",
    "VSDataScriptSet",
    "NetworkSecurityPolicy",
    "VsVip",
    "VirtualService",
];

/// A stored playbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    pub id: DbId,
    pub run_id: DbId,
    pub avi_output_id: DbId,
    pub name: String,
    pub task_count: i32,
    pub body: Value,
    pub created_at: Timestamp,
}

impl Playbook {
    /// Download file name: the playbook name restricted to `[A-Za-z0-9._-]`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{stem}.json")
    }
}

/// Listing entry; the body is only served by the download route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookSummary {
    pub id: DbId,
    pub run_id: DbId,
    pub avi_output_id: DbId,
    pub name: String,
    pub task_count: i32,
    pub created_at: Timestamp,
}

impl From<Playbook> for PlaybookSummary {
    fn from(p: Playbook) -> Self {
        Self {
            id: p.id,
            run_id: p.run_id,
            avi_output_id: p.avi_output_id,
            name: p.name,
            task_count: p.task_count,
            created_at: p.created_at,
        }
    }
}

/// A playbook before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlaybook {
    pub avi_output_id: DbId,
    pub name: String,
    pub task_count: i32,
    pub body: Value,
}

/// Body of `POST /playbook/generate-playbook`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlaybook {
    #[serde(default)]
    pub name: Option<String>,
}

impl GeneratePlaybook {
    /// The trimmed requested name, or `avi-migration-run-<run id>`.
    pub fn name_for(&self, run_id: DbId) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("avi-migration-run-{run_id}"))
    }
}

pub fn validate_playbook_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation("Playbook name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_PLAYBOOK_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Playbook name exceeds {MAX_PLAYBOOK_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Ansible module for an Avi object type.
fn module_for(object_type: &str) -> String {
    format!("avi_{}", object_type.to_ascii_lowercase())
}

/// Build the play for `avi_output`.
///
/// Every value in the document must be an array of objects; anything else
/// cannot become a task and is rejected.
pub fn build_playbook(name: &str, avi_output: &AviOutputDocument) -> Result<NewPlaybook, CoreError> {
    validate_playbook_name(name)?;
    let body = avi_output.body.as_object().ok_or_else(|| {
        CoreError::Validation("Avi output body must be a JSON object".to_string())
    })?;

    let mut tasks = Vec::new();
    for object_type in CREATION_ORDER {
        let Some(objects) = body.get(*object_type) else {
            continue;
        };
        let objects = objects.as_array().ok_or_else(|| {
            CoreError::Validation(format!("Avi output '{object_type}' must be an array"))
        })?;
        let module = module_for(object_type);
        for (index, object) in objects.iter().enumerate() {
            if !object.is_object() {
                return Err(CoreError::Validation(format!(
                    "Avi output '{object_type}' entry {index} is not an object"
                )));
            }
            let label = object
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{index}"));
            let mut task = Map::new();
            task.insert("name".to_string(), json!(format!("Create {object_type} {label}")));
            task.insert(module.clone(), object.clone());
            tasks.push(Value::Object(task));
        }
    }

    let task_count = i32::try_from(tasks.len())
        .map_err(|_| CoreError::Validation("Avi output has too many objects".to_string()))?;
    let play = json!([{
        "name": name,
        "hosts": "localhost",
        "connection": "local",
        "gather_facts": false,
        "collections": ["vmware.alb"],
        "module_defaults": {
            "group/vmware.alb.avi": { "avi_credentials": "{{ avi_credentials }}" }
        },
        "tasks": tasks,
    }]);

    Ok(NewPlaybook {
        avi_output_id: avi_output.id,
        name: name.to_string(),
        task_count,
        body: play,
    })
}
