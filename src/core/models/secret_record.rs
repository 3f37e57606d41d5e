use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind tag of the snapshot envelope.
pub const SNAPSHOT_KIND: &str = "SecretList";

/// Schema version of the snapshot envelope.
pub const SNAPSHOT_API_VERSION: &str = "v1";

/// Metadata fields that only make sense inside the originating cluster.
pub const EPHEMERAL_METADATA_FIELDS: &[&str] = &["resourceVersion", "uid"];

/// Identifying metadata of a secret.
///
/// Fields the backup does not interpret (creation timestamp, owner
/// references, managed fields, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A Kubernetes secret as returned by the API server.
///
/// `data` values are the base64 strings of the API representation and are
/// never decoded by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
}

impl SecretRecord {
    /// Display name, or `<unnamed>` when the API omitted it.
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Remove the fields listed in [`EPHEMERAL_METADATA_FIELDS`].
    ///
    /// Nothing else is touched. Both typed fields and any copy that ended up
    /// in `extra` are cleared.
    pub fn strip_ephemeral(&mut self) {
        self.metadata.resource_version = None;
        self.metadata.uid = None;
        for field in EPHEMERAL_METADATA_FIELDS {
            self.metadata.extra.remove(*field);
        }
    }
}

/// The document written to disk: a typed envelope around the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub api_version: String,
    pub kind: String,
    pub items: Vec<SecretRecord>,
}

impl SnapshotDocument {
    /// Wrap records in a `v1/SecretList` envelope, keeping their order.
    pub fn new(items: Vec<SecretRecord>) -> Self {
        Self {
            api_version: SNAPSHOT_API_VERSION.into(),
            kind: SNAPSHOT_KIND.into(),
            items,
        }
    }
}

/// Response body of `GET /api/v1/namespaces/{ns}/secrets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretListResponse {
    #[serde(default)]
    pub items: Vec<SecretRecord>,
}

/// Response body of `GET /api/v1/namespaces/{ns}/configmaps/{name}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigMapResponse {
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}
