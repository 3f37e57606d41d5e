use tracing::info;

use crate::core::errors::{BackupError, Result};
use crate::core::traits::cluster::ClusterApi;

/// Namespace of the ConfigMap holding the cluster identity.
pub const CLUSTER_INFO_NAMESPACE: &str = "kube-system";

/// Name of the ConfigMap holding the cluster identity.
pub const CLUSTER_INFO_CONFIG_MAP: &str = "cluster-info";

/// Data field carrying the cluster name.
pub const CLUSTER_NAME_FIELD: &str = "cluster-name";

/// Resolves the human-readable name of the cluster being backed up.
pub struct IdentityService<'a, A: ClusterApi> {
    pub cluster: &'a A,
}

impl<'a, A: ClusterApi> IdentityService<'a, A> {
    pub fn new(cluster: &'a A) -> Self {
        Self { cluster }
    }

    /// Read `cluster-name` from `kube-system/cluster-info`.
    ///
    /// One lookup, no retry. A missing ConfigMap or a failed request is
    /// `IdentityUnavailable`; a ConfigMap without the field is
    /// `IdentityMalformed`.
    pub fn resolve_cluster_name(&self) -> Result<String> {
        let record = format!("{CLUSTER_INFO_NAMESPACE}/{CLUSTER_INFO_CONFIG_MAP}");

        let data = self
            .cluster
            .config_map_data(CLUSTER_INFO_NAMESPACE, CLUSTER_INFO_CONFIG_MAP)
            .map_err(|e| BackupError::IdentityUnavailable {
                detail: format!("reading ConfigMap {record}: {e}"),
            })?
            .ok_or_else(|| BackupError::IdentityUnavailable {
                detail: format!("ConfigMap {record} not found"),
            })?;

        let name = data
            .get(CLUSTER_NAME_FIELD)
            .cloned()
            .ok_or_else(|| BackupError::IdentityMalformed {
                record,
                field: CLUSTER_NAME_FIELD.into(),
            })?;

        info!(cluster = %name, "resolved cluster name");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::fakes::FakeCluster;

    #[test]
    fn returns_cluster_name_field() {
        let cluster = FakeCluster::with_cluster_name("eu-cluster");
        let name = IdentityService::new(&cluster).resolve_cluster_name().unwrap();
        assert_eq!(name, "eu-cluster");
    }

    #[test]
    fn missing_config_map_is_unavailable() {
        let cluster = FakeCluster::default();
        let err = IdentityService::new(&cluster)
            .resolve_cluster_name()
            .unwrap_err();
        assert!(matches!(err, BackupError::IdentityUnavailable { .. }));
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut cluster = FakeCluster::default();
        cluster.cluster_info = Some([("other".to_string(), "x".to_string())].into());

        let err = IdentityService::new(&cluster)
            .resolve_cluster_name()
            .unwrap_err();
        match err {
            BackupError::IdentityMalformed { field, record } => {
                assert_eq!(field, "cluster-name");
                assert_eq!(record, "kube-system/cluster-info");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn api_failure_is_unavailable() {
        let mut cluster = FakeCluster::with_cluster_name("eu-cluster");
        cluster.fail_with = Some("connection refused".into());

        let err = IdentityService::new(&cluster)
            .resolve_cluster_name()
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
