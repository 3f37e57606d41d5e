use std::collections::BTreeMap;

use crate::core::errors::ApiError;
use crate::core::models::secret_record::SecretRecord;
use crate::core::models::selector::Selector;

/// Port for the Kubernetes control plane.
///
/// Implementations live in `adapters::kube`. Each call is a single request;
/// retrying is never the implementation's job.
pub trait ClusterApi {
    /// Data of a ConfigMap, or `None` if it does not exist.
    fn config_map_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>, ApiError>;

    /// Secrets in `namespace` matching `selector`, in the order the API returns them.
    fn list_secrets(
        &self,
        namespace: &str,
        selector: &Selector,
    ) -> Result<Vec<SecretRecord>, ApiError>;
}
