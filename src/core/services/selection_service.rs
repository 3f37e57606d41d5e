use tracing::info;

use crate::core::errors::{BackupError, Result};
use crate::core::models::secret_record::SecretRecord;
use crate::core::models::selector::Selector;
use crate::core::traits::cluster::ClusterApi;

/// Resolves a selector into the secrets to back up.
pub struct SelectionService<'a, A: ClusterApi> {
    pub cluster: &'a A,
}

impl<'a, A: ClusterApi> SelectionService<'a, A> {
    pub fn new(cluster: &'a A) -> Self {
        Self { cluster }
    }

    /// List matching secrets in `namespace` with a single request.
    ///
    /// Records keep the API's order and come back normalized (see
    /// [`SecretRecord::strip_ephemeral`]). No match is an empty list, not an
    /// error.
    pub fn select_secrets(&self, namespace: &str, selector: &Selector) -> Result<Vec<SecretRecord>> {
        let mut secrets = self
            .cluster
            .list_secrets(namespace, selector)
            .map_err(|source| BackupError::SelectionFailed { source })?;

        for secret in &mut secrets {
            secret.strip_ephemeral();
            info!(secret = %secret.name(), "selected secret");
        }

        info!(namespace, selector = %selector, total = secrets.len(), "secrets selected");
        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::fakes::{FakeCluster, api_secret};

    #[test]
    fn passes_namespace_and_selector_through() {
        let cluster = FakeCluster::default();
        let selector = Selector::Name("db-creds".into());

        SelectionService::new(&cluster)
            .select_secrets("prod", &selector)
            .unwrap();

        let calls = cluster.list_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("prod".to_string(), selector));
    }

    #[test]
    fn strips_ephemeral_fields_and_keeps_order() {
        let mut cluster = FakeCluster::default();
        cluster.secrets = vec![
            api_secret("zeta", &[("k", "dg==")]),
            api_secret("alpha", &[("k", "dg==")]),
        ];
        let selector = Selector::Label {
            key: "team".into(),
            value: "payments".into(),
        };

        let secrets = SelectionService::new(&cluster)
            .select_secrets("prod", &selector)
            .unwrap();

        let names: Vec<&str> = secrets.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        for secret in &secrets {
            assert!(secret.metadata.uid.is_none());
            assert!(secret.metadata.resource_version.is_none());
            assert_eq!(secret.metadata.namespace.as_deref(), Some("prod"));
        }
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let cluster = FakeCluster::default();
        let secrets = SelectionService::new(&cluster)
            .select_secrets("prod", &Selector::Name("missing".into()))
            .unwrap();
        assert!(secrets.is_empty());
    }

    #[test]
    fn api_error_surfaces_unchanged() {
        let mut cluster = FakeCluster::default();
        cluster.fail_with = Some("secrets is forbidden".into());

        let err = SelectionService::new(&cluster)
            .select_secrets("prod", &Selector::Name("db-creds".into()))
            .unwrap_err();

        match err {
            BackupError::SelectionFailed { source } => {
                assert_eq!(source.message, "secrets is forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
