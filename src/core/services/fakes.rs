//! In-memory implementations of the ports, for unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::errors::{ApiError, BackupError, Result, StoreError};
use crate::core::models::secret_record::{ObjectMeta, SecretRecord};
use crate::core::models::selector::Selector;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::cluster::ClusterApi;
use crate::core::traits::object_store::ObjectStore;

#[derive(Default)]
pub struct FakeCluster {
    pub cluster_info: Option<BTreeMap<String, String>>,
    pub secrets: Vec<SecretRecord>,
    pub fail_with: Option<String>,
    pub list_calls: RefCell<Vec<(String, Selector)>>,
}

impl FakeCluster {
    pub fn with_cluster_name(name: &str) -> Self {
        Self {
            cluster_info: Some([("cluster-name".to_string(), name.to_string())].into()),
            ..Self::default()
        }
    }
}

impl ClusterApi for FakeCluster {
    fn config_map_data(
        &self,
        _namespace: &str,
        _name: &str,
    ) -> std::result::Result<Option<BTreeMap<String, String>>, ApiError> {
        if let Some(msg) = &self.fail_with {
            return Err(ApiError::new(msg.clone()));
        }
        Ok(self.cluster_info.clone())
    }

    fn list_secrets(
        &self,
        namespace: &str,
        selector: &Selector,
    ) -> std::result::Result<Vec<SecretRecord>, ApiError> {
        self.list_calls
            .borrow_mut()
            .push((namespace.to_string(), selector.clone()));
        if let Some(msg) = &self.fail_with {
            return Err(ApiError::new(msg.clone()));
        }
        Ok(self.secrets.clone())
    }
}

/// Records every upload instead of sending it anywhere.
#[derive(Default)]
pub struct FakeStore {
    pub uploads: RefCell<Vec<(String, Vec<u8>)>>,
    pub fail_with: Option<String>,
}

impl ObjectStore for FakeStore {
    fn put_file(&self, key: &str, source: &Path) -> std::result::Result<(), StoreError> {
        if let Some(msg) = &self.fail_with {
            return Err(StoreError::new(msg.clone()));
        }
        let body = std::fs::read(source).map_err(|e| StoreError::new(e.to_string()))?;
        self.uploads.borrow_mut().push((key.to_string(), body));
        Ok(())
    }

    fn bucket(&self) -> &str {
        "test-bucket"
    }
}

/// Cipher that always fails mid-stream, leaving a partial output file.
pub struct BrokenCipher;

impl CipherBackend for BrokenCipher {
    fn encrypt_file(&self, _source: &Path, dest: &Path) -> Result<()> {
        std::fs::write(dest, "-----BEGIN AGE ENCRYPTED FILE-----\n")?;
        Err(BackupError::EncryptionStreamFailed {
            reason: "injected I/O failure".into(),
        })
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Cipher that reports success without producing any output file.
pub struct SilentCipher;

impl CipherBackend for SilentCipher {
    fn encrypt_file(&self, _source: &Path, _dest: &Path) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// A secret as the API server returns it, ephemeral fields included.
pub fn api_secret(name: &str, data: &[(&str, &str)]) -> SecretRecord {
    SecretRecord {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("prod".to_string()),
            labels: [("team".to_string(), "payments".to_string())].into(),
            resource_version: Some("48213".to_string()),
            uid: Some(format!("uid-{name}")),
            ..ObjectMeta::default()
        },
        data: data
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        type_: Some("Opaque".to_string()),
        ..SecretRecord::default()
    }
}
