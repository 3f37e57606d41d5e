use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::app_config::BackupConfig;
use crate::core::errors::{BackupError, Result, StoreError};
use crate::core::models::artifact_names::ArtifactNames;
use crate::core::services::identity_service::IdentityService;
use crate::core::services::selection_service::SelectionService;
use crate::core::services::snapshot_service::SnapshotService;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::cluster::ClusterApi;
use crate::core::traits::object_store::ObjectStore;

/// Progress of a run. Stages only move forward; an error ends the run
/// in whatever stage it was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    IdentityResolved,
    Selected,
    Named,
    Serialized,
    Encrypted,
    Uploaded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::IdentityResolved => "identity-resolved",
            Self::Selected => "selected",
            Self::Named => "named",
            Self::Serialized => "serialized",
            Self::Encrypted => "encrypted",
            Self::Uploaded => "uploaded",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupReport {
    pub cluster_name: String,
    pub secret_count: usize,
    pub names: ArtifactNames,
    pub plaintext_path: PathBuf,
    pub encrypted_path: PathBuf,
    pub bucket: String,
    /// Hex SHA-256 of the uploaded ciphertext.
    pub ciphertext_sha256: String,
}

/// Runs the backup pipeline: identity, selection, naming, serialization,
/// encryption, upload. Strictly sequential and fail-fast.
pub struct BackupService<'a, A: ClusterApi, C: CipherBackend, S: ObjectStore> {
    pub cluster: &'a A,
    pub cipher: &'a C,
    pub store: &'a S,
}

impl<'a, A: ClusterApi, C: CipherBackend, S: ObjectStore> BackupService<'a, A, C, S> {
    pub fn new(cluster: &'a A, cipher: &'a C, store: &'a S) -> Self {
        Self {
            cluster,
            cipher,
            store,
        }
    }

    /// Run one backup, timestamped with `now`.
    ///
    /// The first failing stage aborts the run. Local artifacts are never
    /// cleaned up, whether the run succeeds or not.
    pub fn run(&self, config: &BackupConfig, now: DateTime<Utc>) -> Result<BackupReport> {
        let mut stage = Stage::Start;
        let result = self.run_stages(config, now, &mut stage);
        if let Err(e) = &result {
            warn!(last_stage = %stage, error = %e, "backup failed");
        }
        result
    }

    fn run_stages(
        &self,
        config: &BackupConfig,
        now: DateTime<Utc>,
        stage: &mut Stage,
    ) -> Result<BackupReport> {
        let cluster_name = IdentityService::new(self.cluster).resolve_cluster_name()?;
        advance(stage, Stage::IdentityResolved);

        let secrets =
            SelectionService::new(self.cluster).select_secrets(&config.namespace, &config.selector)?;
        advance(stage, Stage::Selected);

        let names = ArtifactNames::derive(
            &cluster_name,
            &config.selector.identity(),
            now,
            &config.storage.folder,
        );
        info!(
            plaintext = %names.plaintext,
            encrypted = %names.encrypted,
            remote_key = %names.remote_key,
            "artifact names derived"
        );
        advance(stage, Stage::Named);

        let plaintext_path = config.work_dir.join(&names.plaintext);
        let encrypted_path = config.work_dir.join(&names.encrypted);

        SnapshotService.write_snapshot(&secrets, &plaintext_path)?;
        advance(stage, Stage::Serialized);

        self.cipher.encrypt_file(&plaintext_path, &encrypted_path)?;
        info!(
            cipher = self.cipher.name(),
            source = %plaintext_path.display(),
            dest = %encrypted_path.display(),
            "snapshot encrypted"
        );
        advance(stage, Stage::Encrypted);

        let upload_failed = |source: StoreError| BackupError::UploadFailed {
            bucket: self.store.bucket().to_string(),
            key: names.remote_key.clone(),
            source,
        };
        let ciphertext_sha256 = sha256_file(&encrypted_path).map_err(|e| {
            upload_failed(StoreError::new(format!(
                "cannot read {}: {e}",
                encrypted_path.display()
            )))
        })?;
        self.store
            .put_file(&names.remote_key, &encrypted_path)
            .map_err(upload_failed)?;
        advance(stage, Stage::Uploaded);

        Ok(BackupReport {
            cluster_name,
            secret_count: secrets.len(),
            names,
            plaintext_path,
            encrypted_path,
            bucket: self.store.bucket().to_string(),
            ciphertext_sha256,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    info!(from = %stage, to = %next, "stage complete");
    *stage = next;
}

/// Streamed SHA-256 of a file, hex encoded.
fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
