use chrono::{DateTime, Utc};

/// `YYYY-MM-DD_HH-MM-SS`; fixed width so names sort chronologically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Suffix of the armored age ciphertext.
pub const ENCRYPTED_SUFFIX: &str = ".age.asc";

/// Names of every artifact produced by one backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    /// Local YAML snapshot, e.g. `eu-cluster-db-creds.yaml-2024-03-01_10-00-00`.
    pub plaintext: String,
    /// Local armored ciphertext: `plaintext` + [`ENCRYPTED_SUFFIX`].
    pub encrypted: String,
    /// Object key in the bucket: folder prefix + `encrypted`.
    pub remote_key: String,
}

impl ArtifactNames {
    /// Derive all names from the cluster, the selector identity and a UTC instant.
    ///
    /// Path separators in the `<cluster>-<selector>` base are replaced by
    /// `_`, so a cluster named like an ARN still yields a flat file name.
    /// `folder_prefix` is prepended verbatim; separators are the caller's
    /// responsibility.
    pub fn derive(
        cluster_name: &str,
        selector_identity: &str,
        now: DateTime<Utc>,
        folder_prefix: &str,
    ) -> Self {
        let timestamp = now.format(TIMESTAMP_FORMAT);
        let base = format!("{cluster_name}-{selector_identity}").replace(['/', '\\'], "_");
        let plaintext = format!("{base}.yaml-{timestamp}");
        let encrypted = format!("{plaintext}{ENCRYPTED_SUFFIX}");
        let remote_key = format!("{folder_prefix}{encrypted}");

        Self {
            plaintext,
            encrypted,
            remote_key,
        }
    }
}
