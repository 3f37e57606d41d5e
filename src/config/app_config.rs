use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::cli::Cli;
use crate::core::errors::{BackupError, Result};
use crate::core::models::selector::Selector;

/// Label name segment: at most 63 characters, alphanumeric at both ends.
static LABEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]([-A-Za-z0-9_.]{0,61}[A-Za-z0-9])?)$").expect("valid regex")
});

/// DNS subdomain (RFC 1123): secret names and label key prefixes.
static DNS_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

/// Everything a backup run needs, validated once at startup.
///
/// Built by [`BackupConfig::from_cli`] and then only borrowed.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub selector: Selector,
    pub namespace: String,
    pub storage: StorageTarget,
    pub credentials: StaticCredentials,
    /// age X25519 recipient (`age1...`).
    pub recipient_public_key: String,
    /// Directory receiving the plaintext and encrypted snapshots.
    pub work_dir: PathBuf,
}

/// Destination of the encrypted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageTarget {
    pub bucket: String,
    /// Prepended verbatim to the object name.
    pub folder: String,
    pub region: String,
    /// Custom endpoint for S3-compatible storage.
    pub endpoint: Option<String>,
}

/// Static access key pair for the object store.
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl BackupConfig {
    /// Validate parsed arguments into a configuration.
    ///
    /// Fails with `ConfigInvalid` on the first missing or contradictory
    /// value. No network or filesystem access happens here.
    pub fn from_cli(args: &Cli) -> Result<Self> {
        let selector = Selector::from_parts(
            args.secret_name.as_deref(),
            args.label_key.as_deref(),
            args.label_value.as_deref(),
        )?;
        match &selector {
            Selector::Name(name) => validate_secret_name(name)?,
            Selector::Label { key, value } => validate_label(key, value)?,
        }

        let config = Self {
            selector,
            namespace: required(&args.namespace, "NAMESPACE")?,
            storage: StorageTarget {
                bucket: required(&args.bucket_name, "BUCKET_NAME")?,
                folder: required(&args.s3_folder, "S3_FOLDER")?,
                region: required(&args.s3_region, "S3_REGION")?,
                endpoint: args.s3_endpoint.clone().filter(|e| !e.is_empty()),
            },
            credentials: StaticCredentials {
                access_key_id: required(&args.access_key_id, "AWS_ACCESS_KEY_ID")?,
                secret_access_key: required(&args.secret_access_key, "AWS_SECRET_ACCESS_KEY")?,
            },
            recipient_public_key: required(&args.age_public_key, "AGE_PUBLIC_KEY")?,
            work_dir: args.work_dir.clone(),
        };

        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            selector = %self.selector,
            namespace = %self.namespace,
            bucket = %self.storage.bucket,
            folder = %self.storage.folder,
            region = %self.storage.region,
            work_dir = %self.work_dir.display(),
            "configuration loaded"
        );
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BackupError::ConfigInvalid {
            detail: format!("{name} is required"),
        })
}

/// Check a secret name against Kubernetes object name syntax.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.len() > 253 || !DNS_SUBDOMAIN.is_match(name) {
        return Err(BackupError::ConfigInvalid {
            detail: format!("SECRET_NAME '{name}' is not a valid secret name"),
        });
    }
    Ok(())
}

/// Check a label pair against Kubernetes label syntax.
pub fn validate_label(key: &str, value: &str) -> Result<()> {
    let invalid = |detail: String| BackupError::ConfigInvalid { detail };

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };
    if let Some(prefix) = prefix {
        if prefix.len() > 253 || !DNS_SUBDOMAIN.is_match(prefix) {
            return Err(invalid(format!("LABEL_KEY prefix '{prefix}' is not a DNS subdomain")));
        }
    }
    if !LABEL_NAME.is_match(name) {
        return Err(invalid(format!("LABEL_KEY '{key}' is not a valid label key")));
    }
    if !LABEL_NAME.is_match(value) {
        return Err(invalid(format!("LABEL_VALUE '{value}' is not a valid label value")));
    }
    Ok(())
}
