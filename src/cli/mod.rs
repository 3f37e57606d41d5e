pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

/// Back up Kubernetes secrets to S3, encrypted with age.
///
/// Every option can also be given through the environment variable shown
/// next to it. Select secrets either by name or by label, not both.
#[derive(Parser, Debug)]
#[command(name = "secrets-backup", version, about, long_about = None)]
pub struct Cli {
    /// Exact name of the secret to back up
    #[arg(long, env = "SECRET_NAME")]
    pub secret_name: Option<String>,

    /// Namespace to read secrets from
    #[arg(long, env = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Label key selecting the secrets (requires --label-value)
    #[arg(long, env = "LABEL_KEY")]
    pub label_key: Option<String>,

    /// Label value selecting the secrets (requires --label-key)
    #[arg(long, env = "LABEL_VALUE")]
    pub label_value: Option<String>,

    /// Destination S3 bucket
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Key prefix inside the bucket, used verbatim (e.g. "backups/")
    #[arg(long, env = "S3_FOLDER")]
    pub s3_folder: Option<String>,

    /// Region of the bucket
    #[arg(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    /// Custom endpoint for S3-compatible storage
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Static access key id for the bucket
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// Static secret access key for the bucket
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// age recipient public key (age1...)
    #[arg(long, env = "AGE_PUBLIC_KEY")]
    pub age_public_key: Option<String>,

    /// Directory for the plaintext and encrypted snapshots
    #[arg(long, env = "BACKUP_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
