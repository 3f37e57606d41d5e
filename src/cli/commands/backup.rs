use crate::adapters::cipher::age_backend::AgeBackend;
use crate::adapters::kube::in_cluster_client::InClusterClient;
use crate::adapters::storage::s3_store::S3Store;
use crate::cli::output;
use crate::config::app_config::BackupConfig;
use crate::core::errors::Result;
use crate::core::services::backup_service::{BackupReport, BackupService};

/// Execute one backup run.
///
/// Everything that can be checked locally (selector, required values,
/// recipient key) is checked before the first network client is built.
pub fn execute(config: &BackupConfig) -> Result<()> {
    let cipher = AgeBackend::from_public_key(&config.recipient_public_key)?;
    let cluster = InClusterClient::from_service_account()?;
    let store = S3Store::new(&config.storage, &config.credentials)?;

    let report =
        BackupService::new(&cluster, &cipher, &store).run(config, chrono::Utc::now())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BackupReport) {
    output::header("Backup complete");
    output::detail("cluster", &report.cluster_name);
    output::detail("secrets", &report.secret_count.to_string());
    output::detail("snapshot", &report.plaintext_path.display().to_string());
    output::detail("encrypted", &report.encrypted_path.display().to_string());
    output::detail(
        "uploaded",
        &format!("s3://{}/{}", report.bucket, report.names.remote_key),
    );
    output::detail("sha256", &report.ciphertext_sha256);
    output::success("File uploaded successfully");
}
