use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::core::errors::{BackupError, Result};
use crate::core::models::secret_record::{SecretRecord, SnapshotDocument};

/// Writes selected secrets as a YAML `SecretList` document.
pub struct SnapshotService;

impl SnapshotService {
    /// Render records into `writer` as YAML, wrapped in a `v1/SecretList` envelope.
    ///
    /// Output depends only on the records, so the same input always yields
    /// the same bytes.
    pub fn render<W: Write>(
        &self,
        records: &[SecretRecord],
        writer: W,
    ) -> std::result::Result<(), serde_yaml_ng::Error> {
        let document = SnapshotDocument::new(records.to_vec());
        serde_yaml_ng::to_writer(writer, &document)
    }

    /// Create `dest` and write the snapshot document to it.
    ///
    /// On unix the file is created owner-only (`0600`), since it holds the
    /// secrets in clear.
    pub fn write_snapshot(&self, records: &[SecretRecord], dest: &Path) -> Result<()> {
        let failed = |reason: String| BackupError::SerializationFailed {
            path: dest.to_path_buf(),
            reason,
        };

        let file = create_private(dest).map_err(|e| failed(format!("cannot create file: {e}")))?;
        let mut writer = BufWriter::new(file);

        self.render(records, &mut writer)
            .map_err(|e| failed(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| failed(format!("cannot flush file: {e}")))?;

        debug!(path = %dest.display(), items = records.len(), "snapshot written");
        Ok(())
    }
}

fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
