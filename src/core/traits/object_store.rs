use std::path::Path;

use crate::core::errors::StoreError;

/// Port for durable remote storage of the encrypted artifact.
pub trait ObjectStore {
    /// Store the full contents of `source` under `key` in one request.
    fn put_file(&self, key: &str, source: &Path) -> Result<(), StoreError>;

    /// Bucket (or equivalent container) that keys are written to.
    fn bucket(&self) -> &str;
}
