use std::path::Path;

use crate::core::errors::Result;

/// Port for encrypting a snapshot file.
///
/// Implementations live in `adapters::cipher`. Encrypt-only: no backend
/// ever handles private key material.
pub trait CipherBackend {
    /// Encrypt `source` into a newly created `dest`.
    ///
    /// On error, `dest` may exist with partial content and must be
    /// treated as invalid.
    fn encrypt_file(&self, source: &Path, dest: &Path) -> Result<()>;

    /// Human-readable name of this backend (e.g. "age").
    fn name(&self) -> &str;
}
