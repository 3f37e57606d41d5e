use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::core::errors::{BackupError, Result};
use crate::core::traits::cipher::CipherBackend;

/// Age encryption backend using X25519 + ChaCha20-Poly1305.
///
/// Encrypts to a single recipient public key and wraps the ciphertext in
/// ASCII armor so the artifact survives text-oriented channels. Data is
/// streamed in age's 64 KiB chunks; the plaintext is never held in memory.
pub struct AgeBackend {
    recipient: age::x25519::Recipient,
}

impl AgeBackend {
    /// Parse an `age1...` public key into a backend.
    pub fn from_public_key(key: &str) -> Result<Self> {
        let recipient = key
            .trim()
            .parse::<age::x25519::Recipient>()
            .map_err(|e: &str| BackupError::InvalidRecipientKey {
                reason: e.to_string(),
            })?;
        Ok(Self { recipient })
    }

    /// Encrypt everything read from `input` into `output`.
    ///
    /// The age stream is finished before the armor writer, so the final
    /// chunk and its tag land inside the armor envelope. Returns `output`
    /// once both trailers are written.
    pub fn encrypt_stream<R: Read, W: Write>(&self, mut input: R, output: W) -> Result<W> {
        let stream_failed = |stage: &str, e: io::Error| BackupError::EncryptionStreamFailed {
            reason: format!("{stage}: {e}"),
        };

        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(&self.recipient as &dyn age::Recipient))
                .map_err(|e| BackupError::EncryptionStreamFailed {
                    reason: format!("Encryptor setup failed: {e}"),
                })?;

        let armored = age::armor::ArmoredWriter::wrap_output(output, age::armor::Format::AsciiArmor)
            .map_err(|e| stream_failed("Armor writer failed", e))?;

        let mut writer = encryptor
            .wrap_output(armored)
            .map_err(|e| stream_failed("Encryption stream failed", e))?;

        let copied =
            io::copy(&mut input, &mut writer).map_err(|e| stream_failed("Copy failed", e))?;

        let armored = writer
            .finish()
            .map_err(|e| stream_failed("Encryption finish failed", e))?;
        let output = armored
            .finish()
            .map_err(|e| stream_failed("Armor finish failed", e))?;

        debug!(bytes = copied, "plaintext encrypted");
        Ok(output)
    }
}

impl CipherBackend for AgeBackend {
    fn encrypt_file(&self, source: &Path, dest: &Path) -> Result<()> {
        let input = File::open(source).map_err(|e| BackupError::EncryptionIoFailed {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        let output = File::create(dest).map_err(|e| BackupError::EncryptionIoFailed {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut output = self.encrypt_stream(BufReader::new(input), BufWriter::new(output))?;
        output
            .flush()
            .map_err(|e| BackupError::EncryptionStreamFailed {
                reason: format!("Flush failed: {e}"),
            })?;

        debug!(
            source = %source.display(),
            dest = %dest.display(),
            "file encrypted"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "age"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decrypt armored ciphertext the way a restore would.
    fn decrypt(ciphertext: &[u8], identity: &age::x25519::Identity) -> Vec<u8> {
        let armored_reader = age::armor::ArmoredReader::new(ciphertext);
        let decryptor = age::Decryptor::new(armored_reader).unwrap();
        let mut reader = decryptor
            .decrypt(std::iter::once(identity as &dyn age::Identity))
            .unwrap();
        let mut plaintext = Vec::new();
        reader.read_to_end(&mut plaintext).unwrap();
        plaintext
    }

    /// Yields `limit` bytes, then fails.
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::other("disk unplugged"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(b'x');
            self.remaining -= n;
            Ok(n)
        }
    }

    fn backend_for(identity: &age::x25519::Identity) -> AgeBackend {
        AgeBackend::from_public_key(&identity.to_public().to_string()).unwrap()
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("snapshot.yaml");
        let dest = dir.path().join("snapshot.yaml.age.asc");
        let plaintext = b"apiVersion: v1\nitems: []\nkind: SecretList\n";
        std::fs::write(&source, plaintext).unwrap();

        let identity = age::x25519::Identity::generate();
        backend_for(&identity).encrypt_file(&source, &dest).unwrap();

        let ciphertext = std::fs::read(&dest).unwrap();
        let armored = String::from_utf8_lossy(&ciphertext);
        assert!(armored.starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
        assert!(armored.trim_end().ends_with("-----END AGE ENCRYPTED FILE-----"));

        assert_eq!(decrypt(&ciphertext, &identity), plaintext);
    }

    #[test]
    fn multi_chunk_round_trip() {
        // Larger than one 64 KiB age chunk.
        let plaintext: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let identity = age::x25519::Identity::generate();

        let ciphertext = backend_for(&identity)
            .encrypt_stream(plaintext.as_slice(), Vec::new())
            .unwrap();

        assert_eq!(decrypt(&ciphertext, &identity), plaintext);
    }

    #[test]
    fn empty_input_round_trip() {
        let identity = age::x25519::Identity::generate();
        let ciphertext = backend_for(&identity)
            .encrypt_stream(io::empty(), Vec::new())
            .unwrap();
        assert!(decrypt(&ciphertext, &identity).is_empty());
    }

    #[test]
    fn wrong_identity_cannot_decrypt() {
        let intended = age::x25519::Identity::generate();
        let other = age::x25519::Identity::generate();
        let ciphertext = backend_for(&intended)
            .encrypt_stream(&b"secret"[..], Vec::new())
            .unwrap();

        let decryptor =
            age::Decryptor::new(age::armor::ArmoredReader::new(ciphertext.as_slice())).unwrap();
        let result = decryptor.decrypt(std::iter::once(&other as &dyn age::Identity));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_public_key_rejected() {
        let result = AgeBackend::from_public_key("age1notakey");
        assert!(matches!(result, Err(BackupError::InvalidRecipientKey { .. })));

        let result = AgeBackend::from_public_key("");
        assert!(matches!(result, Err(BackupError::InvalidRecipientKey { .. })));
    }

    #[test]
    fn missing_source_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let identity = age::x25519::Identity::generate();

        let err = backend_for(&identity)
            .encrypt_file(&dir.path().join("absent.yaml"), &dir.path().join("out.asc"))
            .unwrap_err();
        assert!(matches!(err, BackupError::EncryptionIoFailed { .. }));
    }

    #[test]
    fn uncreatable_dest_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("snapshot.yaml");
        std::fs::write(&source, b"items: []").unwrap();
        let identity = age::x25519::Identity::generate();

        let err = backend_for(&identity)
            .encrypt_file(&source, &dir.path().join("no-such-dir").join("out.asc"))
            .unwrap_err();
        match err {
            BackupError::EncryptionIoFailed { path, .. } => {
                assert!(path.ends_with("no-such-dir/out.asc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mid_stream_read_error_fails() {
        let identity = age::x25519::Identity::generate();
        let reader = FailingReader { remaining: 100_000 };

        let err = backend_for(&identity)
            .encrypt_stream(reader, Vec::new())
            .unwrap_err();
        assert!(matches!(err, BackupError::EncryptionStreamFailed { .. }));
        assert!(err.to_string().contains("disk unplugged"));
    }
}
