//! The credential vault

use tracing::{debug, warn};

use crate::config::VaultConfig;
use crate::crypto::{self, EncryptedBlob, SecretString};
use crate::error::{Result, VaultError};
use crate::migration::{recover_legacy, Migration};

/// Encrypts and decrypts credential values at rest.
///
/// The vault is a pure transformation over byte/string values: it performs
/// no I/O, and persistence of the blobs it produces belongs to the caller.
/// It is stateless apart from the injected configuration (read-only after
/// construction), so a single instance may be shared across threads and
/// called concurrently without locking. Each call derives its key from a
/// fresh salt; the deliberately expensive derivation is the dominant cost
/// and scales linearly with concurrent calls.
#[derive(Debug)]
pub struct CredentialVault {
    config: VaultConfig,
}

impl CredentialVault {
    /// Create a vault with an injected configuration.
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Create a vault configured from the process environment.
    ///
    /// The secret is validated lazily, on the first encrypt or decrypt
    /// call, not here.
    pub fn from_env() -> Self {
        Self::new(VaultConfig::from_env())
    }

    /// Encrypt a plaintext credential, returning the base64 blob.
    ///
    /// `aad` (in practice the owning user's identifier) is bound into the
    /// authentication tag but not stored; the same value must be supplied
    /// on decryption. Fresh salt and nonce are drawn per call, so
    /// encrypting the same input twice yields different blobs.
    pub fn encrypt(&self, plaintext: &str, aad: Option<&str>) -> Result<String> {
        let secret = self.config.secret()?;

        let salt = crypto::generate_salt();
        let key = crypto::derive_key(secret, &salt, self.config.kdf())?;

        let blob = crypto::encrypt(plaintext.as_bytes(), aad, &key, salt)?;
        debug!(
            ciphertext_len = blob.ciphertext.len(),
            "encrypted credential"
        );

        Ok(blob.to_base64())
    }

    /// Decrypt a base64 blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails with [`VaultError::Format`] on malformed input and with the
    /// uniform [`VaultError::Authentication`] when tag verification fails
    /// for any reason.
    pub fn decrypt(&self, encoded: &str, aad: Option<&str>) -> Result<SecretString> {
        let secret = self.config.secret()?;

        let blob = EncryptedBlob::from_base64(encoded)?;
        let key = crypto::derive_key(secret, &blob.salt, self.config.kdf())?;

        let plaintext = crypto::decrypt(&blob, aad, &key).map_err(|e| {
            // Repeated failures for one record are a signal worth
            // monitoring; the blob and secret are never logged.
            warn!(kind = e.kind(), "credential decryption failed");
            e
        })?;

        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| VaultError::Format("plaintext is not valid UTF-8".to_string()))?;

        Ok(SecretString::new(plaintext))
    }

    /// Whether a stored value carries the current encrypted format.
    ///
    /// Lets callers branch between decrypting directly and attempting
    /// legacy migration without paying for a failed decrypt.
    pub fn is_new_format(&self, encoded: &str) -> bool {
        crypto::is_new_format(encoded)
    }

    /// Upgrade a legacy `base64("<owner_id>:<plaintext>")` value to the
    /// current encrypted format.
    ///
    /// Best-effort by contract: values already in the current format,
    /// unrecognized values, and owner mismatches are routine outcomes
    /// reported through [`Migration`], never errors. On success the caller
    /// persists the replacement blob and uses the plaintext immediately;
    /// a failure to persist must not fail the read that triggered the
    /// migration.
    pub fn migrate_legacy(&self, encoded: &str, owner_id: &str) -> Migration {
        if self.is_new_format(encoded) {
            return Migration::AlreadyCurrent;
        }

        let Some(plaintext) = recover_legacy(encoded, owner_id) else {
            return Migration::Unrecognized;
        };

        // Bind the upgraded blob to its owner.
        match self.encrypt(&plaintext, Some(owner_id)) {
            Ok(blob) => {
                debug!("migrated legacy credential to encrypted format");
                Migration::Migrated {
                    plaintext: SecretString::new(plaintext),
                    blob,
                }
            }
            Err(e) => {
                warn!(kind = e.kind(), "legacy migration failed to re-encrypt");
                Migration::Unrecognized
            }
        }
    }
}
