//! Vault configuration
//!
//! The encryption secret and key-derivation cost are injected into the
//! vault at construction rather than looked up ambiently, so tests can
//! supply deterministic values without touching the process environment.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::error::{Result, VaultError};

/// Environment variable holding the encryption secret in production.
pub const SECRET_ENV_VAR: &str = "ENCRYPTION_KEY";

/// Minimum length of the encryption secret, in characters.
pub const MIN_SECRET_LEN: usize = 32;

/// scrypt cost parameters for key derivation.
///
/// The defaults (N=2^14, r=8, p=1) are the recommended interactive-login
/// work factor. Derivation cost is the dominant per-call expense and is
/// exposed here as a capacity-planning knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost (N = 2^log_n)
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { log_n: 14, r: 8, p: 1 }
    }
}

/// Configuration for a [`CredentialVault`](crate::CredentialVault).
pub struct VaultConfig {
    secret: String,
    kdf: KdfParams,
}

impl VaultConfig {
    /// Create a configuration with an explicit secret and default
    /// key-derivation cost.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            kdf: KdfParams::default(),
        }
    }

    /// Override the key-derivation cost parameters.
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Read the secret from the `ENCRYPTION_KEY` environment variable.
    ///
    /// A missing or too-short value is not an error here: validation is
    /// deferred to the first encrypt/decrypt call so that processes which
    /// never touch the vault can start without the secret.
    pub fn from_env() -> Self {
        Self::new(std::env::var(SECRET_ENV_VAR).unwrap_or_default())
    }

    /// The validated secret. Fails if the secret is missing or shorter
    /// than [`MIN_SECRET_LEN`] characters.
    pub(crate) fn secret(&self) -> Result<&str> {
        if self.secret.chars().count() < MIN_SECRET_LEN {
            return Err(VaultError::Configuration(format!(
                "{} must be set and at least {} characters long",
                SECRET_ENV_VAR, MIN_SECRET_LEN
            )));
        }
        Ok(&self.secret)
    }

    pub(crate) fn kdf(&self) -> KdfParams {
        self.kdf
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("secret", &"[REDACTED]")
            .field("kdf", &self.kdf)
            .finish()
    }
}

/// Generate a random secret suitable for `ENCRYPTION_KEY`.
///
/// Intended for initial setup only: call once and store the result in the
/// deployment environment.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
