//! Password-based key derivation using scrypt
//!
//! The encryption secret is a long-lived shared value, not a high-entropy
//! per-record key, so brute-force resistance depends on making derivation
//! deliberately expensive. The per-record salt ensures two records never
//! share a derived key even under the same secret.

use scrypt::{scrypt, Params};

use super::secure_memory::MasterKey;
use crate::config::KdfParams;
use crate::error::{Result, VaultError};

/// Derive a 256-bit key from the encryption secret and a per-record salt.
pub fn derive_key(secret: &str, salt: &[u8], params: KdfParams) -> Result<MasterKey> {
    let scrypt_params = Params::new(params.log_n, params.r, params.p, 32)
        .map_err(|e| VaultError::Configuration(format!("invalid scrypt parameters: {}", e)))?;

    let mut key = [0u8; 32];
    scrypt(secret.as_bytes(), salt, &scrypt_params, &mut key)
        .map_err(|e| VaultError::Configuration(format!("key derivation failed: {}", e)))?;

    Ok(MasterKey::new(key))
}
