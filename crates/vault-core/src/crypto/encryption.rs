//! AES-256-GCM authenticated encryption and the at-rest wire format
//!
//! Wire format: `base64(salt || nonce || tag || ciphertext)`
//! - salt: 32 bytes, feeds key derivation
//! - nonce: 16 bytes (128 bits)
//! - tag: 16 bytes (128 bits)
//! - ciphertext: variable length
//!
//! The fields have fixed widths and are concatenated in that order, so no
//! length prefixes are needed; ciphertext occupies the remainder. This
//! layout is the durable artifact and must stay stable across versions.

use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit, Payload},
    aes::Aes256,
    AesGcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use super::secure_memory::MasterKey;
use crate::error::{Result, VaultError};

/// AES-256-GCM with the 16-byte nonce the stored format carries.
type VaultCipher = AesGcm<Aes256, U16>;

/// Salt length in bytes (256 bits)
pub const SALT_LEN: usize = 32;
/// Nonce length in bytes (128 bits)
pub const NONCE_LEN: usize = 16;
/// Authentication tag length in bytes (128 bits)
pub const TAG_LEN: usize = 16;
/// Smallest possible new-format blob: all fixed fields, empty ciphertext.
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// A parsed new-format blob: salt, nonce, auth tag, and ciphertext.
#[derive(Clone)]
pub struct EncryptedBlob {
    /// Per-record key-derivation salt
    pub salt: [u8; SALT_LEN],
    /// Per-encryption nonce
    pub nonce: [u8; NONCE_LEN],
    /// Authentication tag
    pub tag: [u8; TAG_LEN],
    /// Encrypted payload
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Serialize to the base64 wire format.
    pub fn to_base64(&self) -> String {
        let mut combined = Vec::with_capacity(MIN_BLOB_LEN + self.ciphertext.len());
        combined.extend_from_slice(&self.salt);
        combined.extend_from_slice(&self.nonce);
        combined.extend_from_slice(&self.tag);
        combined.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&combined)
    }

    /// Parse from the base64 wire format.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let combined = STANDARD
            .decode(encoded)
            .map_err(|e| VaultError::Format(format!("invalid base64: {}", e)))?;

        if combined.len() < MIN_BLOB_LEN {
            return Err(VaultError::Format(format!(
                "too short: expected at least {} bytes, got {}",
                MIN_BLOB_LEN,
                combined.len()
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&combined[..SALT_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&combined[SALT_LEN..SALT_LEN + NONCE_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&combined[SALT_LEN + NONCE_LEN..MIN_BLOB_LEN]);

        Ok(Self {
            salt,
            nonce,
            tag,
            ciphertext: combined[MIN_BLOB_LEN..].to_vec(),
        })
    }
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

/// Generate a fresh random key-derivation salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt plaintext under a derived key with a fresh random nonce.
///
/// `aad` is authenticated but not encrypted; the same value must be
/// supplied at decryption time. The salt is recorded in the blob so the
/// key can be re-derived on read.
pub fn encrypt(
    plaintext: &[u8],
    aad: Option<&str>,
    key: &MasterKey,
    salt: [u8; SALT_LEN],
) -> Result<EncryptedBlob> {
    let cipher = VaultCipher::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Configuration(format!("cipher init failed: {}", e)))?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let payload = Payload {
        msg: plaintext,
        aad: aad.map(str::as_bytes).unwrap_or(&[]),
    };

    // aes-gcm appends the auth tag to the ciphertext
    let mut ciphertext = cipher
        .encrypt(Nonce::<U16>::from_slice(&nonce), payload)
        .map_err(|_| VaultError::Configuration("encryption failed".to_string()))?;

    let tag_start = ciphertext.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&ciphertext[tag_start..]);
    ciphertext.truncate(tag_start);

    Ok(EncryptedBlob {
        salt,
        nonce,
        tag,
        ciphertext,
    })
}

/// Decrypt a blob under a derived key, verifying the tag and `aad`.
///
/// Any verification failure collapses to [`VaultError::Authentication`]:
/// wrong secret, wrong `aad`, and tampering must be indistinguishable, and
/// no partial plaintext is ever returned.
pub fn decrypt(blob: &EncryptedBlob, aad: Option<&str>, key: &MasterKey) -> Result<Vec<u8>> {
    let cipher = VaultCipher::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Configuration(format!("cipher init failed: {}", e)))?;

    // Reconstruct ciphertext with tag appended (as expected by aes-gcm)
    let mut ciphertext_with_tag = Vec::with_capacity(blob.ciphertext.len() + TAG_LEN);
    ciphertext_with_tag.extend_from_slice(&blob.ciphertext);
    ciphertext_with_tag.extend_from_slice(&blob.tag);

    let payload = Payload {
        msg: ciphertext_with_tag.as_slice(),
        aad: aad.map(str::as_bytes).unwrap_or(&[]),
    };

    cipher
        .decrypt(Nonce::<U16>::from_slice(&blob.nonce), payload)
        .map_err(|_| VaultError::Authentication)
}

/// Whether a stored value carries the new encrypted format.
///
/// Pure length classifier, no cryptographic work: decodes the base64
/// (false on failure) and checks for at least the fixed-size fields. A
/// legacy value that happens to decode to 64 or more bytes is
/// misclassified; this ambiguity is inherent to the stored format, which
/// carries no version marker.
pub fn is_new_format(encoded: &str) -> bool {
    match STANDARD.decode(encoded) {
        Ok(decoded) => decoded.len() >= MIN_BLOB_LEN,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KdfParams;
    use crate::crypto::key_derivation::derive_key;

    fn test_key(salt: &[u8]) -> MasterKey {
        let params = KdfParams { log_n: 4, r: 8, p: 1 };
        derive_key("test-secret-that-is-at-least-32-characters", salt, params).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let blob = encrypt(b"sk-test-12345", None, &key, salt).unwrap();
        let plaintext = decrypt(&blob, None, &key).unwrap();

        assert_eq!(plaintext, b"sk-test-12345");
    }

    #[test]
    fn test_roundtrip_with_aad() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let blob = encrypt(b"sk-test-12345", Some("user-123"), &key, salt).unwrap();
        let plaintext = decrypt(&blob, Some("user-123"), &key).unwrap();

        assert_eq!(plaintext, b"sk-test-12345");
    }

    #[test]
    fn test_aad_mismatch_fails() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let blob = encrypt(b"sk-test-12345", Some("user-123"), &key, salt).unwrap();

        let err = decrypt(&blob, Some("user-456"), &key).unwrap_err();
        assert!(matches!(err, VaultError::Authentication));

        let err = decrypt(&blob, None, &key).unwrap_err();
        assert!(matches!(err, VaultError::Authentication));
    }

    #[test]
    fn test_wrong_key_fails() {
        let salt = generate_salt();
        let key = test_key(&salt);
        let other = test_key(&generate_salt());

        let blob = encrypt(b"secret", None, &key, salt).unwrap();
        let err = decrypt(&blob, None, &other).unwrap_err();
        assert!(matches!(err, VaultError::Authentication));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let mut blob = encrypt(b"secret data", None, &key, salt).unwrap();
        blob.ciphertext[0] ^= 0x01;

        let err = decrypt(&blob, None, &key).unwrap_err();
        assert!(matches!(err, VaultError::Authentication));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let mut blob = encrypt(b"secret data", None, &key, salt).unwrap();
        blob.tag[0] ^= 0x01;

        let err = decrypt(&blob, None, &key).unwrap_err();
        assert!(matches!(err, VaultError::Authentication));
    }

    #[test]
    fn test_blob_serialization_roundtrip() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let blob = encrypt(b"payload", Some("user-1"), &key, salt).unwrap();
        let parsed = EncryptedBlob::from_base64(&blob.to_base64()).unwrap();

        assert_eq!(parsed.salt, blob.salt);
        assert_eq!(parsed.nonce, blob.nonce);
        assert_eq!(parsed.tag, blob.tag);
        assert_eq!(parsed.ciphertext, blob.ciphertext);
    }

    #[test]
    fn test_blob_layout_offsets() {
        let blob = EncryptedBlob {
            salt: [1u8; SALT_LEN],
            nonce: [2u8; NONCE_LEN],
            tag: [3u8; TAG_LEN],
            ciphertext: vec![4u8; 5],
        };

        let decoded = STANDARD.decode(blob.to_base64()).unwrap();
        assert_eq!(&decoded[..32], &[1u8; 32]);
        assert_eq!(&decoded[32..48], &[2u8; 16]);
        assert_eq!(&decoded[48..64], &[3u8; 16]);
        assert_eq!(&decoded[64..], &[4u8; 5]);
    }

    #[test]
    fn test_parse_rejects_invalid_base64() {
        let err = EncryptedBlob::from_base64("not-valid-base64!!!").unwrap_err();
        assert!(matches!(err, VaultError::Format(_)));
    }

    #[test]
    fn test_parse_rejects_short_blob() {
        let short = STANDARD.encode([0u8; MIN_BLOB_LEN - 1]);
        let err = EncryptedBlob::from_base64(&short).unwrap_err();
        assert!(matches!(err, VaultError::Format(_)));
    }

    #[test]
    fn test_empty_plaintext_produces_minimum_blob() {
        let salt = generate_salt();
        let key = test_key(&salt);

        let blob = encrypt(b"", None, &key, salt).unwrap();
        assert!(blob.ciphertext.is_empty());

        let decoded = STANDARD.decode(blob.to_base64()).unwrap();
        assert_eq!(decoded.len(), MIN_BLOB_LEN);

        assert_eq!(decrypt(&blob, None, &key).unwrap(), b"");
    }

    #[test]
    fn test_is_new_format() {
        // Exactly the fixed fields qualifies (empty ciphertext).
        assert!(is_new_format(&STANDARD.encode([0u8; MIN_BLOB_LEN])));
        assert!(!is_new_format(&STANDARD.encode([0u8; MIN_BLOB_LEN - 1])));
        assert!(!is_new_format(&STANDARD.encode(b"user-123:sk-old-key")));
        assert!(!is_new_format(""));
        assert!(!is_new_format("short"));
        assert!(!is_new_format("not-base64!!!"));
    }
}
