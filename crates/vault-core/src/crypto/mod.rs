//! Cryptographic primitives for credential-at-rest protection
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with associated data
//! - scrypt key derivation from the process-wide secret
//! - Secure memory handling with zeroize

mod encryption;
pub(crate) mod key_derivation;
mod secure_memory;

pub use encryption::{
    is_new_format, EncryptedBlob, MIN_BLOB_LEN, NONCE_LEN, SALT_LEN, TAG_LEN,
};
pub use secure_memory::{MasterKey, SecretString};

pub(crate) use encryption::{decrypt, encrypt, generate_salt};
pub(crate) use key_derivation::derive_key;
