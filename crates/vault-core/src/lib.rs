//! # vault-core
//!
//! Credential-at-rest protection for user-supplied API keys:
//! - AES-256-GCM authenticated encryption with associated-data binding
//! - scrypt key derivation from a process-wide secret, fresh salt per record
//! - Lazy migration of a legacy unauthenticated encoding
//!
//! The vault performs no I/O: callers own persistence and exchange opaque
//! base64 blobs with it.

pub mod config;
pub mod crypto;
pub mod error;
mod migration;
mod vault;

pub use config::{generate_secret, KdfParams, VaultConfig, MIN_SECRET_LEN};
pub use crypto::{is_new_format, EncryptedBlob, SecretString};
pub use error::{Result, VaultError};
pub use migration::Migration;
pub use vault::CredentialVault;
