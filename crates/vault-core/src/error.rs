//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    /// The encryption secret is missing, too short, or the key-derivation
    /// parameters are invalid. Not recoverable at runtime.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The blob is not valid base64 or is too short to contain the
    /// fixed-size fields. The caller should treat the credential as
    /// unusable and prompt re-entry.
    #[error("Invalid encrypted data format: {0}")]
    Format(String),

    /// Tag verification failed. Deliberately carries no detail: wrong
    /// secret, wrong associated data, and tampered data must be
    /// indistinguishable to the caller.
    #[error("Decryption failed: authentication error")]
    Authentication,
}

impl VaultError {
    /// Failure kind label, safe to log as metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::Configuration(_) => "configuration",
            VaultError::Format(_) => "format",
            VaultError::Authentication => "authentication",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error_is_uniform() {
        // The message must not vary with the cause of the failure.
        let msg = VaultError::Authentication.to_string();
        assert_eq!(msg, "Decryption failed: authentication error");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(VaultError::Configuration("x".into()).kind(), "configuration");
        assert_eq!(VaultError::Format("x".into()).kind(), "format");
        assert_eq!(VaultError::Authentication.kind(), "authentication");
    }
}
