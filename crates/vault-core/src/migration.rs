//! Legacy-format migration
//!
//! Before the vault existed, credentials were stored as
//! `base64("<owner_id>:<plaintext>")` with no encryption. Records in that
//! encoding are upgraded lazily on first read: the plaintext is recovered,
//! re-encrypted under the current format, and handed back to the caller to
//! persist. The legacy encoding is never produced again; once a record is
//! in the new format it never regresses.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::SecretString;

/// Outcome of a legacy-migration attempt.
///
/// Non-migration outcomes are routine in a mixed-format dataset, so they
/// are variants rather than errors: migration is best-effort and must
/// never block the read path that triggered it.
#[derive(Debug)]
pub enum Migration {
    /// The blob was legacy-encoded and owned by the caller; it has been
    /// re-encrypted. The caller persists `blob` in place of the old value
    /// and uses `plaintext` immediately.
    Migrated {
        /// Recovered credential value
        plaintext: SecretString,
        /// Replacement blob in the current encrypted format
        blob: String,
    },
    /// The blob already carries the current format; nothing to do.
    AlreadyCurrent,
    /// Not a recognized legacy value: undecodable, missing the separator,
    /// or owned by a different identity. Unrecoverable but not fatal.
    Unrecognized,
}

impl Migration {
    /// Whether this outcome produced a replacement blob.
    pub fn is_migrated(&self) -> bool {
        matches!(self, Migration::Migrated { .. })
    }
}

/// Recover the plaintext from a legacy blob, verifying ownership.
///
/// Returns `None` unless the value decodes to UTF-8 text of the form
/// `<owner_id>:<plaintext>` with an exact owner match. The owner check
/// prevents migrating a record under an unauthorized identity.
pub(crate) fn recover_legacy(encoded: &str, owner_id: &str) -> Option<String> {
    let decoded = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;

    let (stored_owner, plaintext) = text.split_once(':')?;
    if stored_owner != owner_id {
        return None;
    }

    Some(plaintext.to_string())
}
