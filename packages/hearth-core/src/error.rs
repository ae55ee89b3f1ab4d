//! # Error Handling
//!
//! Error types for Hearth Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Core Errors                                                       │
//! │  │   └── InvalidConfig         - Configuration rejected by validation  │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── Authentication        - Wrong PIN or corrupted ciphertext     │
//! │  │   ├── KeyDerivationFailed   - PBKDF2 misconfigured                  │
//! │  │   ├── EncryptionFailed      - AEAD refused to seal                  │
//! │  │   └── InvalidEncoding       - Malformed base64 / IV length          │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── NotFound              - Item not found in the store           │
//! │  │   ├── StorageReadError      - Store could not be read               │
//! │  │   └── StorageWriteError     - Store could not be written            │
//! │  │                                                                      │
//! │  ├── Lookup Errors                                                     │
//! │  │   └── LookupUnavailable     - Speed-limit service unreachable       │
//! │  │                                                                      │
//! │  └── Vault Errors                                                      │
//! │      ├── VaultLocked           - No valid session, re-prompt for PIN   │
//! │      ├── InvalidPin            - PIN does not match verification hash  │
//! │      ├── NoPinConfigured       - Vault PIN has never been set          │
//! │      ├── PinAlreadySet         - Vault PIN cannot be silently replaced │
//! │      ├── InvalidZone           - Geofence zone failed validation       │
//! │      └── InvalidVaultItem      - Vault item failed validation          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//!
//! Cryptographic failures are always surfaced to the caller. Masking them
//! would hand out garbage plaintext. `LookupUnavailable` is the only error
//! that is absorbed inside the crate: the speed monitor falls back to its
//! default limit.

use thiserror::Error;

/// Result type alias for Hearth Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Hearth Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Core Errors (100-199)
    // ========================================================================

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Authentication tag did not verify
    ///
    /// Either the PIN was wrong or the stored data is corrupted. Callers
    /// must never treat this as empty content.
    #[error("Wrong PIN or corrupted vault data.")]
    Authentication,

    /// Key derivation failed
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Stored payload is not decodable
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Item not found in storage
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Failed to read from storage
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to storage
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    // ========================================================================
    // Lookup Errors (500-599)
    // ========================================================================

    /// External speed-limit lookup is unavailable
    #[error("Speed-limit lookup unavailable: {0}")]
    LookupUnavailable(String),

    // ========================================================================
    // Vault Errors (600-699)
    // ========================================================================

    /// The vault session is locked or expired
    #[error("Vault is locked. Enter your PIN to continue.")]
    VaultLocked,

    /// PIN does not match the stored verification hash
    #[error("Incorrect PIN.")]
    InvalidPin,

    /// No PIN has been configured for the vault
    #[error("No vault PIN has been set.")]
    NoPinConfigured,

    /// A PIN is already configured; items are sealed under it
    #[error("A vault PIN is already set.")]
    PinAlreadySet,

    /// Geofence zone failed validation
    #[error("Invalid geofence zone: {0}")]
    InvalidZone(String),

    /// Vault item failed validation
    #[error("Invalid vault item: {0}")]
    InvalidVaultItem(String),

    // ========================================================================
    // Serialization Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Core
    /// - 300-399: Crypto
    /// - 400-499: Storage
    /// - 500-599: Lookup
    /// - 600-699: Vault
    /// - 900-999: Serialization
    pub fn code(&self) -> i32 {
        match self {
            // Core (100-199)
            Error::InvalidConfig(_) => 100,

            // Crypto (300-399)
            Error::Authentication => 300,
            Error::KeyDerivationFailed(_) => 301,
            Error::EncryptionFailed(_) => 302,
            Error::InvalidEncoding(_) => 303,

            // Storage (400-499)
            Error::NotFound(_) => 400,
            Error::StorageReadError(_) => 401,
            Error::StorageWriteError(_) => 402,

            // Lookup (500-599)
            Error::LookupUnavailable(_) => 500,

            // Vault (600-699)
            Error::VaultLocked => 600,
            Error::InvalidPin => 601,
            Error::NoPinConfigured => 602,
            Error::PinAlreadySet => 603,
            Error::InvalidZone(_) => 604,
            Error::InvalidVaultItem(_) => 605,

            // Serialization (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can potentially be resolved by retrying later.
    /// Cryptographic failures are never recoverable by retrying: the same
    /// wrong PIN fails the same way every time.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::LookupUnavailable(_) | Error::StorageReadError(_) | Error::StorageWriteError(_)
        )
    }

    /// Check if this error requires user action
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::Authentication | Error::VaultLocked | Error::InvalidPin | Error::NoPinConfigured
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidEncoding(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidConfig("test".into()).code(), 100);
        assert_eq!(Error::Authentication.code(), 300);
        assert_eq!(Error::NotFound("test".into()).code(), 400);
        assert_eq!(Error::LookupUnavailable("test".into()).code(), 500);
        assert_eq!(Error::VaultLocked.code(), 600);
        assert_eq!(Error::SerializationError("test".into()).code(), 900);
    }

    #[test]
    fn test_authentication_is_distinct_from_not_found() {
        let auth = Error::Authentication;
        let missing = Error::NotFound("item-1".into());

        assert_ne!(auth.code(), missing.code());
        assert!(auth.requires_user_action());
        assert!(!missing.requires_user_action());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::LookupUnavailable("offline".into()).is_recoverable());
        assert!(!Error::Authentication.is_recoverable());
        assert!(!Error::KeyDerivationFailed("bad".into()).is_recoverable());
    }

    #[test]
    fn test_base64_error_conversion() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let err: Error = STANDARD.decode("not base64!!").unwrap_err().into();
        assert!(matches!(err, Error::InvalidEncoding(_)));
        assert_eq!(err.code(), 303);
    }
}
