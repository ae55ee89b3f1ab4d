//! # Key Derivation
//!
//! Turns a low-entropy PIN into a vault key, and into an unrelated
//! verification digest.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    TWO ONE-WAY TRANSFORMS OF THE PIN                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │                              PIN "1234"                                 │
//! │                                  │                                      │
//! │              ┌───────────────────┴───────────────────┐                  │
//! │              ▼                                       ▼                  │
//! │  ┌───────────────────────────┐       ┌───────────────────────────┐     │
//! │  │  VERIFICATION DIGEST      │       │  VAULT KEY                │     │
//! │  │                           │       │                           │     │
//! │  │  SHA-256(pin) → hex       │       │  PBKDF2-HMAC-SHA256(      │     │
//! │  │                           │       │    password = pin,        │     │
//! │  │  Stored. Compared at      │       │    salt = item salt (16B),│     │
//! │  │  unlock time only.        │       │    rounds ≥ 100,000       │     │
//! │  │                           │       │  ) → 32 bytes             │     │
//! │  │                           │       │                           │     │
//! │  │                           │       │  Never stored, never      │     │
//! │  │                           │       │  exported.                │     │
//! │  └───────────────────────────┘       └───────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The digest is never fed into the key derivation. A leaked verification
//! digest therefore gives no shortcut to any item key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::Hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Minimum PBKDF2 rounds accepted anywhere in the crate
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Size of a per-item salt in bytes (128 bits)
pub const SALT_SIZE: usize = 16;

/// Size of the derived key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Per-item PBKDF2 salt
///
/// A fresh salt is drawn for every vault item at creation time. Sharing a
/// salt between items lets identical plaintexts under the same PIN be
/// correlated, so nothing in this crate reuses one across items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generate a cryptographically random salt
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Encode for storage
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode a stored salt
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded)?;
        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidEncoding(format!(
                "salt must be {} bytes, got {}",
                SALT_SIZE,
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

/// A 256-bit AES-GCM key derived from a PIN
///
/// Only usable for vault encryption inside this crate: the bytes are not
/// exposed publicly, and they are zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(..)")
    }
}

/// Derive a vault key from a PIN and salt with PBKDF2-HMAC-SHA256
///
/// Deterministic for identical `(secret, salt, iterations)`.
///
/// ## Errors
///
/// `KeyDerivationFailed` when `iterations` is below
/// [`MIN_KDF_ITERATIONS`] or the primitive rejects its parameters.
pub fn derive_key(secret: &str, salt: &Salt, iterations: u32) -> Result<VaultKey> {
    if iterations < MIN_KDF_ITERATIONS {
        return Err(Error::KeyDerivationFailed(format!(
            "{} PBKDF2 rounds is below the minimum of {}",
            iterations, MIN_KDF_ITERATIONS
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(secret.as_bytes(), salt.as_bytes(), iterations, &mut key)
        .map_err(|_| Error::KeyDerivationFailed("PBKDF2 rejected output length".into()))?;

    let derived = VaultKey(key);
    key.zeroize();
    Ok(derived)
}

/// Hash a PIN for unlock-time verification
///
/// Returns the lowercase hex SHA-256 digest. This value must never be used
/// as key material.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

/// Compare a PIN against a stored verification digest
pub fn verify_pin(pin: &str, expected_hash: &str) -> bool {
    let actual = hash_pin(pin);
    let expected = expected_hash.to_ascii_lowercase();
    if actual.len() != expected.len() {
        return false;
    }
    // Fold over every byte so the comparison time does not leak the prefix length
    actual
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let salt = Salt::from_bytes([7u8; SALT_SIZE]);

        let key1 = derive_key("1234", &salt, MIN_KDF_ITERATIONS).unwrap();
        let key2 = derive_key("1234", &salt, MIN_KDF_ITERATIONS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salts_different_keys() {
        let key1 = derive_key("1234", &Salt::from_bytes([1u8; 16]), MIN_KDF_ITERATIONS).unwrap();
        let key2 = derive_key("1234", &Salt::from_bytes([2u8; 16]), MIN_KDF_ITERATIONS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_weak_iteration_count_rejected() {
        let result = derive_key("1234", &Salt::random(), 1_000);
        assert!(matches!(result, Err(Error::KeyDerivationFailed(_))));
    }

    #[test]
    fn test_random_salts_differ() {
        assert_ne!(Salt::random(), Salt::random());
    }

    #[test]
    fn test_salt_base64() {
        let salt = Salt::random();
        let decoded = Salt::from_base64(&salt.to_base64()).unwrap();
        assert_eq!(salt, decoded);

        let short = STANDARD.encode([0u8; 8]);
        assert!(matches!(
            Salt::from_base64(&short),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_hash_pin_known_vector() {
        // SHA-256("1234")
        assert_eq!(
            hash_pin("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn test_verify_pin() {
        let stored = hash_pin("1234");
        assert!(verify_pin("1234", &stored));
        assert!(verify_pin("1234", &stored.to_uppercase()));
        assert!(!verify_pin("4321", &stored));
        assert!(!verify_pin("1234", "abc"));
    }

    #[test]
    fn test_pin_hash_is_not_key_material() {
        let salt = Salt::from_bytes([9u8; SALT_SIZE]);
        let key = derive_key("1234", &salt, MIN_KDF_ITERATIONS).unwrap();
        let digest = hex::decode(hash_pin("1234")).unwrap();

        assert_ne!(key.as_bytes().as_slice(), digest.as_slice());
    }
}
