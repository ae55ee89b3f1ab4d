//! # Vault Encryption
//!
//! AES-256-GCM encryption of vault payloads under a PIN-derived key.
//!
//! ## Sealing Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      VAULT ITEM ENCRYPTION                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Salt (fresh 16 random bytes per item, or the item's own)      │
//! │                                                                         │
//! │  Step 2: Key = PBKDF2-HMAC-SHA256(pin, salt, rounds)                   │
//! │                                                                         │
//! │  Step 3: IV (fresh 12 random bytes, every single seal)                 │
//! │                                                                         │
//! │  Step 4: AES-256-GCM(key, iv, plaintext) → ciphertext + 16-byte tag    │
//! │                                                                         │
//! │  Output: SealedPayload { ciphertext, salt, iv }   (all base64)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three fields are meaningless on their own and always travel
//! together. Opening re-derives the key from the re-entered PIN and the
//! stored salt; any mismatch in PIN, salt, IV or ciphertext shows up as
//! [`Error::Authentication`].

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::kdf::{derive_key, Salt, VaultKey, MIN_KDF_ITERATIONS};
use crate::error::{Error, Result};

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// An AES-GCM initialization vector
///
/// **Never reuse an IV with the same key.** Every call to
/// [`VaultCipher::encrypt`] draws a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    /// Generate a cryptographically random IV
    pub fn random() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }

    fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded)?;
        let bytes: [u8; IV_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidEncoding(format!("IV must be {} bytes, got {}", IV_SIZE, b.len()))
        })?;
        Ok(Self(bytes))
    }
}

/// Ciphertext, salt and IV of one sealed secret, base64 encoded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    /// Ciphertext with the 16-byte tag appended
    pub ciphertext: String,
    /// PBKDF2 salt
    pub salt: String,
    /// AES-GCM IV
    pub iv: String,
}

impl SealedPayload {
    /// Decode the stored salt
    pub fn salt(&self) -> Result<Salt> {
        Salt::from_base64(&self.salt)
    }
}

/// PIN-keyed AES-256-GCM cipher
///
/// Holds no key material, only the KDF cost. Each call derives its key from
/// the explicit inputs and drops it before returning.
#[derive(Clone, Copy, Debug)]
pub struct VaultCipher {
    iterations: u32,
}

impl Default for VaultCipher {
    fn default() -> Self {
        Self {
            iterations: MIN_KDF_ITERATIONS,
        }
    }
}

impl VaultCipher {
    /// Create a cipher with the given PBKDF2 cost
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations < MIN_KDF_ITERATIONS {
            return Err(Error::KeyDerivationFailed(format!(
                "{} PBKDF2 rounds is below the minimum of {}",
                iterations, MIN_KDF_ITERATIONS
            )));
        }
        Ok(Self { iterations })
    }

    /// PBKDF2 rounds used by this cipher
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive the key for `(secret, salt)`
    pub fn derive_key(&self, secret: &str, salt: &Salt) -> Result<VaultKey> {
        derive_key(secret, salt, self.iterations)
    }

    /// Encrypt `plaintext` under `secret`
    ///
    /// A fresh salt is generated when `salt` is `None`. The IV is always
    /// fresh.
    ///
    /// ## Example
    ///
    /// ```ignore
    /// let cipher = VaultCipher::default();
    /// let sealed = cipher.encrypt(b"mysecret", "1234", None)?;
    /// let opened = cipher.decrypt(&sealed, "1234")?;
    /// ```
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        secret: &str,
        salt: Option<&Salt>,
    ) -> Result<SealedPayload> {
        let salt = salt.copied().unwrap_or_else(Salt::random);
        let key = self.derive_key(secret, &salt)?;
        let iv = Iv::random();

        let ciphertext = seal(&key, &iv, plaintext)?;

        Ok(SealedPayload {
            ciphertext: STANDARD.encode(ciphertext),
            salt: salt.to_base64(),
            iv: STANDARD.encode(iv.as_bytes()),
        })
    }

    /// Decrypt a sealed payload with `secret`
    ///
    /// ## Errors
    ///
    /// - `Authentication` if the tag does not verify: wrong PIN, or the
    ///   ciphertext, salt or IV were altered
    /// - `InvalidEncoding` if a field is not base64 or has the wrong length
    pub fn decrypt(&self, sealed: &SealedPayload, secret: &str) -> Result<Zeroizing<Vec<u8>>> {
        let salt = sealed.salt()?;
        let iv = Iv::from_base64(&sealed.iv)?;
        let ciphertext = STANDARD.decode(&sealed.ciphertext)?;
        if ciphertext.len() < TAG_SIZE {
            return Err(Error::InvalidEncoding(format!(
                "ciphertext shorter than the {}-byte tag",
                TAG_SIZE
            )));
        }

        let key = self.derive_key(secret, &salt)?;
        open(&key, &iv, &ciphertext).map(Zeroizing::new)
    }
}

fn seal(key: &VaultKey, iv: &Iv, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    cipher
        .encrypt(AesNonce::from_slice(iv.as_bytes()), plaintext)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))
}

fn open(key: &VaultKey, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::KeyDerivationFailed(format!("Invalid key: {}", e)))?;

    cipher
        .decrypt(AesNonce::from_slice(iv.as_bytes()), ciphertext)
        .map_err(|_| Error::Authentication)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_bit(encoded: &str, index: usize, mask: u8) -> String {
        let mut bytes = STANDARD.decode(encoded).unwrap();
        bytes[index] ^= mask;
        STANDARD.encode(bytes)
    }

    fn flip_first_bit(encoded: &str) -> String {
        flip_bit(encoded, 0, 0x01)
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = VaultCipher::default();

        let sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();
        let opened = cipher.decrypt(&sealed, "1234").unwrap();

        assert_eq!(opened.as_slice(), b"mysecret");
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let cipher = VaultCipher::default();

        let sealed = cipher.encrypt(b"", "1234", None).unwrap();
        let opened = cipher.decrypt(&sealed, "1234").unwrap();

        assert!(opened.is_empty());
    }

    #[test]
    fn test_wrong_pin_is_authentication_error() {
        let cipher = VaultCipher::default();

        let sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();
        let result = cipher.decrypt(&sealed, "4321");

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_wrong_secret_with_explicit_salt() {
        let cipher = VaultCipher::default();
        let salt = Salt::random();

        let sealed = cipher.encrypt(b"note", "s2", Some(&salt)).unwrap();
        assert_eq!(sealed.salt, salt.to_base64());

        let result = cipher.decrypt(&sealed, "s1");
        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = VaultCipher::default();
        let mut sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        sealed.ciphertext = flip_first_bit(&sealed.ciphertext);

        assert!(matches!(
            cipher.decrypt(&sealed, "1234"),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let cipher = VaultCipher::default();
        let mut sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        let mut bytes = STANDARD.decode(&sealed.ciphertext).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x80;
        sealed.ciphertext = STANDARD.encode(bytes);

        assert!(matches!(
            cipher.decrypt(&sealed, "1234"),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_tampered_salt_fails() {
        let cipher = VaultCipher::default();
        let mut sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        sealed.salt = flip_first_bit(&sealed.salt);

        assert!(matches!(
            cipher.decrypt(&sealed, "1234"),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_tampered_iv_fails() {
        let cipher = VaultCipher::default();
        let mut sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        sealed.iv = flip_first_bit(&sealed.iv);

        assert!(matches!(
            cipher.decrypt(&sealed, "1234"),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn test_any_flipped_bit_fails() {
        let cipher = VaultCipher::default();
        let sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        // "mysecret" is 8 bytes of body followed by the 16-byte tag
        for (index, mask) in [(0, 0x01), (3, 0x10), (7, 0x80), (8, 0x02), (15, 0x40), (23, 0x04)] {
            let mut tampered = sealed.clone();
            tampered.ciphertext = flip_bit(&sealed.ciphertext, index, mask);
            assert!(
                matches!(cipher.decrypt(&tampered, "1234"), Err(Error::Authentication)),
                "ciphertext byte {} survived a flip",
                index
            );
        }

        for (index, mask) in [(7, 0x08), (15, 0x80)] {
            let mut tampered = sealed.clone();
            tampered.salt = flip_bit(&sealed.salt, index, mask);
            assert!(
                matches!(cipher.decrypt(&tampered, "1234"), Err(Error::Authentication)),
                "salt byte {} survived a flip",
                index
            );
        }

        for (index, mask) in [(5, 0x20), (11, 0x01)] {
            let mut tampered = sealed.clone();
            tampered.iv = flip_bit(&sealed.iv, index, mask);
            assert!(
                matches!(cipher.decrypt(&tampered, "1234"), Err(Error::Authentication)),
                "IV byte {} survived a flip",
                index
            );
        }
    }

    #[test]
    fn test_fresh_salt_and_iv_per_call() {
        let cipher = VaultCipher::default();

        let a = cipher.encrypt(b"same", "1234", None).unwrap();
        let b = cipher.encrypt(b"same", "1234", None).unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_malformed_fields_are_encoding_errors() {
        let cipher = VaultCipher::default();
        let sealed = cipher.encrypt(b"mysecret", "1234", None).unwrap();

        let mut bad_iv = sealed.clone();
        bad_iv.iv = STANDARD.encode([0u8; 8]);
        assert!(matches!(
            cipher.decrypt(&bad_iv, "1234"),
            Err(Error::InvalidEncoding(_))
        ));

        let mut bad_ct = sealed.clone();
        bad_ct.ciphertext = "%%%".into();
        assert!(matches!(
            cipher.decrypt(&bad_ct, "1234"),
            Err(Error::InvalidEncoding(_))
        ));

        let mut short_ct = sealed;
        short_ct.ciphertext = STANDARD.encode([0u8; 4]);
        assert!(matches!(
            cipher.decrypt(&short_ct, "1234"),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_ciphertext_carries_tag() {
        let cipher = VaultCipher::default();
        let sealed = cipher.encrypt(b"abc", "1234", None).unwrap();

        let ct = STANDARD.decode(&sealed.ciphertext).unwrap();
        assert_eq!(ct.len(), 3 + TAG_SIZE);
        assert_eq!(STANDARD.decode(&sealed.iv).unwrap().len(), IV_SIZE);
    }

    #[test]
    fn test_cipher_rejects_weak_cost() {
        assert!(VaultCipher::new(10).is_err());
        assert_eq!(VaultCipher::new(200_000).unwrap().iterations(), 200_000);
    }
}
