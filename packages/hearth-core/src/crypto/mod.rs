//! # Cryptography Module
//!
//! Primitives behind the vault.
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | PBKDF2-HMAC-SHA256 | PIN → item key | Slows down PIN guessing, interoperable with WebCrypto |
//! | AES-256-GCM | Item encryption | AEAD, hardware acceleration |
//! | SHA-256 | PIN verification | Cheap equality check, unrelated to the key |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Derived keys are zeroized when dropped
//! 2. **Secure Random**: Salts and IVs come from `rand::rngs::OsRng`
//! 3. **No IV Reuse**: Every seal draws a fresh IV
//! 4. **No Silent Failure**: A failed tag check is always `Error::Authentication`

mod encryption;
mod kdf;

pub use encryption::{Iv, SealedPayload, VaultCipher, IV_SIZE, TAG_SIZE};
pub use kdf::{
    derive_key, hash_pin, verify_pin, Salt, VaultKey, KEY_SIZE, MIN_KDF_ITERATIONS, SALT_SIZE,
};
