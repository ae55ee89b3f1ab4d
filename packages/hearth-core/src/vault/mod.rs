//! # Vault Module
//!
//! Encrypted per-hub vault: passwords, notes and document references.
//!
//! ## Confidentiality Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         VAULT DATA FLOW                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   PIN ──► SHA-256 ──► compare with stored digest ──► Session Unlocked   │
//! │                                                                         │
//! │   PIN + item salt ──► PBKDF2 ──► key ──► AES-256-GCM ──► plaintext      │
//! │                                   ▲                                     │
//! │                                   └── only while the session is valid   │
//! │                                                                         │
//! │   Store ◄── { ciphertext, salt, iv } + plaintext metadata               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Plaintext never reaches the store. The session holds an expiry, not the
//! PIN: every decryption re-derives the key from a freshly entered PIN.

mod item;
mod service;
mod session;

pub use item::{NewVaultItem, VaultItem, VaultItemKind, VaultItemUpdate};
pub use service::{VaultService, MAX_PIN_LENGTH, MIN_PIN_LENGTH};
pub use session::{SessionState, VaultSession};
