//! Vault service: PIN management, session gating and item lifecycle.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

use super::item::{NewVaultItem, VaultItem, VaultItemUpdate};
use super::session::VaultSession;
use crate::config::VaultConfig;
use crate::crypto::{hash_pin, verify_pin, VaultCipher};
use crate::error::{Error, Result};
use crate::storage::VaultStore;
use crate::time::Clock;

/// Minimum PIN length
pub const MIN_PIN_LENGTH: usize = 4;

/// Maximum PIN length
pub const MAX_PIN_LENGTH: usize = 64;

/// Encrypted vault for one user
///
/// ## Ordering
///
/// ```text
/// set_pin / restore_pin_hash   (once)
///        │
///        ▼
/// unlock(pin) ──► session valid for ttl
///        │
///        ├──► create_item(.., pin)    seal before any store write
///        ├──► update_content(.., pin) re-seal with a fresh IV
///        └──► reveal(id, pin)         open, extend session
/// ```
///
/// Every operation that produces or consumes plaintext checks the session
/// first and fails with [`Error::VaultLocked`] when it has expired; the
/// caller must then ask for the PIN again rather than reuse anything it
/// decrypted earlier.
pub struct VaultService {
    store: Arc<dyn VaultStore>,
    cipher: VaultCipher,
    clock: Arc<dyn Clock>,
    session: Mutex<VaultSession>,
    pin_hash: RwLock<Option<String>>,
}

impl VaultService {
    /// Create a locked vault over `store`
    pub fn new(
        config: &VaultConfig,
        store: Arc<dyn VaultStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            cipher: VaultCipher::new(config.kdf_iterations)?,
            clock,
            session: Mutex::new(VaultSession::new(config.session_ttl_millis())),
            pin_hash: RwLock::new(None),
        })
    }

    // ========================================================================
    // PIN
    // ========================================================================

    /// Configure the vault PIN for the first time
    ///
    /// Items are sealed under the PIN itself, so an existing PIN is never
    /// replaced here.
    pub fn set_pin(&self, pin: &str) -> Result<()> {
        validate_pin(pin)?;

        let mut pin_hash = self.pin_hash.write();
        if pin_hash.is_some() {
            return Err(Error::PinAlreadySet);
        }
        *pin_hash = Some(hash_pin(pin));

        tracing::info!("Vault PIN configured");
        Ok(())
    }

    /// Load a previously persisted verification digest
    pub fn restore_pin_hash(&self, hash: &str) -> Result<()> {
        let valid = hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(Error::InvalidEncoding(
                "PIN hash must be 64 hex characters".into(),
            ));
        }
        *self.pin_hash.write() = Some(hash.to_ascii_lowercase());
        Ok(())
    }

    /// Verification digest to persist alongside the user profile
    pub fn pin_hash(&self) -> Option<String> {
        self.pin_hash.read().clone()
    }

    /// Whether a PIN has been configured
    pub fn has_pin(&self) -> bool {
        self.pin_hash.read().is_some()
    }

    // ========================================================================
    // SESSION
    // ========================================================================

    /// Unlock the vault with `pin`
    pub fn unlock(&self, pin: &str) -> Result<()> {
        let pin_hash = self.pin_hash.read().clone().ok_or(Error::NoPinConfigured)?;
        let now = self.clock.now_millis();

        match self.session.lock().unlock(pin, &pin_hash, now) {
            Ok(expires_at) => {
                tracing::info!(expires_at, "Vault unlocked");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Vault unlock rejected: incorrect PIN");
                Err(e)
            }
        }
    }

    /// Lock the vault immediately (explicit lock or logout)
    pub fn lock(&self) {
        self.session.lock().lock();
        tracing::info!("Vault locked");
    }

    /// Whether the session is still valid; clears it if expired
    pub fn is_unlocked(&self) -> bool {
        let now = self.clock.now_millis();
        self.session.lock().is_valid(now)
    }

    /// Extend the session on user activity
    pub fn extend_session(&self) -> bool {
        let now = self.clock.now_millis();
        self.session.lock().extend(now)
    }

    /// Expiry of the current session, if still valid
    pub fn session_expires_at(&self) -> Option<i64> {
        let now = self.clock.now_millis();
        self.session.lock().expires_at(now)
    }

    fn require_session(&self) -> Result<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(Error::VaultLocked)
        }
    }

    fn require_pin_match(&self, pin: &str) -> Result<()> {
        let pin_hash = self.pin_hash.read();
        let pin_hash = pin_hash.as_deref().ok_or(Error::NoPinConfigured)?;
        if verify_pin(pin, pin_hash) {
            Ok(())
        } else {
            Err(Error::InvalidPin)
        }
    }

    // ========================================================================
    // ITEMS
    // ========================================================================

    /// Seal `plaintext` and store it as a new item
    ///
    /// The PIN is checked against the verification digest first, so a
    /// mistyped PIN can never seal content under an unknown key.
    pub fn create_item(&self, new: NewVaultItem, plaintext: &str, pin: &str) -> Result<VaultItem> {
        self.require_session()?;
        self.require_pin_match(pin)?;
        new.validate()?;

        let sealed = self.cipher.encrypt(plaintext.as_bytes(), pin, None)?;
        let now = self.clock.now_millis();

        let item = VaultItem {
            id: uuid::Uuid::new_v4().to_string(),
            hub_id: new.hub_id,
            sealed,
            title: new.title,
            kind: new.kind,
            tags: new.tags,
            favorite: new.favorite,
            file_ref: new.file_ref,
            created_at: now,
            updated_at: now,
        };

        self.store.put_item(&item)?;
        tracing::info!(item_id = %item.id, hub_id = %item.hub_id, "Created vault item");
        Ok(item)
    }

    /// Re-seal an item's content
    ///
    /// Keeps the item's salt and draws a fresh IV.
    pub fn update_content(&self, id: &str, plaintext: &str, pin: &str) -> Result<VaultItem> {
        self.require_session()?;
        self.require_pin_match(pin)?;

        let mut item = self.get_item(id)?;
        let salt = item.sealed.salt()?;
        item.sealed = self.cipher.encrypt(plaintext.as_bytes(), pin, Some(&salt))?;
        item.updated_at = self.clock.now_millis();

        self.store.put_item(&item)?;
        tracing::info!(item_id = %id, "Re-encrypted vault item");
        Ok(item)
    }

    /// Change plaintext metadata; the sealed payload is untouched
    pub fn update_metadata(&self, id: &str, update: VaultItemUpdate) -> Result<VaultItem> {
        let mut item = self.get_item(id)?;
        update.apply(&mut item)?;
        item.updated_at = self.clock.now_millis();

        self.store.put_item(&item)?;
        tracing::debug!(item_id = %id, "Updated vault item metadata");
        Ok(item)
    }

    /// Decrypt an item's content
    ///
    /// ## Errors
    ///
    /// - `VaultLocked` when the session is missing or expired
    /// - `NotFound` when the item does not exist
    /// - `Authentication` when the PIN is wrong or the data was altered
    pub fn reveal(&self, id: &str, pin: &str) -> Result<Zeroizing<String>> {
        self.require_session()?;

        let item = self.get_item(id)?;
        let mut bytes = self.cipher.decrypt(&item.sealed, pin).map_err(|e| {
            if matches!(e, Error::Authentication) {
                tracing::warn!(item_id = %id, "Vault item failed authentication");
            }
            e
        })?;

        let raw = std::mem::take(&mut *bytes);
        let text = String::from_utf8(raw).map_err(|e| {
            let mut raw = e.into_bytes();
            raw.zeroize();
            Error::InvalidEncoding("vault item content is not UTF-8".into())
        })?;

        self.extend_session();
        tracing::debug!(item_id = %id, "Revealed vault item");
        Ok(Zeroizing::new(text))
    }

    /// Fetch a sealed item
    pub fn get_item(&self, id: &str) -> Result<VaultItem> {
        self.store
            .get_item(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Sealed items of a hub, oldest first
    pub fn list_items(&self, hub_id: &str) -> Result<Vec<VaultItem>> {
        self.store.list_items(hub_id)
    }

    /// Permanently delete an item
    pub fn delete_item(&self, id: &str) -> Result<()> {
        if !self.store.delete_item(id)? {
            return Err(Error::NotFound(id.to_string()));
        }
        tracing::info!(item_id = %id, "Deleted vault item");
        Ok(())
    }
}

fn validate_pin(pin: &str) -> Result<()> {
    let len = pin.chars().count();
    if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) || pin.trim().is_empty() {
        return Err(Error::InvalidPin);
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
