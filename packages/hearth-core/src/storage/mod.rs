//! # Storage Module
//!
//! Persistence boundary for vault items.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE BOUNDARY                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   VaultService ──(sealed items only)──► VaultStore                      │
//! │                                            │                            │
//! │                       ┌────────────────────┴──────────────────┐         │
//! │                       ▼                                       ▼         │
//! │            MemoryVaultStore                      Hosted document store  │
//! │            (JSON documents in a map,             (implemented by the    │
//! │             tests and offline use)                host application)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items reach the store already encrypted. A store never sees a PIN, a
//! key, or plaintext.

mod memory;

pub use memory::MemoryVaultStore;

use crate::error::Result;
use crate::vault::VaultItem;

/// Document store holding sealed vault items
pub trait VaultStore: Send + Sync {
    /// Insert or replace an item
    fn put_item(&self, item: &VaultItem) -> Result<()>;

    /// Fetch an item by id
    fn get_item(&self, id: &str) -> Result<Option<VaultItem>>;

    /// Remove an item; returns whether it existed
    fn delete_item(&self, id: &str) -> Result<bool>;

    /// All items owned by a hub, oldest first
    fn list_items(&self, hub_id: &str) -> Result<Vec<VaultItem>>;
}
