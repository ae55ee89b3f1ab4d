//! # Vault Session Gate
//!
//! Tracks whether the vault has been unlocked recently enough to decrypt.
//!
//! ```text
//!                  unlock(pin) + hash match
//!   ┌──────────┐ ─────────────────────────────► ┌─────────────────────────┐
//!   │  Locked  │                                │ Unlocked(now + ttl)     │
//!   │          │ ◄───────────────────────────── │                         │
//!   └──────────┘   lock() / logout              └─────────────────────────┘
//!        ▲                                         │        ▲
//!        │      is_valid(now) with now ≥ expiry    │        │ extend(now)
//!        └─────────────────────────────────────────┘        │ while valid
//!                                                  └────────┘
//! ```
//!
//! Expiry is lazy: there is no timer. The transition to `Locked` happens the
//! next time validity is checked, so [`VaultSession::is_valid`] takes
//! `&mut self`.

use crate::crypto::verify_pin;
use crate::error::{Error, Result};

/// Observable session state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No valid session; the PIN must be entered again
    Locked,
    /// Decryption allowed until `expires_at` (Unix millis, exclusive)
    Unlocked {
        /// First instant at which the session is no longer valid
        expires_at: i64,
    },
}

/// Time-boxed unlock state
///
/// Stores neither the PIN nor any key, only an expiry.
#[derive(Debug)]
pub struct VaultSession {
    state: SessionState,
    ttl_millis: i64,
}

impl VaultSession {
    /// Create a locked session with the given lifetime
    pub fn new(ttl_millis: i64) -> Self {
        Self {
            state: SessionState::Locked,
            ttl_millis,
        }
    }

    /// Raw state, without applying expiry
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Unlock after checking `pin` against the verification digest
    ///
    /// On mismatch the state is left untouched. Returns the new expiry.
    pub fn unlock(&mut self, pin: &str, pin_hash: &str, now: i64) -> Result<i64> {
        if !verify_pin(pin, pin_hash) {
            return Err(Error::InvalidPin);
        }
        let expires_at = now.saturating_add(self.ttl_millis);
        self.state = SessionState::Unlocked { expires_at };
        Ok(expires_at)
    }

    /// Whether decryption is currently allowed
    ///
    /// Has a side effect: an expired session is cleared here and stays
    /// locked afterwards.
    pub fn is_valid(&mut self, now: i64) -> bool {
        match self.state {
            SessionState::Unlocked { expires_at } if now < expires_at => true,
            SessionState::Unlocked { .. } => {
                tracing::debug!("Vault session expired");
                self.state = SessionState::Locked;
                false
            }
            SessionState::Locked => false,
        }
    }

    /// Push the expiry to `now + ttl`
    ///
    /// Only legal while the session is still valid. Extending an expired
    /// session is a no-op that leaves it locked.
    pub fn extend(&mut self, now: i64) -> bool {
        if !self.is_valid(now) {
            return false;
        }
        self.state = SessionState::Unlocked {
            expires_at: now.saturating_add(self.ttl_millis),
        };
        true
    }

    /// Lock immediately
    pub fn lock(&mut self) {
        self.state = SessionState::Locked;
    }

    /// Expiry of a still-valid session
    pub fn expires_at(&mut self, now: i64) -> Option<i64> {
        if !self.is_valid(now) {
            return None;
        }
        match self.state {
            SessionState::Unlocked { expires_at } => Some(expires_at),
            SessionState::Locked => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_pin;

    const TTL: i64 = 15 * 60 * 1000;

    fn unlocked_at(now: i64) -> VaultSession {
        let mut session = VaultSession::new(TTL);
        session.unlock("1234", &hash_pin("1234"), now).unwrap();
        session
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let mut session = VaultSession::new(i64::MAX);
        let expires_at = session.unlock("1234", &hash_pin("1234"), 1_000).unwrap();
        assert_eq!(expires_at, i64::MAX);

        assert!(session.extend(2_000));
        assert!(session.is_valid(i64::MAX - 1));
    }

    #[test]
    fn test_starts_locked() {
        let mut session = VaultSession::new(TTL);
        assert_eq!(session.state(), SessionState::Locked);
        assert!(!session.is_valid(0));
    }

    #[test]
    fn test_unlock_sets_expiry() {
        let session = unlocked_at(1_000);
        assert_eq!(
            session.state(),
            SessionState::Unlocked {
                expires_at: 1_000 + TTL
            }
        );
    }

    #[test]
    fn test_wrong_pin_keeps_locked() {
        let mut session = VaultSession::new(TTL);
        let result = session.unlock("4321", &hash_pin("1234"), 0);

        assert!(matches!(result, Err(Error::InvalidPin)));
        assert_eq!(session.state(), SessionState::Locked);
    }

    #[test]
    fn test_lazy_expiry() {
        let mut session = unlocked_at(0);
        let expiry = TTL;

        assert!(session.is_valid(expiry - 1));
        // Still unlocked: nothing has observed the expiry yet
        assert!(matches!(session.state(), SessionState::Unlocked { .. }));

        assert!(!session.is_valid(expiry + 1));
        assert_eq!(session.state(), SessionState::Locked);

        // Going back in time does not resurrect it
        assert!(!session.is_valid(expiry - 1));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let mut session = unlocked_at(0);
        assert!(!session.is_valid(TTL));
    }

    #[test]
    fn test_extend_while_valid() {
        let mut session = unlocked_at(0);

        assert!(session.extend(TTL - 10));
        assert!(session.is_valid(TTL + 10));
        assert_eq!(session.expires_at(TTL + 10), Some(2 * TTL - 10));
    }

    #[test]
    fn test_extend_after_expiry_is_noop() {
        let mut session = unlocked_at(0);

        assert!(!session.extend(TTL + 1));
        assert_eq!(session.state(), SessionState::Locked);
    }

    #[test]
    fn test_lock() {
        let mut session = unlocked_at(0);
        session.lock();

        assert!(!session.is_valid(1));
        assert_eq!(session.expires_at(1), None);
    }
}
