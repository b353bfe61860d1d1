//! Application state handed to every command.
//!
//! `CoreState` owns the ledger and is built explicitly at startup
//! instead of living in globals. The ledger sits behind a `Mutex`: the
//! SQLite connection inside it is `Send` but not `Sync`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::authorization::{self, AccessDecision, Action};
use crate::config;
use crate::db::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
use crate::ledger::{Ledger, LedgerError};
use crate::models::User;

pub struct CoreState {
    ledger: Mutex<Ledger>,
}

impl CoreState {
    /// Build state over an already opened store.
    pub fn with_store(store: Box<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let ledger = Ledger::load(store)?;
        Ok(Self {
            ledger: Mutex::new(ledger),
        })
    }

    /// Open the SQLite store at `path`.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        tracing::info!(path = %path.display(), "Opening clinic store");
        let store = SqliteStore::open(path)?;
        Self::with_store(Box::new(store))
    }

    /// Open the store at the default location under the app data directory.
    pub fn open_default() -> Result<Self, CoreError> {
        Self::open(&config::store_path())
    }

    /// Volatile state (for testing).
    pub fn in_memory() -> Result<Self, CoreError> {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    // ── Ledger access ───────────────────────────────────────

    pub fn lock_ledger(&self) -> Result<MutexGuard<'_, Ledger>, CoreError> {
        self.ledger.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Logged-in user, if any (owned copy).
    pub fn current_user(&self) -> Result<Option<User>, CoreError> {
        Ok(self.lock_ledger()?.current_user().cloned())
    }

    /// Logged-in user or `NotLoggedIn`.
    pub fn require_user(&self) -> Result<User, CoreError> {
        self.current_user()?.ok_or(CoreError::NotLoggedIn)
    }

    /// Check `action` for the logged-in user.
    pub fn authorize(&self, action: Action) -> Result<AccessDecision, CoreError> {
        let user = self.current_user()?;
        Ok(authorization::check_access(user.as_ref(), action))
    }
}

/// Errors from state access.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Please login first")]
    NotLoggedIn,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        Self::Ledger(LedgerError::Store(e))
    }
}
