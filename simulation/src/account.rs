//! Persistence collaborator holding a player's money and unlocked towers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waveguard_core::TowerKind;

/// Opaque credential identifying the account a match persists to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps the provided credential.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw credential value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Failure reported by an account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The token does not name a known account.
    #[error("no account is registered for the provided token")]
    UnknownAccount,
    /// The backing storage could not be reached or written.
    #[error("account storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent state of a single account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Money carried between matches.
    #[serde(default)]
    pub money: u64,
    /// Tower kinds the account has unlocked.
    #[serde(default)]
    pub unlocked: BTreeSet<TowerKind>,
}

/// Storage of per-account money and unlocks.
///
/// Callers treat every write as fire-and-forget: a failure is reported to the
/// player and never retried.
pub trait AccountStore {
    /// Money stored for the account.
    fn user_money(&self, token: &AuthToken) -> Result<u64, StoreError>;

    /// Replaces the money stored for the account.
    fn set_user_money(&mut self, token: &AuthToken, money: u64) -> Result<(), StoreError>;

    /// Tower kinds the account has unlocked.
    fn unlocked_towers(&self, token: &AuthToken) -> Result<BTreeSet<TowerKind>, StoreError>;

    /// Records that the account unlocked `kind`.
    fn unlock_tower(&mut self, token: &AuthToken, kind: TowerKind) -> Result<(), StoreError>;
}

/// Account store kept entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: BTreeMap<AuthToken, AccountRecord>,
    offline: bool,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the record stored for `token`.
    pub fn insert(&mut self, token: AuthToken, record: AccountRecord) {
        let _ = self.accounts.insert(token, record);
    }

    /// Record stored for `token`, if any.
    #[must_use]
    pub fn record(&self, token: &AuthToken) -> Option<&AccountRecord> {
        self.accounts.get(token)
    }

    /// Makes every subsequent operation fail as if the storage were unreachable.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn account(&self, token: &AuthToken) -> Result<&AccountRecord, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("store is offline".to_owned()));
        }
        self.accounts.get(token).ok_or(StoreError::UnknownAccount)
    }

    fn account_mut(&mut self, token: &AuthToken) -> Result<&mut AccountRecord, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("store is offline".to_owned()));
        }
        self.accounts
            .get_mut(token)
            .ok_or(StoreError::UnknownAccount)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn user_money(&self, token: &AuthToken) -> Result<u64, StoreError> {
        self.account(token).map(|record| record.money)
    }

    fn set_user_money(&mut self, token: &AuthToken, money: u64) -> Result<(), StoreError> {
        self.account_mut(token)?.money = money;
        Ok(())
    }

    fn unlocked_towers(&self, token: &AuthToken) -> Result<BTreeSet<TowerKind>, StoreError> {
        self.account(token).map(|record| record.unlocked.clone())
    }

    fn unlock_tower(&mut self, token: &AuthToken, kind: TowerKind) -> Result<(), StoreError> {
        let _ = self.account_mut(token)?.unlocked.insert(kind);
        Ok(())
    }
}
