//! Account store persisted as a JSON document on disk.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use waveguard_core::TowerKind;
use waveguard_simulation::{AccountRecord, AccountStore, AuthToken, StoreError};

/// Accounts keyed by token, rewritten in full after every change.
#[derive(Debug)]
pub(crate) struct JsonFileAccountStore {
    path: PathBuf,
    accounts: BTreeMap<AuthToken, AccountRecord>,
}

impl JsonFileAccountStore {
    /// Loads the store at `path`; a missing file is an empty store.
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        let accounts = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|error| StoreError::Unavailable(error.to_string()))?,
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(StoreError::Unavailable(error.to_string())),
        };

        Ok(Self {
            path: path.to_path_buf(),
            accounts,
        })
    }

    /// Creates the account with `record` unless it already exists.
    pub(crate) fn register(
        &mut self,
        token: &AuthToken,
        record: AccountRecord,
    ) -> Result<(), StoreError> {
        if self.accounts.contains_key(token) {
            return Ok(());
        }
        let _ = self.accounts.insert(token.clone(), record);
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.accounts)
            .map_err(|error| StoreError::Unavailable(error.to_string()))?;
        fs::write(&self.path, json).map_err(|error| StoreError::Unavailable(error.to_string()))
    }

    fn account_mut(&mut self, token: &AuthToken) -> Result<&mut AccountRecord, StoreError> {
        self.accounts
            .get_mut(token)
            .ok_or(StoreError::UnknownAccount)
    }
}

impl AccountStore for JsonFileAccountStore {
    fn user_money(&self, token: &AuthToken) -> Result<u64, StoreError> {
        self.accounts
            .get(token)
            .map(|record| record.money)
            .ok_or(StoreError::UnknownAccount)
    }

    fn set_user_money(&mut self, token: &AuthToken, money: u64) -> Result<(), StoreError> {
        self.account_mut(token)?.money = money;
        self.save()
    }

    fn unlocked_towers(&self, token: &AuthToken) -> Result<BTreeSet<TowerKind>, StoreError> {
        self.accounts
            .get(token)
            .map(|record| record.unlocked.clone())
            .ok_or(StoreError::UnknownAccount)
    }

    fn unlock_tower(&mut self, token: &AuthToken, kind: TowerKind) -> Result<(), StoreError> {
        let _ = self.account_mut(token)?.unlocked.insert(kind);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        process,
        time::{SystemTime, UNIX_EPOCH},
    };

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!(
            "waveguard-{name}-{}-{nanos}.json",
            process::id()
        ))
    }

    #[test]
    fn missing_file_opens_empty() {
        let path = scratch_path("missing");
        let store = JsonFileAccountStore::open(&path).expect("missing file is empty");

        assert!(matches!(
            store.user_money(&AuthToken::new("anyone")),
            Err(StoreError::UnknownAccount)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn writes_survive_reopening() {
        let path = scratch_path("roundtrip");
        let token = AuthToken::new("player-1");
        {
            let mut store = JsonFileAccountStore::open(&path).expect("store opens");
            store
                .register(&token, AccountRecord::default())
                .expect("register persists");
            store.set_user_money(&token, 640).expect("money persists");
            store
                .unlock_tower(&token, TowerKind::Mortar)
                .expect("unlock persists");
        }

        let reopened = JsonFileAccountStore::open(&path).expect("store reopens");
        assert_eq!(reopened.user_money(&token).expect("known account"), 640);
        assert_eq!(
            reopened.unlocked_towers(&token).expect("known account"),
            BTreeSet::from([TowerKind::Mortar])
        );

        fs::remove_file(&path).expect("scratch file removed");
    }

    #[test]
    fn register_keeps_existing_accounts() {
        let path = scratch_path("register");
        let token = AuthToken::new("player-2");
        let mut store = JsonFileAccountStore::open(&path).expect("store opens");
        store
            .register(
                &token,
                AccountRecord {
                    money: 90,
                    unlocked: BTreeSet::new(),
                },
            )
            .expect("register persists");
        store
            .register(&token, AccountRecord::default())
            .expect("second register is a no-op");

        assert_eq!(store.user_money(&token).expect("known account"), 90);
        fs::remove_file(&path).expect("scratch file removed");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = scratch_path("corrupt");
        fs::write(&path, "{ not json").expect("scratch file written");

        let error = JsonFileAccountStore::open(&path).expect_err("corrupt file rejected");
        assert!(matches!(error, StoreError::Unavailable(_)));
        fs::remove_file(&path).expect("scratch file removed");
    }
}
