use tracing::{debug, error, info, warn};

use crate::dto::{Account, AccountType, NewAccount, RawTags};
use crate::id::generate_unique_id;
use crate::migration::{decode_accounts, normalize_tags};
use crate::stores::DurableStore;

pub const DEFAULT_STORAGE_KEY: &str = "accounts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Key the whole collection is stored under.
    pub key: String,
    /// Rewrite storage right after loading if any record's tags had to be
    /// migrated or normalized.
    /// Off by default: migrated data is written by the next mutation.
    pub persist_migrated: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            persist_migrated: false,
        }
    }
}

/// The session's authoritative list of accounts, kept in sync with a
/// [`DurableStore`].
///
/// Every mutation rewrites the whole list to storage. Storage failures, on
/// load or on write, are logged and never reach the caller.
pub struct AccountsStore<S> {
    accounts: Vec<Account>,
    loading: bool,
    storage: S,
    options: StoreOptions,
}

impl<S: DurableStore> AccountsStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, StoreOptions::default())
    }

    pub fn with_options(storage: S, options: StoreOptions) -> Self {
        Self {
            accounts: Vec::new(),
            loading: false,
            storage,
            options,
        }
    }

    /// Loads the persisted list, migrating legacy string tags.
    ///
    /// Call once per session before mutating: any mutation persists the whole
    /// collection, so mutating first would overwrite what is stored.
    /// Missing data leaves the collection empty. Unreadable or malformed data
    /// is logged and discarded.
    pub fn initialize(&mut self) {
        let raw = match self.storage.get(&self.options.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.options.key, "no stored accounts");
                self.accounts.clear();
                return;
            }
            Err(e) => {
                error!(key = %self.options.key, error = %e, "failed to read stored accounts");
                self.accounts.clear();
                return;
            }
        };

        match decode_accounts(&raw) {
            Ok(decoded) => {
                self.accounts = decoded.accounts;
                debug!(count = self.accounts.len(), "loaded stored accounts");
                if decoded.skipped > 0 {
                    warn!(skipped = decoded.skipped, "left out malformed stored accounts");
                }
                if decoded.migrated > 0 {
                    info!(migrated = decoded.migrated, "migrated stored tags");
                    if self.options.persist_migrated {
                        self.persist();
                    }
                }
            }
            Err(e) => {
                error!(key = %self.options.key, error = %e, "discarding malformed stored accounts");
                self.accounts.clear();
            }
        }
    }

    /// Adds an account under a freshly generated id and appends it to the
    /// collection. Tags in any shape other than a list are dropped, as are
    /// list elements that are not tags.
    pub fn add_account(&mut self, account: NewAccount) -> &Account {
        let accounts = &self.accounts;
        let id = generate_unique_id(|id| accounts.iter().any(|a| a.id == id));
        let tags = match account.tags {
            RawTags::Other(serde_json::Value::Null) => Vec::new(),
            RawTags::Legacy(_) => {
                warn!(login = %account.login, "ignoring tags that are not a list");
                Vec::new()
            }
            tags => normalize_tags(tags),
        };

        self.accounts.push(Account {
            id,
            account_type: account.account_type,
            login: account.login,
            password: account.password,
            tags,
            extra: Default::default(),
        });
        self.persist();

        let index = self.accounts.len() - 1;
        &self.accounts[index]
    }

    /// Replaces the account with the same id, keeping its position.
    /// Returns `false` without persisting if there is no such account.
    pub fn update_account(&mut self, account: Account) -> bool {
        match self.position(&account.id) {
            Some(index) => {
                self.accounts[index] = account;
                self.persist();
                true
            }
            None => {
                debug!(id = %account.id, "update skipped, no such account");
                false
            }
        }
    }

    /// Removes the account with the given id.
    /// Returns `false` without persisting if there is no such account.
    pub fn delete_account(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.accounts.remove(index);
                self.persist();
                true
            }
            None => {
                debug!(id, "delete skipped, no such account");
                false
            }
        }
    }

    pub fn clear_accounts(&mut self) {
        self.accounts.clear();
        self.persist();
    }

    /// Writes the whole collection under the storage key.
    pub fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.accounts) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!(error = %e, "failed to serialize accounts");
                return;
            }
        };
        match self.storage.set(&self.options.key, &serialized) {
            Ok(()) => debug!(
                key = %self.options.key,
                count = self.accounts.len(),
                "persisted accounts"
            ),
            Err(e) => error!(key = %self.options.key, error = %e, "failed to persist accounts"),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.accounts.iter().position(|account| account.id == id)
    }
}

impl<S> AccountsStore<S> {
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn local_accounts(&self) -> impl Iterator<Item = &Account> {
        self.of_type(AccountType::Local)
    }

    pub fn ldap_accounts(&self) -> impl Iterator<Item = &Account> {
        self.of_type(AccountType::Ldap)
    }

    pub fn has_local_accounts(&self) -> bool {
        self.local_accounts().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Always `false` for now: loading is synchronous.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |account| account.account_type == account_type)
    }
}
