mod config;
mod csv_utils;
mod dto;
mod error;
mod id;
mod migration;
mod runner;
mod stores;

pub use config::{Config, LogFormat};
pub use dto::{Account, AccountRow, AccountType, ImportRow, NewAccount, RawTags, Tag};
pub use error::{Error, Result};
pub use migration::{decode_accounts, split_legacy_tags, Decoded};
pub use runner::{run, Command, PasswordUpdate, USAGE};
pub use stores::{
    AccountsStore, DurableStore, FileStorage, MemoryStorage, StoreOptions, DEFAULT_STORAGE_KEY,
};
