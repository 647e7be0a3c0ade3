//! Runtime configuration for the command-line driver.
//!
//! Environment variables (a `.env` file is honoured by the binary):
//!   ACCOUNTS_DIR               - directory for file storage (default: "./data/store")
//!   ACCOUNTS_KEY               - storage key (default: "accounts")
//!   ACCOUNTS_PERSIST_MIGRATED  - "true"/"1" rewrites legacy data on load (default: false)
//!   LOG_FORMAT                 - "json" or "text" (default: "text")

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::stores::{StoreOptions, DEFAULT_STORAGE_KEY};

pub const DEFAULT_ACCOUNTS_DIR: &str = "./data/store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub accounts_dir: PathBuf,
    pub store: StoreOptions,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accounts_dir: PathBuf::from(DEFAULT_ACCOUNTS_DIR),
            store: StoreOptions::default(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let accounts_dir = lookup("ACCOUNTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.accounts_dir);

        let key = lookup("ACCOUNTS_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if key.trim().is_empty() {
            return Err(Error::Config("ACCOUNTS_KEY must not be empty".to_string()));
        }

        let persist_migrated = match lookup("ACCOUNTS_PERSIST_MIGRATED") {
            Some(value) => parse_bool("ACCOUNTS_PERSIST_MIGRATED", &value)?,
            None => defaults.store.persist_migrated,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "LOG_FORMAT must be \"text\" or \"json\", got {other:?}"
                )))
            }
        };

        Ok(Self {
            accounts_dir,
            store: StoreOptions {
                key,
                persist_migrated,
            },
            log_format,
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store.key, "accounts");
        assert!(!config.store.persist_migrated);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ACCOUNTS_DIR", "/tmp/accounts"),
            ("ACCOUNTS_KEY", "accounts_test"),
            ("ACCOUNTS_PERSIST_MIGRATED", "1"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.accounts_dir, PathBuf::from("/tmp/accounts"));
        assert_eq!(config.store.key, "accounts_test");
        assert!(config.store.persist_migrated);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("ACCOUNTS_PERSIST_MIGRATED", "maybe")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("LOG_FORMAT", "xml")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("ACCOUNTS_KEY", " ")]),
            Err(Error::Config(_))
        ));
    }
}
