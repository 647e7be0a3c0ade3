//! Decoding of persisted account lists, including the legacy tag format.
//!
//! Older builds stored `tags` as one `;`-separated string. Records are
//! decoded through [`StoredAccount`], whose `tags` field keeps whatever shape
//! was on disk, and then normalized into [`Account`] with a tag list.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::dto::{Account, AccountType, RawTags, Tag};
use crate::error::Result;

const LEGACY_TAG_SEPARATOR: char = ';';

/// A record exactly as found in storage. A missing or `null` `tags` field is
/// `None`.
#[derive(Debug, Deserialize)]
pub struct StoredAccount {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub login: String,
    pub password: Option<String>,
    #[serde(default)]
    pub tags: Option<RawTags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredAccount {
    /// True unless `tags` is already a clean list of tags.
    pub fn needs_rewrite(&self) -> bool {
        !matches!(self.tags, Some(RawTags::List(_)))
    }

    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            account_type: self.account_type,
            login: self.login,
            password: self.password,
            tags: self.tags.map(normalize_tags).unwrap_or_default(),
            extra: self.extra,
        }
    }
}

/// Result of decoding a persisted list.
#[derive(Debug, Default)]
pub struct Decoded {
    pub accounts: Vec<Account>,
    /// Records whose stored `tags` had to be rewritten into a tag list.
    pub migrated: usize,
    /// Records that could not be decoded and were left out.
    pub skipped: usize,
}

/// Parses the persisted JSON array and normalizes every record, in order.
///
/// Fails only if the payload is not a JSON array. A record that does not
/// decode (unknown type, missing login) is logged and skipped, the others
/// are kept.
pub fn decode_accounts(raw: &str) -> Result<Decoded> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let mut decoded = Decoded {
        accounts: Vec::with_capacity(records.len()),
        ..Decoded::default()
    };

    for (index, record) in records.into_iter().enumerate() {
        match StoredAccount::deserialize(record) {
            Ok(stored) => {
                if stored.needs_rewrite() {
                    decoded.migrated += 1;
                }
                decoded.accounts.push(stored.into_account());
            }
            Err(e) => {
                error!(index, error = %e, "skipping malformed stored account");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

/// Converts any tag shape into a tag list. Elements of a list that are not
/// tags are dropped one by one. Any other shape becomes an empty list.
pub fn normalize_tags(tags: RawTags) -> Vec<Tag> {
    match tags {
        RawTags::List(tags) => tags,
        RawTags::Legacy(raw) => split_legacy_tags(&raw),
        RawTags::Items(items) => keep_tag_items(items),
        RawTags::Other(value) => {
            warn!(tags = %value, "dropping tags that are not a list");
            Vec::new()
        }
    }
}

fn keep_tag_items(items: Vec<Value>) -> Vec<Tag> {
    items
        .into_iter()
        .filter_map(|item| match Tag::deserialize(&item) {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!(item = %item, error = %e, "dropping malformed tag");
                None
            }
        })
        .collect()
}

/// Splits `"a; b ;;c"` into `[a, b, c]`: pieces are trimmed and empty ones
/// dropped, in their original order.
pub fn split_legacy_tags(raw: &str) -> Vec<Tag> {
    raw.split(LEGACY_TAG_SEPARATOR)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(Tag::new)
        .collect()
}

/// Inverse of [`split_legacy_tags`] for tags without separators in them.
pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.text.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|tag| tag.text.as_str()).collect()
    }

    #[test]
    fn test_split_legacy_tags() {
        assert_eq!(texts(&split_legacy_tags("x; y ;;z")), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_split_legacy_tags_keeps_duplicates_and_order() {
        assert_eq!(
            texts(&split_legacy_tags("b;a;b")),
            vec!["b", "a", "b"]
        );
    }

    #[test]
    fn test_split_legacy_tags_blank_input() {
        assert!(split_legacy_tags("").is_empty());
        assert!(split_legacy_tags(" ; ;  ").is_empty());
    }

    #[test]
    fn test_split_keeps_inner_whitespace() {
        assert_eq!(
            texts(&split_legacy_tags("  team lead ;dev")),
            vec!["team lead", "dev"]
        );
    }

    #[test]
    fn test_decode_legacy_record() {
        let raw = r#"[{"id":"1","type":"Локальная","login":"a","password":null,"tags":"x; y ;;z"}]"#;
        let decoded = decode_accounts(raw).unwrap();
        assert_eq!(decoded.migrated, 1);
        assert_eq!(
            decoded.accounts,
            vec![Account {
                id: "1".to_string(),
                account_type: AccountType::Local,
                login: "a".to_string(),
                password: None,
                tags: vec![Tag::new("x"), Tag::new("y"), Tag::new("z")],
                extra: Map::new(),
            }]
        );
    }

    #[test]
    fn test_decode_current_record_passes_through() {
        let raw = r#"[{"id":"2","type":"LDAP","login":"b","password":"pw","tags":[{"text":"k"},{"text":"k"}]}]"#;
        let decoded = decode_accounts(raw).unwrap();
        assert_eq!(decoded.migrated, 0);
        assert_eq!(decoded.accounts[0].password.as_deref(), Some("pw"));
        assert_eq!(texts(&decoded.accounts[0].tags), vec!["k", "k"]);
    }

    #[test]
    fn test_decode_mixed_preserves_order() {
        let raw = r#"[
            {"id":"1","type":"LDAP","login":"a","password":null,"tags":[]},
            {"id":"2","type":"Локальная","login":"b","password":null,"tags":"t"},
            {"id":"3","type":"LDAP","login":"c","password":null,"tags":[{"text":"u"}]}
        ]"#;
        let decoded = decode_accounts(raw).unwrap();
        let ids: Vec<_> = decoded.accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(decoded.migrated, 1);
        assert_eq!(texts(&decoded.accounts[1].tags), vec!["t"]);
    }

    #[test]
    fn test_decode_odd_tag_shapes_become_empty() {
        let raw = r#"[
            {"id":"1","type":"LDAP","login":"a","password":null,"tags":null},
            {"id":"2","type":"LDAP","login":"b","password":null,"tags":42},
            {"id":"3","type":"LDAP","login":"c","password":null}
        ]"#;
        let decoded = decode_accounts(raw).unwrap();
        assert_eq!(decoded.accounts.len(), 3);
        assert_eq!(decoded.migrated, 3);
        assert!(decoded.accounts.iter().all(|a| a.tags.is_empty()));
    }

    #[test]
    fn test_decode_keeps_valid_items_of_mixed_tag_list() {
        let raw = r#"[{"id":"1","type":"LDAP","login":"a","password":null,
            "tags":[{"text":"keep"},{"label":"x"},{"text":7},"loose",{"text":"also"}]}]"#;
        let decoded = decode_accounts(raw).unwrap();
        assert_eq!(texts(&decoded.accounts[0].tags), vec!["keep", "also"]);
        assert_eq!(decoded.migrated, 1);
    }

    #[test]
    fn test_decode_skips_only_malformed_records() {
        let raw = r#"[
            {"id":"1","type":"LDAP","login":"a","password":null,"tags":[{"text":"t"}]},
            {"id":"2","type":"Admin","login":"b","password":null,"tags":[]},
            {"id":"3","type":"LDAP","password":null,"tags":[]},
            "junk",
            {"id":"5","type":"Локальная","login":"e","password":null,"tags":"u"}
        ]"#;
        let decoded = decode_accounts(raw).unwrap();
        let ids: Vec<_> = decoded.accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        assert_eq!(decoded.skipped, 3);
        assert_eq!(decoded.migrated, 1);
    }

    #[test]
    fn test_decode_keeps_unknown_fields() {
        let raw = r#"[{"id":"1","type":"LDAP","login":"a","password":null,"owner":"ops",
            "tags":[{"text":"t","color":"red"}]}]"#;
        let decoded = decode_accounts(raw).unwrap();
        let account = &decoded.accounts[0];
        assert_eq!(account.extra["owner"], "ops");
        assert_eq!(account.tags[0].extra["color"], "red");
        assert_eq!(decoded.migrated, 0);
    }

    #[test]
    fn test_decode_malformed_input() {
        assert!(decode_accounts("{not json").is_err());
        assert!(decode_accounts(r#"{"id":"1"}"#).is_err());
        assert!(decode_accounts("42").is_err());
    }

    #[test]
    fn test_join_tags() {
        assert_eq!(join_tags(&[Tag::new("a"), Tag::new("b")]), "a;b");
        assert_eq!(join_tags(&[]), "");
    }
}
