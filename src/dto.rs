use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire value of [`AccountType::Local`] in the persisted format.
pub const LOCAL_WIRE_NAME: &str = "Локальная";
/// Wire value of [`AccountType::Ldap`] in the persisted format.
pub const LDAP_WIRE_NAME: &str = "LDAP";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountType {
    #[serde(rename = "Локальная")]
    Local,
    #[serde(rename = "LDAP")]
    Ldap,
}

impl AccountType {
    pub fn wire_name(self) -> &'static str {
        match self {
            AccountType::Local => LOCAL_WIRE_NAME,
            AccountType::Ldap => LDAP_WIRE_NAME,
        }
    }

    /// Parses a command-line or CSV spelling. Accepts the wire names as well
    /// as `local` and `ldap` in any case.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == LOCAL_WIRE_NAME || value.eq_ignore_ascii_case("local") {
            Some(AccountType::Local)
        } else if value.eq_ignore_ascii_case(LDAP_WIRE_NAME) {
            Some(AccountType::Ldap)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub text: String,
    /// Fields this build does not know about, kept for the next write.
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

impl Tag {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub login: String,
    pub password: Option<String>,
    pub tags: Vec<Tag>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// Shape of a `tags` field as it arrives from callers or from storage.
///
/// `List` is the current format, `Legacy` is the old `;`-separated string.
/// `Items` is a list where some element is not a tag; its valid tags are
/// kept. Anything else lands in `Other` and normalizes to no tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<Tag>),
    Legacy(String),
    Items(Vec<Value>),
    Other(Value),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::List(Vec::new())
    }
}

impl From<Vec<Tag>> for RawTags {
    fn from(tags: Vec<Tag>) -> Self {
        RawTags::List(tags)
    }
}

/// Input for [`AccountsStore::add_account`](crate::AccountsStore::add_account):
/// an account without an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAccount {
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub tags: RawTags,
}

impl NewAccount {
    pub fn new(account_type: AccountType, login: impl Into<String>) -> Self {
        Self {
            account_type,
            login: login.into(),
            password: None,
            tags: RawTags::default(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<RawTags>) -> Self {
        self.tags = tags.into();
        self
    }
}

/// One row of the `list` output.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountRow {
    pub id: String,
    #[serde(rename = "type")]
    pub account_type: &'static str,
    pub login: String,
    pub has_password: bool,
    pub tags: String,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            account_type: account.account_type.wire_name(),
            login: account.login.clone(),
            has_password: account.password.is_some(),
            tags: crate::migration::join_tags(&account.tags),
        }
    }
}

/// One row of an `import` file: `type,login,password,tags`.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ImportRow {
    #[serde(rename = "type")]
    pub account_type: String,
    pub login: String,
    pub password: Option<String>,
    #[serde(default)]
    pub tags: String,
}
