use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::{
    csv_utils::{read_csv, write_csv},
    dto::{AccountRow, AccountType, ImportRow, NewAccount},
    error::{Error, Result},
    migration::split_legacy_tags,
    stores::{AccountsStore, DurableStore},
};

pub const USAGE: &str = "Usage: account-keeper <command>

Commands:
  list [local|ldap]                          print accounts as CSV
  add <local|ldap> <login> [password] [tags] add an account, tags as \"a;b\"
  update <id> <login> [password] [tags]      change an account's login, password or tags;
                                             --no-password as the password clears it
  delete <id>                                remove an account
  clear                                      remove all accounts
  import <file.csv>                          add accounts from type,login,password,tags rows
  migrate                                    rewrite stored data in the current format";

pub const CLEAR_PASSWORD_ARG: &str = "--no-password";

/// What `update` does to the stored password.
#[derive(Debug, PartialEq)]
pub enum PasswordUpdate {
    Keep,
    Clear,
    Set(String),
}

impl PasswordUpdate {
    fn from_arg(arg: Option<String>) -> Self {
        match arg {
            None => PasswordUpdate::Keep,
            Some(arg) if arg == CLEAR_PASSWORD_ARG => PasswordUpdate::Clear,
            Some(password) => PasswordUpdate::Set(password),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    List(Option<AccountType>),
    Add {
        account_type: AccountType,
        login: String,
        password: Option<String>,
        tags: Option<String>,
    },
    Update {
        id: String,
        login: String,
        password: PasswordUpdate,
        tags: Option<String>,
    },
    Delete(String),
    Clear,
    Import(PathBuf),
    Migrate,
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let usage = || Error::Usage(USAGE.to_string());
        let arg = |index: usize| args.get(index).cloned();

        let command = match args.first().map(String::as_str) {
            Some("list") if args.len() <= 2 => match args.get(1) {
                None => Command::List(None),
                Some(kind) => Command::List(Some(parse_type(kind)?)),
            },
            Some("add") if (3..=5).contains(&args.len()) => Command::Add {
                account_type: parse_type(&args[1])?,
                login: args[2].clone(),
                password: arg(3),
                tags: arg(4),
            },
            Some("update") if (3..=5).contains(&args.len()) => Command::Update {
                id: args[1].clone(),
                login: args[2].clone(),
                password: PasswordUpdate::from_arg(arg(3)),
                tags: arg(4),
            },
            Some("delete") if args.len() == 2 => Command::Delete(args[1].clone()),
            Some("clear") if args.len() == 1 => Command::Clear,
            Some("import") if args.len() == 2 => Command::Import(PathBuf::from(&args[1])),
            Some("migrate") if args.len() == 1 => Command::Migrate,
            _ => return Err(usage()),
        };
        Ok(command)
    }
}

fn parse_type(value: &str) -> Result<AccountType> {
    AccountType::parse(value)
        .ok_or_else(|| Error::Usage(format!("unknown account type {value:?}, expected local or ldap")))
}

/// Runs one command as a session against the store: loads the stored
/// accounts, applies the command and writes any output to `writer`.
///
/// # Errors
/// Returns an error if:
/// * The command refers to an account that does not exist
/// * The import file cannot be read or contains an invalid row
/// * Writing to the output fails
pub fn run<S, W>(store: &mut AccountsStore<S>, command: Command, mut writer: W) -> Result<()>
where
    S: DurableStore,
    W: Write,
{
    store.initialize();

    match command {
        Command::List(filter) => {
            let rows = store
                .accounts()
                .iter()
                .filter(|account| filter.map_or(true, |t| account.account_type == t))
                .map(AccountRow::from);
            write_csv(writer, rows)?;
        }
        Command::Add {
            account_type,
            login,
            password,
            tags,
        } => {
            let mut account = NewAccount::new(account_type, login);
            account.password = password;
            if let Some(tags) = tags {
                account = account.with_tags(split_legacy_tags(&tags));
            }
            let id = &store.add_account(account).id;
            writeln!(writer, "{id}")?;
        }
        Command::Update {
            id,
            login,
            password,
            tags,
        } => {
            let mut account = store
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::AccountNotFound(id.clone()))?;
            account.login = login;
            match password {
                PasswordUpdate::Keep => {}
                PasswordUpdate::Clear => account.password = None,
                PasswordUpdate::Set(password) => account.password = Some(password),
            }
            if let Some(tags) = tags {
                account.tags = split_legacy_tags(&tags);
            }
            store.update_account(account);
        }
        Command::Delete(id) => {
            if !store.delete_account(&id) {
                return Err(Error::AccountNotFound(id));
            }
        }
        Command::Clear => store.clear_accounts(),
        Command::Import(path) => {
            let count = import(store, path)?;
            writeln!(writer, "imported {count} accounts")?;
        }
        Command::Migrate => {
            store.persist();
            writeln!(writer, "rewrote {} accounts", store.len())?;
        }
    }
    Ok(())
}

/// Adds every row of the CSV file. All rows are validated before the first
/// one is added, so a bad file changes nothing.
fn import<S: DurableStore>(store: &mut AccountsStore<S>, path: PathBuf) -> Result<usize> {
    let rows = read_csv::<ImportRow, _>(&path)?.collect::<csv::Result<Vec<_>>>()?;

    let mut accounts = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let account_type = AccountType::parse(&row.account_type).ok_or_else(|| {
            // +2 for the header and 1-based numbering
            Error::Usage(format!(
                "{}:{}: unknown account type {:?}",
                path.display(),
                index + 2,
                row.account_type
            ))
        })?;
        let mut account = NewAccount::new(account_type, row.login)
            .with_tags(split_legacy_tags(&row.tags));
        account.password = row.password;
        accounts.push(account);
    }

    let count = accounts.len();
    for account in accounts {
        store.add_account(account);
    }
    info!(count, path = %path.display(), "imported accounts");
    Ok(count)
}
