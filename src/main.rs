use std::env;
use std::io;
use std::process;

use account_keeper::{run, AccountsStore, Command, Config, Error, FileStorage, LogFormat};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    if let Err(err) = run_app() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run_app() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let command = Command::parse(env::args().skip(1))?;
    info!(
        dir = %config.accounts_dir.display(),
        key = %config.store.key,
        "opening account storage"
    );

    let storage = FileStorage::new(config.accounts_dir);
    let mut store = AccountsStore::with_options(storage, config.store);
    run(&mut store, command, io::stdout().lock())
}

/// Logs go to stderr so that command output on stdout stays machine-readable.
///
///   RUST_LOG - standard env filter (default: "account_keeper=warn")
fn init_tracing(format: &LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "account_keeper=warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}
