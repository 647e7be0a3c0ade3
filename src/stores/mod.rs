//! Storage layer for the account keeper. Provides:
//! - The session's account collection and its operations ([`AccountsStore`])
//! - Durable key-value backends it synchronizes to ([`DurableStore`],
//!   [`MemoryStorage`], [`FileStorage`])
//!
//! Current implementation is synchronous: every mutation rewrites the whole
//! collection before returning.

mod accounts;
mod durable;

pub use accounts::{AccountsStore, StoreOptions, DEFAULT_STORAGE_KEY};
pub use durable::{DurableStore, FileStorage, MemoryStorage};
