//! Storage traits and implementations
//!
//! This module defines the storage abstraction layer for accounts.
//! The trait-based design allows swapping between in-memory and SQLite
//! storage implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryAccountStore;
pub use sqlite::SqliteAccountStore;
pub use traits::AccountStore;
