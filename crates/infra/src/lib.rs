//! `atelier-infra` — storage backends.
//!
//! In-memory implementations of the store traits, intended for tests/dev and
//! single-process deployments. A relational backend can replace them behind
//! the same traits.

pub mod cache;
pub mod ledger;
pub mod store;

pub use cache::InMemoryTokenCache;
pub use ledger::InMemoryRefreshTokenLedger;
pub use store::{
    InMemoryProjectStore, InMemoryUserStore, ProjectStore, StoreError, UserStore,
};
