//! `atelier-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: storage-backed
//! collaborators (the refresh-token ledger, the TTL cache) are injected
//! through the traits defined here.

pub mod claims;
pub mod password;
pub mod policy;
pub mod revocation;
pub mod role;
pub mod token;
pub mod user;

pub use claims::{TokenClaims, TokenUse, TokenValidationError, validate_claims};
pub use password::{PasswordHashError, hash_password, verify_password};
pub use revocation::{
    LedgerError, OutstandingToken, RefreshTokenLedger, RevocationOutcome, RevocationService,
    TokenCache,
};
pub use role::{InvalidRoleError, Role};
pub use token::{IssuedPair, TokenError, TokenIssuer};
pub use user::{Registration, User, UserUpdate};
