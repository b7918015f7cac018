//! In-memory refresh-token ledger: outstanding tokens plus the durable
//! denylist.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use uuid::Uuid;

use atelier_auth::{LedgerError, OutstandingToken, RefreshTokenLedger};
use atelier_core::UserId;

#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenLedger {
    outstanding: RwLock<HashMap<Uuid, OutstandingToken>>,
    denylist: RwLock<HashSet<Uuid>>,
}

impl InMemoryRefreshTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> LedgerError {
    LedgerError::Storage(format!("{what} lock poisoned"))
}

impl RefreshTokenLedger for InMemoryRefreshTokenLedger {
    fn record(&self, token: OutstandingToken) -> Result<(), LedgerError> {
        self.outstanding
            .write()
            .map_err(|_| poisoned("outstanding"))?
            .insert(token.jti, token);
        Ok(())
    }

    fn outstanding_for_user(&self, user: UserId) -> Result<Vec<OutstandingToken>, LedgerError> {
        let denylist = self.denylist.read().map_err(|_| poisoned("denylist"))?;
        let outstanding = self
            .outstanding
            .read()
            .map_err(|_| poisoned("outstanding"))?;
        let mut tokens: Vec<OutstandingToken> = outstanding
            .values()
            .filter(|t| t.user_id == user && !denylist.contains(&t.jti))
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        Ok(tokens)
    }

    fn blacklist(&self, jtis: &[Uuid]) -> Result<usize, LedgerError> {
        let mut denylist = self.denylist.write().map_err(|_| poisoned("denylist"))?;
        Ok(jtis.iter().filter(|jti| denylist.insert(**jti)).count())
    }

    fn is_blacklisted(&self, jti: &Uuid) -> Result<bool, LedgerError> {
        Ok(self
            .denylist
            .read()
            .map_err(|_| poisoned("denylist"))?
            .contains(jti))
    }
}
