use super::{Revertible, TransactionExecutor};
use crate::errors::{DexError, DexResult};
use crate::events::EventLog;
use crate::ledger::{InMemoryLedger, TokenLedger};
use alloy_primitives::{Address, U256};
use std::sync::Arc;

/// Shared environment of one exchange: the token ledger and the notification log. Calls are
/// made atomic by the ledger's own executor.
#[derive(Debug)]
pub struct Runtime<L> {
    ledger: Arc<L>,
    events: Arc<EventLog>,
}

impl Runtime<InMemoryLedger> {
    pub fn in_memory() -> Self {
        let events = Arc::new(EventLog::new());
        let ledger = Arc::new(InMemoryLedger::new(events.clone()));
        Self::new(ledger, events)
    }
}

impl<L: TokenLedger> Runtime<L> {
    pub fn new(ledger: Arc<L>, events: Arc<EventLog>) -> Self {
        Self { ledger, events }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    pub fn executor(&self) -> &TransactionExecutor {
        self.ledger.executor()
    }

    /// Run `call` so that on failure the ledger, the log and `state` are all restored.
    pub fn atomic<R, T, F>(&self, state: &R, call: F) -> DexResult<T>
    where
        R: Revertible + ?Sized,
        F: FnOnce() -> DexResult<T>,
    {
        self.executor().execute(&(&*self.ledger, &*self.events, state), call)
    }

    pub(crate) fn safe_transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> DexResult<()> {
        if self.ledger.transfer(token, from, to, amount) { Ok(()) } else { Err(DexError::TransferFailed) }
    }

    pub(crate) fn safe_transfer_from(
        &self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> DexResult<()> {
        if self.ledger.transfer_from(token, spender, from, to, amount) { Ok(()) } else { Err(DexError::TransferFailed) }
    }
}
