use super::TokenLedger;
use crate::events::{DexEvent, EventLog};
use crate::execution::{Revertible, TransactionExecutor};
use crate::utils::Token;
use ahash::AHashMap;
use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Observer invoked after a token moves, with the ledger's locks released.
///
/// Stands in for token code that calls back into the exchange mid-transfer.
pub trait TransferHook: Send + Sync {
    fn on_transfer(&self, token: Address, from: Address, to: Address, amount: U256);
}

// Prior value of one entry, written back when a section reverts.
#[derive(Clone, Debug)]
enum Undo {
    Balance((Address, Address), U256),
    Allowance((Address, Address, Address), U256),
    Supply(Address, U256),
}

/// Balances, allowances and supplies of every deployed token.
#[derive(Debug, Default)]
pub struct Accounts {
    // (token, holder) -> balance
    balances: AHashMap<(Address, Address), U256>,
    // (token, owner, spender) -> allowance
    allowances: AHashMap<(Address, Address, Address), U256>,
    supplies: AHashMap<Address, U256>,
    // writes made inside atomic sections, oldest first
    journal: Vec<Undo>,
    recording: bool,
}

impl Accounts {
    fn balance(&self, token: Address, holder: Address) -> U256 {
        self.balances.get(&(token, holder)).copied().unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(token, owner, spender)).copied().unwrap_or_default()
    }

    fn supply(&self, token: Address) -> U256 {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    fn set_balance(&mut self, token: Address, holder: Address, value: U256) {
        let previous = self.balances.insert((token, holder), value).unwrap_or_default();
        if self.recording {
            self.journal.push(Undo::Balance((token, holder), previous));
        }
    }

    fn set_allowance(&mut self, token: Address, owner: Address, spender: Address, value: U256) {
        let previous = self.allowances.insert((token, owner, spender), value).unwrap_or_default();
        if self.recording {
            self.journal.push(Undo::Allowance((token, owner, spender), previous));
        }
    }

    fn set_supply(&mut self, token: Address, value: U256) {
        let previous = self.supplies.insert(token, value).unwrap_or_default();
        if self.recording {
            self.journal.push(Undo::Supply(token, previous));
        }
    }

    // Nothing is written unless the whole move fits.
    fn move_balance(&mut self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        let Some(remaining) = self.balance(token, from).checked_sub(amount) else {
            return false;
        };
        if from == to {
            return true;
        }
        let Some(credited) = self.balance(token, to).checked_add(amount) else {
            return false;
        };
        self.set_balance(token, from, remaining);
        self.set_balance(token, to, credited);
        true
    }

    fn rewind(&mut self, mark: usize) {
        while self.journal.len() > mark {
            match self.journal.pop() {
                Some(Undo::Balance(key, value)) => {
                    self.balances.insert(key, value);
                }
                Some(Undo::Allowance(key, value)) => {
                    self.allowances.insert(key, value);
                }
                Some(Undo::Supply(key, value)) => {
                    self.supplies.insert(key, value);
                }
                None => break,
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LedgerStats {
    pub transfers: AtomicU64,
    pub rejected: AtomicU64,
}

impl LedgerStats {
    pub fn rejection_rate(&self) -> f64 {
        let transfers = self.transfers.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let total = transfers + rejected;
        if total == 0 { 0.0 } else { rejected as f64 / total as f64 }
    }
}

/// Ledger kept in process memory.
///
/// Every read and write runs through the transaction executor, so a thread never observes
/// another thread's section half-done and a revert only undoes the journaled writes of the
/// section that failed.
pub struct InMemoryLedger {
    tokens: DashMap<Address, Token>,
    accounts: RwLock<Accounts>,
    hooks: DashMap<Address, Arc<dyn TransferHook>>,
    events: Arc<EventLog>,
    executor: Arc<TransactionExecutor>,
    pub stats: LedgerStats,
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger").field("tokens", &self.tokens.len()).field("stats", &self.stats).finish()
    }
}

impl InMemoryLedger {
    pub fn new(events: Arc<EventLog>) -> Self {
        Self::with_executor(events, Arc::new(TransactionExecutor::new()))
    }

    pub fn with_executor(events: Arc<EventLog>, executor: Arc<TransactionExecutor>) -> Self {
        Self {
            tokens: DashMap::new(),
            accounts: RwLock::new(Accounts::default()),
            hooks: DashMap::new(),
            events,
            executor,
            stats: LedgerStats::default(),
        }
    }

    /// Register a token so it can be held and moved.
    pub fn deploy(&self, token: Token) -> Address {
        let address = token.get_address();
        debug!(%address, symbol = token.get_symbol(), "Token deployed");
        self.tokens.insert(address, token);
        address
    }

    pub fn token(&self, address: Address) -> Option<Token> {
        self.tokens.get(&address).map(|token| token.value().clone())
    }

    pub fn is_deployed(&self, address: Address) -> bool {
        self.tokens.contains_key(&address)
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.executor.run(|| self.read().supply(token))
    }

    pub fn set_transfer_hook(&self, token: Address, hook: Arc<dyn TransferHook>) {
        self.hooks.insert(token, hook);
    }

    pub fn clear_transfer_hook(&self, token: Address) {
        self.hooks.remove(&token);
    }

    /// Entries waiting to be undone if the running section fails.
    pub fn journal_len(&self) -> usize {
        self.read().journal.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Accounts> {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    // Writes are journaled only when an atomic section encloses the call.
    fn write(&self) -> RwLockWriteGuard<'_, Accounts> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        accounts.recording = self.executor.depth() > 1;
        accounts
    }

    fn reject(&self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(%token, %from, %to, %amount, "Transfer rejected");
        false
    }

    fn settle(&self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        self.stats.transfers.fetch_add(1, Ordering::Relaxed);
        self.events.emit(token, DexEvent::Transfer { from, to, value: amount });

        // clone out of the map so the hook may register or remove hooks itself
        let hook = self.hooks.get(&token).map(|hook| hook.value().clone());
        if let Some(hook) = hook {
            hook.on_transfer(token, from, to, amount);
        }
        true
    }
}

impl TokenLedger for InMemoryLedger {
    fn executor(&self) -> &Arc<TransactionExecutor> {
        &self.executor
    }

    fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.executor.run(|| self.read().balance(token, holder))
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.executor.run(|| self.read().allowance(token, owner, spender))
    }

    fn transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        self.executor.run(|| {
            if !self.is_deployed(token) {
                return self.reject(token, from, to, amount);
            }
            let moved = self.write().move_balance(token, from, to, amount);
            if moved { self.settle(token, from, to, amount) } else { self.reject(token, from, to, amount) }
        })
    }

    fn transfer_from(&self, token: Address, spender: Address, from: Address, to: Address, amount: U256) -> bool {
        self.executor.run(|| {
            if !self.is_deployed(token) {
                return self.reject(token, from, to, amount);
            }
            let moved = {
                let mut accounts = self.write();
                let allowance = accounts.allowance(token, from, spender);
                if allowance < amount || !accounts.move_balance(token, from, to, amount) {
                    false
                } else {
                    if allowance != U256::MAX {
                        accounts.set_allowance(token, from, spender, allowance - amount);
                    }
                    true
                }
            };
            if moved { self.settle(token, from, to, amount) } else { self.reject(token, from, to, amount) }
        })
    }

    fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) -> bool {
        self.executor.run(|| {
            if !self.is_deployed(token) {
                return false;
            }
            self.write().set_allowance(token, owner, spender, amount);
            self.events.emit(token, DexEvent::Approval { owner, spender, value: amount });
            true
        })
    }

    fn mint(&self, token: Address, to: Address, amount: U256) -> bool {
        self.executor.run(|| {
            if !self.is_deployed(token) {
                return false;
            }
            {
                let mut accounts = self.write();
                let (Some(supply), Some(balance)) =
                    (accounts.supply(token).checked_add(amount), accounts.balance(token, to).checked_add(amount))
                else {
                    return false;
                };
                accounts.set_supply(token, supply);
                accounts.set_balance(token, to, balance);
            }
            self.events.emit(token, DexEvent::Transfer { from: Address::ZERO, to, value: amount });
            true
        })
    }
}

/// The snapshot is a journal mark. A top-level section starts from an empty journal.
impl Revertible for InMemoryLedger {
    type Snapshot = usize;

    fn snapshot(&self) -> usize {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if self.executor.depth() <= 1 {
            accounts.journal.clear();
        }
        accounts.journal.len()
    }

    fn restore(&self, mark: usize) {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner).rewind(mark);
    }
}
