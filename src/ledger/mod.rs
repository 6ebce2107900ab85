/// Token Ledger
///
/// The balances of the fungible tokens the exchange trades. Pairs and the router only
/// move tokens through [`TokenLedger`]; a `false` return is a refused transfer and is
/// turned into an error by the caller.
pub mod in_memory;

use crate::execution::{Revertible, TransactionExecutor};
use alloy_primitives::{Address, U256};
use std::sync::Arc;

pub use in_memory::{InMemoryLedger, LedgerStats, TransferHook};

pub trait TokenLedger: Revertible + Send + Sync {
    /// Executor that serializes every access to this ledger. Atomic sections of the
    /// exchange run on the same one.
    fn executor(&self) -> &Arc<TransactionExecutor>;

    fn balance_of(&self, token: Address, holder: Address) -> U256;

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256;

    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> bool;

    /// Move `amount` on behalf of `from`, spending the allowance granted to `spender`.
    fn transfer_from(&self, token: Address, spender: Address, from: Address, to: Address, amount: U256) -> bool;

    fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) -> bool;

    /// Credit freshly issued tokens. Used to fund accounts.
    fn mint(&self, token: Address, to: Address, amount: U256) -> bool;
}
