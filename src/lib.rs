// Three-Layer Architecture
pub mod ledger; // Token balances the exchange custodies and moves
pub mod logic; // Pair engine, factory registry, router
pub mod execution; // Atomic sections over the shared runtime

pub mod config;
pub mod constants;
pub mod dex;
pub mod errors;
pub mod events;

// Common utilities and types
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export key components from each layer
pub use config::{DexConfigRoot, DexConfigSection};
pub use dex::Dex;
pub use errors::{DexError, DexResult};
pub use events::{DexEvent, EmittedEvent, EventLog};
pub use execution::{Revertible, Runtime, TransactionExecutor};
pub use ledger::{InMemoryLedger, TokenLedger, TransferHook};
pub use logic::{Factory, Pair, PairKey, PairStatus, Router, get_amount_in, get_amount_out, quote};
pub use utils::{DexConfigLoader, DexConfigLoaderSync, LoadConfigError, Token};
