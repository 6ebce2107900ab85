/// Logic Layer - Pair Exchange
///
/// This layer is responsible for:
/// - Constant-product math with the 0.3% swap fee
/// - Deterministic pair identities
/// - The pair engine and its liquidity shares
/// - The factory registry and the router façade
pub mod factory;
pub mod math;
pub mod pair;
pub mod pair_key;
pub mod router;
pub mod shares;


// Re-export key components from the logic layer
pub use factory::Factory;
pub use math::{get_amount_in, get_amount_out, quote, sqrt};
pub use pair::{Pair, PairState, PairStatus};
pub use pair_key::{PairKey, default_pair_code_hash, pair_for, sort_tokens};
pub use router::Router;
pub use shares::ShareLedger;
