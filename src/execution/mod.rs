/// Execution Layer
///
/// This layer is responsible for:
/// - Atomic sections with snapshot and restore
/// - Serializing state-changing calls across threads
/// - Moving tokens through the ledger on behalf of pairs and the router
pub mod runtime;
pub mod transaction_executor;

pub use runtime::Runtime;
pub use transaction_executor::*;
