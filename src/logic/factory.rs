use super::pair::Pair;
use super::pair_key::PairKey;
use crate::errors::{DexError, DexResult};
use crate::events::DexEvent;
use crate::execution::{Revertible, Runtime};
use crate::ledger::TokenLedger;
use alloy_primitives::{Address, B256};
use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Registry of pairs. Each unordered token pair maps to exactly one [`Pair`], living at
/// the address derived from the factory address, the sorted tokens and the pair code hash.
pub struct Factory<L> {
    address: Address,
    pair_code_hash: B256,
    runtime: Arc<Runtime<L>>,
    registry: DashMap<PairKey, Arc<Pair<L>>>,
    pairs_by_address: DashMap<Address, PairKey>,
    all_pairs: RwLock<Vec<Address>>,
}

impl<L> std::fmt::Debug for Factory<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("address", &self.address)
            .field("pair_code_hash", &self.pair_code_hash)
            .field("pairs", &self.registry.len())
            .finish()
    }
}

impl<L: TokenLedger> Factory<L> {
    pub fn new(address: Address, pair_code_hash: B256, runtime: Arc<Runtime<L>>) -> Self {
        Self {
            address,
            pair_code_hash,
            runtime,
            registry: DashMap::new(),
            pairs_by_address: DashMap::new(),
            all_pairs: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn pair_code_hash(&self) -> B256 {
        self.pair_code_hash
    }

    pub fn runtime(&self) -> &Arc<Runtime<L>> {
        &self.runtime
    }

    pub fn create_pair(&self, token_a: Address, token_b: Address) -> DexResult<Arc<Pair<L>>> {
        self.runtime.atomic(self, || {
            let key = PairKey::new(token_a, token_b)?;
            if self.registry.contains_key(&key) {
                return Err(DexError::PairExists);
            }

            let address = key.pair_address(self.address, self.pair_code_hash);
            let pair = Arc::new(Pair::new(address, self.address, self.runtime.clone()));
            pair.initialize(self.address, key.token0, key.token1)?;

            self.registry.insert(key, pair.clone());
            self.pairs_by_address.insert(address, key);
            self.all_pairs.write().unwrap_or_else(PoisonError::into_inner).push(address);

            self.runtime.events().emit(self.address, DexEvent::PairCreated { token0: key.token0, token1: key.token1, pair: address });
            info!(%key, pair = %address, total = self.all_pairs_length(), "Pair created");
            Ok(pair)
        })
    }

    /// Order-insensitive lookup. Invalid token combinations simply have no pair.
    pub fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Arc<Pair<L>>> {
        let key = PairKey::new(token_a, token_b).ok()?;
        self.registry.get(&key).map(|pair| pair.value().clone())
    }

    pub fn pair_address(&self, token_a: Address, token_b: Address) -> Option<Address> {
        self.get_pair(token_a, token_b).map(|pair| pair.address())
    }

    pub fn pair_by_address(&self, address: Address) -> Option<Arc<Pair<L>>> {
        let key = *self.pairs_by_address.get(&address)?;
        self.registry.get(&key).map(|pair| pair.value().clone())
    }

    pub fn all_pairs(&self) -> Vec<Address> {
        self.all_pairs.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn all_pairs_length(&self) -> usize {
        self.all_pairs.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// The registry only grows, so a snapshot is its length.
impl<L> Revertible for Factory<L> {
    type Snapshot = usize;

    fn snapshot(&self) -> usize {
        self.all_pairs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn restore(&self, snapshot: usize) {
        let removed: Vec<Address> = {
            let mut all_pairs = self.all_pairs.write().unwrap_or_else(PoisonError::into_inner);
            let start = snapshot.min(all_pairs.len());
            all_pairs.drain(start..).collect()
        };
        for address in removed {
            if let Some((_, key)) = self.pairs_by_address.remove(&address) {
                self.registry.remove(&key);
                debug!(%key, pair = %address, "Pair creation reverted");
            }
        }
    }
}
