use super::factory::Factory;
use super::math;
use super::pair::Pair;
use super::pair_key::{self, PairKey};
use crate::errors::{DexError, DexResult};
use crate::execution::Runtime;
use crate::ledger::TokenLedger;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::info;

/// Stateless entry point for liquidity providers and traders.
///
/// Every operation is one atomic section: tokens are pulled from `caller` with the
/// allowance granted to the router's address, then the pair is called with the router as
/// sender. Any failure leaves balances, reserves and the registry untouched.
pub struct Router<L> {
    address: Address,
    factory: Arc<Factory<L>>,
    runtime: Arc<Runtime<L>>,
}

impl<L> std::fmt::Debug for Router<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("address", &self.address).field("factory", &self.factory).finish()
    }
}

impl<L: TokenLedger> Router<L> {
    pub fn new(address: Address, factory: Arc<Factory<L>>) -> Self {
        let runtime = factory.runtime().clone();
        Self { address, factory, runtime }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> &Arc<Factory<L>> {
        &self.factory
    }

    pub fn quote(&self, amount_a: U256, reserve_a: U256, reserve_b: U256) -> DexResult<U256> {
        math::quote(amount_a, reserve_a, reserve_b)
    }

    pub fn get_amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> DexResult<U256> {
        math::get_amount_out(amount_in, reserve_in, reserve_out)
    }

    pub fn get_amount_in(&self, amount_out: U256, reserve_in: U256, reserve_out: U256) -> DexResult<U256> {
        math::get_amount_in(amount_out, reserve_in, reserve_out)
    }

    pub fn sort_tokens(&self, token_a: Address, token_b: Address) -> DexResult<(Address, Address)> {
        pair_key::sort_tokens(token_a, token_b)
    }

    /// Address of the pair for two tokens, computed without touching the registry.
    pub fn pair_for(&self, token_a: Address, token_b: Address) -> DexResult<Address> {
        pair_key::pair_for(self.factory.address(), self.factory.pair_code_hash(), token_a, token_b)
    }

    /// Reserves of an existing pair, ordered as `(token_a, token_b)`.
    pub fn get_reserves(&self, token_a: Address, token_b: Address) -> DexResult<(U256, U256)> {
        let pair = self.existing_pair(token_a, token_b)?;
        Self::reserves_of(&pair, token_a)
    }

    pub fn add_liquidity(
        &self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
        to: Address,
    ) -> DexResult<(U256, U256, U256)> {
        self.runtime.atomic(&*self.factory, || {
            let pair = match self.factory.get_pair(token_a, token_b) {
                Some(pair) => pair,
                None => self.factory.create_pair(token_a, token_b)?,
            };
            let (reserve_a, reserve_b) = Self::reserves_of(&pair, token_a)?;
            let (amount_a, amount_b) = if reserve_a.is_zero() && reserve_b.is_zero() {
                (amount_a_desired, amount_b_desired)
            } else {
                let amount_b_optimal = math::quote(amount_a_desired, reserve_a, reserve_b)?;
                if amount_b_optimal <= amount_b_desired {
                    (amount_a_desired, amount_b_optimal)
                } else {
                    (math::quote(amount_b_desired, reserve_b, reserve_a)?, amount_b_desired)
                }
            };

            self.runtime.safe_transfer_from(token_a, self.address, caller, pair.address(), amount_a)?;
            self.runtime.safe_transfer_from(token_b, self.address, caller, pair.address(), amount_b)?;
            let liquidity = pair.mint(self.address, to)?;

            info!(pair = %pair.address(), %caller, %amount_a, %amount_b, %liquidity, "Liquidity added");
            Ok((amount_a, amount_b, liquidity))
        })
    }

    /// Burn `liquidity` shares of `caller` for the underlying tokens, returned in
    /// `(token_a, token_b)` order. There is no minimum-output bound.
    pub fn remove_liquidity(
        &self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        to: Address,
    ) -> DexResult<(U256, U256)> {
        let pair = self.existing_pair(token_a, token_b)?;
        self.runtime.atomic(&*pair, || {
            pair.transfer_from(self.address, caller, pair.address(), liquidity)?;
            let (amount0, amount1) = pair.burn(self.address, to)?;
            let (amount_a, amount_b) = if Self::is_token0(&pair, token_a)? { (amount0, amount1) } else { (amount1, amount0) };

            info!(pair = %pair.address(), %caller, %liquidity, %amount_a, %amount_b, "Liquidity removed");
            Ok((amount_a, amount_b))
        })
    }

    pub fn swap_exact_tokens_for_tokens(
        &self,
        caller: Address,
        amount_in: U256,
        amount_out_min: U256,
        token_in: Address,
        token_out: Address,
        to: Address,
    ) -> DexResult<U256> {
        let pair = self.existing_pair(token_in, token_out)?;
        self.runtime.atomic(&*pair, || {
            let (reserve_in, reserve_out) = Self::reserves_of(&pair, token_in)?;
            let amount_out = math::get_amount_out(amount_in, reserve_in, reserve_out)?;
            if amount_out < amount_out_min {
                return Err(DexError::InsufficientOutputAmount);
            }
            self.swap(&pair, caller, token_in, amount_in, amount_out, to)?;
            Ok(amount_out)
        })
    }

    pub fn swap_tokens_for_exact_tokens(
        &self,
        caller: Address,
        amount_out: U256,
        amount_in_max: U256,
        token_in: Address,
        token_out: Address,
        to: Address,
    ) -> DexResult<U256> {
        let pair = self.existing_pair(token_in, token_out)?;
        self.runtime.atomic(&*pair, || {
            let (reserve_in, reserve_out) = Self::reserves_of(&pair, token_in)?;
            let amount_in = math::get_amount_in(amount_out, reserve_in, reserve_out)?;
            if amount_in > amount_in_max {
                return Err(DexError::ExcessiveInputAmount);
            }
            self.swap(&pair, caller, token_in, amount_in, amount_out, to)?;
            Ok(amount_in)
        })
    }

    fn swap(
        &self,
        pair: &Pair<L>,
        caller: Address,
        token_in: Address,
        amount_in: U256,
        amount_out: U256,
        to: Address,
    ) -> DexResult<()> {
        self.runtime.safe_transfer_from(token_in, self.address, caller, pair.address(), amount_in)?;
        let (amount0_out, amount1_out) =
            if Self::is_token0(pair, token_in)? { (U256::ZERO, amount_out) } else { (amount_out, U256::ZERO) };
        pair.swap(self.address, amount0_out, amount1_out, to)?;
        info!(pair = %pair.address(), %caller, %token_in, %amount_in, %amount_out, "Swapped");
        Ok(())
    }

    fn existing_pair(&self, token_a: Address, token_b: Address) -> DexResult<Arc<Pair<L>>> {
        PairKey::new(token_a, token_b)?;
        self.factory.get_pair(token_a, token_b).ok_or(DexError::PairNotFound)
    }

    fn is_token0(pair: &Pair<L>, token: Address) -> DexResult<bool> {
        let (token0, _) = pair.tokens()?;
        Ok(token == token0)
    }

    fn reserves_of(pair: &Pair<L>, token_a: Address) -> DexResult<(U256, U256)> {
        let (reserve0, reserve1) = pair.get_reserves();
        Ok(if Self::is_token0(pair, token_a)? { (reserve0, reserve1) } else { (reserve1, reserve0) })
    }
}
