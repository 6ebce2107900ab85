use super::math::{checked_mul, checked_sub, sqrt};
use super::shares::ShareLedger;
use crate::constants::{BURN_ADDRESS, FEE_PRECISION, FEE_RATE, MAX_RESERVE, MINIMUM_LIQUIDITY};
use crate::errors::{DexError, DexResult};
use crate::events::DexEvent;
use crate::execution::{Revertible, Runtime};
use crate::ledger::TokenLedger;
use alloy_primitives::{Address, U256};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PairStatus {
    #[default]
    Uninitialized,
    Active {
        token0: Address,
        token1: Address,
    },
}

#[derive(Clone, Debug, Default)]
pub struct PairState {
    status: PairStatus,
    reserve0: U256,
    reserve1: U256,
    shares: ShareLedger,
}

/// One pool of two tokens and the liquidity shares issued against it.
///
/// Deposits follow a two-phase protocol: tokens are moved to the pair's address first and
/// the pair infers the amounts by comparing its balances with the last synced reserves.
pub struct Pair<L> {
    address: Address,
    factory: Address,
    runtime: Arc<Runtime<L>>,
    unlocked: AtomicBool,
    state: RwLock<PairState>,
}

// Released on every exit path of a mutating entry point.
struct LockGuard<'a> {
    unlocked: &'a AtomicBool,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.unlocked.store(true, Ordering::Release);
    }
}

impl<L> Debug for Pair<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Pair")
            .field("address", &self.address)
            .field("status", &state.status)
            .field("reserve0", &state.reserve0)
            .field("reserve1", &state.reserve1)
            .field("total_supply", &state.shares.total_supply())
            .finish()
    }
}

impl<L> Pair<L> {
    fn read(&self) -> RwLockReadGuard<'_, PairState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PairState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: TokenLedger> Pair<L> {
    pub fn new(address: Address, factory: Address, runtime: Arc<Runtime<L>>) -> Self {
        Self { address, factory, runtime, unlocked: AtomicBool::new(true), state: RwLock::new(PairState::default()) }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn status(&self) -> PairStatus {
        self.view(|state| state.status)
    }

    pub fn tokens(&self) -> DexResult<(Address, Address)> {
        match self.status() {
            PairStatus::Active { token0, token1 } => Ok((token0, token1)),
            PairStatus::Uninitialized => Err(DexError::NotInitialized),
        }
    }

    pub fn get_reserves(&self) -> (U256, U256) {
        self.view(|state| (state.reserve0, state.reserve1))
    }

    pub fn total_supply(&self) -> U256 {
        self.view(|state| state.shares.total_supply())
    }

    pub fn balance_of(&self, holder: Address) -> U256 {
        self.view(|state| state.shares.balance_of(holder))
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.view(|state| state.shares.allowance(owner, spender))
    }

    /// `reserve0 * reserve1` at the last sync.
    pub fn k_last(&self) -> DexResult<U256> {
        let (reserve0, reserve1) = self.get_reserves();
        checked_mul(reserve0, reserve1)
    }

    pub fn is_locked(&self) -> bool {
        !self.unlocked.load(Ordering::Acquire)
    }

    /// One-time binding of the pair to its tokens, callable only by the creating factory.
    pub fn initialize(&self, caller: Address, token0: Address, token1: Address) -> DexResult<()> {
        if caller != self.factory {
            return Err(DexError::Forbidden);
        }
        self.runtime.atomic(self, || {
            let mut state = self.write();
            if state.status != PairStatus::Uninitialized {
                return Err(DexError::AlreadyInitialized);
            }
            state.status = PairStatus::Active { token0, token1 };
            debug!(pair = %self.address, %token0, %token1, "Pair initialized");
            Ok(())
        })
    }

    /// Issue shares to `to` for whatever was deposited since the last sync.
    pub fn mint(&self, caller: Address, to: Address) -> DexResult<U256> {
        self.runtime.atomic(self, || {
            let _lock = self.lock()?;
            let (token0, token1) = self.tokens()?;
            let (reserve0, reserve1) = self.get_reserves();
            let (balance0, balance1) = self.balances(token0, token1);
            let amount0 = checked_sub(balance0, reserve0)?;
            let amount1 = checked_sub(balance1, reserve1)?;

            let total_supply = self.total_supply();
            let liquidity = if total_supply.is_zero() {
                let root = sqrt(checked_mul(amount0, amount1)?);
                if root <= MINIMUM_LIQUIDITY {
                    return Err(DexError::InsufficientLiquidityMinted);
                }
                // permanently locks the first MINIMUM_LIQUIDITY shares
                self.mint_shares(BURN_ADDRESS, MINIMUM_LIQUIDITY)?;
                root - MINIMUM_LIQUIDITY
            } else {
                let by0 = checked_mul(amount0, total_supply)? / reserve0;
                let by1 = checked_mul(amount1, total_supply)? / reserve1;
                by0.min(by1)
            };
            if liquidity.is_zero() {
                return Err(DexError::InsufficientLiquidityMinted);
            }

            self.mint_shares(to, liquidity)?;
            self.update(balance0, balance1)?;
            self.emit(DexEvent::Mint { sender: caller, amount0, amount1 });
            info!(pair = %self.address, %to, %amount0, %amount1, %liquidity, "Mint");
            Ok(liquidity)
        })
    }

    /// Redeem the shares held by the pair itself for a proportional part of both balances.
    pub fn burn(&self, caller: Address, to: Address) -> DexResult<(U256, U256)> {
        self.runtime.atomic(self, || {
            let _lock = self.lock()?;
            let (token0, token1) = self.tokens()?;
            let (balance0, balance1) = self.balances(token0, token1);
            let liquidity = self.balance_of(self.address);
            let total_supply = self.total_supply();
            if total_supply.is_zero() {
                return Err(DexError::InsufficientLiquidityBurned);
            }

            let amount0 = checked_mul(liquidity, balance0)? / total_supply;
            let amount1 = checked_mul(liquidity, balance1)? / total_supply;
            if amount0.is_zero() || amount1.is_zero() {
                return Err(DexError::InsufficientLiquidityBurned);
            }

            self.burn_shares(self.address, liquidity)?;
            self.runtime.safe_transfer(token0, self.address, to, amount0)?;
            self.runtime.safe_transfer(token1, self.address, to, amount1)?;

            let (balance0, balance1) = self.balances(token0, token1);
            self.update(balance0, balance1)?;
            self.emit(DexEvent::Burn { sender: caller, amount0, amount1, to });
            info!(pair = %self.address, %to, %amount0, %amount1, %liquidity, "Burn");
            Ok((amount0, amount1))
        })
    }

    /// Send the requested outputs to `to`, then require enough input to keep the fee-adjusted
    /// product of the balances at or above the product of the reserves.
    pub fn swap(&self, caller: Address, amount0_out: U256, amount1_out: U256, to: Address) -> DexResult<()> {
        self.runtime.atomic(self, || {
            let _lock = self.lock()?;
            if amount0_out.is_zero() && amount1_out.is_zero() {
                return Err(DexError::InsufficientOutputAmount);
            }
            let (token0, token1) = self.tokens()?;
            let (reserve0, reserve1) = self.get_reserves();
            if amount0_out >= reserve0 || amount1_out >= reserve1 {
                return Err(DexError::InsufficientLiquidity);
            }
            if to == token0 || to == token1 {
                return Err(DexError::InvalidRecipient);
            }

            // optimistic transfers
            if !amount0_out.is_zero() {
                self.runtime.safe_transfer(token0, self.address, to, amount0_out)?;
            }
            if !amount1_out.is_zero() {
                self.runtime.safe_transfer(token1, self.address, to, amount1_out)?;
            }

            let (balance0, balance1) = self.balances(token0, token1);
            let amount0_in = balance0.saturating_sub(reserve0 - amount0_out);
            let amount1_in = balance1.saturating_sub(reserve1 - amount1_out);
            if amount0_in.is_zero() && amount1_in.is_zero() {
                return Err(DexError::InsufficientInputAmount);
            }

            let adjusted0 = checked_sub(checked_mul(balance0, FEE_PRECISION)?, checked_mul(amount0_in, FEE_RATE)?)?;
            let adjusted1 = checked_sub(checked_mul(balance1, FEE_PRECISION)?, checked_mul(amount1_in, FEE_RATE)?)?;
            let k_before = checked_mul(checked_mul(reserve0, reserve1)?, FEE_PRECISION * FEE_PRECISION)?;
            if checked_mul(adjusted0, adjusted1)? < k_before {
                warn!(pair = %self.address, %amount0_in, %amount1_in, %amount0_out, %amount1_out, "Swap breaks K");
                return Err(DexError::InvariantViolation);
            }

            self.update(balance0, balance1)?;
            self.emit(DexEvent::Swap { sender: caller, amount0_in, amount1_in, amount0_out, amount1_out, to });
            info!(pair = %self.address, %to, %amount0_in, %amount1_in, %amount0_out, %amount1_out, "Swap");
            Ok(())
        })
    }

    /// Send any balance above the reserves to `to`.
    pub fn skim(&self, to: Address) -> DexResult<()> {
        self.runtime.atomic(self, || {
            let _lock = self.lock()?;
            let (token0, token1) = self.tokens()?;
            let (reserve0, reserve1) = self.get_reserves();
            let (balance0, balance1) = self.balances(token0, token1);
            let excess0 = checked_sub(balance0, reserve0)?;
            let excess1 = checked_sub(balance1, reserve1)?;
            if !excess0.is_zero() {
                self.runtime.safe_transfer(token0, self.address, to, excess0)?;
            }
            if !excess1.is_zero() {
                self.runtime.safe_transfer(token1, self.address, to, excess1)?;
            }
            debug!(pair = %self.address, %to, %excess0, %excess1, "Skim");
            Ok(())
        })
    }

    /// Force the reserves to match the balances.
    pub fn sync(&self) -> DexResult<()> {
        self.runtime.atomic(self, || {
            let _lock = self.lock()?;
            let (token0, token1) = self.tokens()?;
            let (balance0, balance1) = self.balances(token0, token1);
            self.update(balance0, balance1)
        })
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: U256) -> DexResult<()> {
        self.runtime.atomic(self, || {
            self.write().shares.approve(owner, spender, amount)?;
            self.emit(DexEvent::Approval { owner, spender, value: amount });
            Ok(())
        })
    }

    pub fn transfer(&self, from: Address, to: Address, amount: U256) -> DexResult<()> {
        self.runtime.atomic(self, || {
            self.write().shares.transfer(from, to, amount)?;
            self.emit(DexEvent::Transfer { from, to, value: amount });
            Ok(())
        })
    }

    /// Move shares of `from` with the allowance it granted to `spender`.
    pub fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: U256) -> DexResult<()> {
        self.runtime.atomic(self, || {
            {
                let mut state = self.write();
                state.shares.spend_allowance(from, spender, amount)?;
                state.shares.transfer(from, to, amount)?;
            }
            self.emit(DexEvent::Transfer { from, to, value: amount });
            Ok(())
        })
    }

    fn lock(&self) -> DexResult<LockGuard<'_>> {
        self.unlocked.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire).map_err(|_| {
            warn!(pair = %self.address, "Reentrant call rejected");
            DexError::Locked
        })?;
        Ok(LockGuard { unlocked: &self.unlocked })
    }

    fn view<T>(&self, read: impl FnOnce(&PairState) -> T) -> T {
        self.runtime.executor().run(|| read(&self.read()))
    }

    fn balances(&self, token0: Address, token1: Address) -> (U256, U256) {
        let ledger = self.runtime.ledger();
        (ledger.balance_of(token0, self.address), ledger.balance_of(token1, self.address))
    }

    fn update(&self, balance0: U256, balance1: U256) -> DexResult<()> {
        if balance0 > MAX_RESERVE || balance1 > MAX_RESERVE {
            return Err(DexError::Overflow);
        }
        {
            let mut state = self.write();
            state.reserve0 = balance0;
            state.reserve1 = balance1;
        }
        self.emit(DexEvent::Sync { reserve0: balance0, reserve1: balance1 });
        debug!(pair = %self.address, reserve0 = %balance0, reserve1 = %balance1, "Sync");
        Ok(())
    }

    fn mint_shares(&self, to: Address, amount: U256) -> DexResult<()> {
        self.write().shares.mint(to, amount)?;
        self.emit(DexEvent::Transfer { from: Address::ZERO, to, value: amount });
        Ok(())
    }

    fn burn_shares(&self, from: Address, amount: U256) -> DexResult<()> {
        self.write().shares.burn(from, amount)?;
        self.emit(DexEvent::Transfer { from, to: Address::ZERO, value: amount });
        Ok(())
    }

    fn emit(&self, event: DexEvent) {
        self.runtime.events().emit(self.address, event);
    }
}

impl<L> Revertible for Pair<L> {
    type Snapshot = PairState;

    fn snapshot(&self) -> PairState {
        self.read().clone()
    }

    fn restore(&self, snapshot: PairState) {
        *self.write() = snapshot;
    }
}
