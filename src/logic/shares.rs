use super::math::{checked_add, checked_sub};
use crate::constants::BURN_ADDRESS;
use crate::errors::{DexError, DexResult};
use ahash::AHashMap;
use alloy_primitives::{Address, U256};

/// Liquidity shares of one pair. Plain state; the pair emits the notifications.
#[derive(Clone, Debug, Default)]
pub struct ShareLedger {
    total_supply: U256,
    balances: AHashMap<Address, U256>,
    allowances: AHashMap<(Address, Address), U256>,
}

impl ShareLedger {
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, holder: Address) -> U256 {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> DexResult<()> {
        let total_supply = checked_add(self.total_supply, amount)?;
        let balance = checked_add(self.balance_of(to), amount)?;
        self.total_supply = total_supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> DexResult<()> {
        let balance = self.balance_of(from).checked_sub(amount).ok_or(DexError::InsufficientBalance)?;
        self.total_supply = checked_sub(self.total_supply, amount)?;
        self.balances.insert(from, balance);
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> DexResult<()> {
        if from == BURN_ADDRESS {
            return Err(DexError::InvalidSender);
        }
        let remaining = self.balance_of(from).checked_sub(amount).ok_or(DexError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let credited = checked_add(self.balance_of(to), amount)?;
        self.balances.insert(from, remaining);
        self.balances.insert(to, credited);
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> DexResult<()> {
        if owner == BURN_ADDRESS {
            return Err(DexError::InvalidSender);
        }
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    /// An unlimited (`U256::MAX`) allowance is never decremented.
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) -> DexResult<()> {
        let allowance = self.allowance(owner, spender);
        if allowance == U256::MAX {
            return Ok(());
        }
        let remaining = allowance.checked_sub(amount).ok_or(DexError::InsufficientAllowance)?;
        self.allowances.insert((owner, spender), remaining);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    #[test]
    fn test_mint_and_burn() {
        let mut shares = ShareLedger::default();
        shares.mint(ALICE, U256::from(100)).unwrap();
        shares.burn(ALICE, U256::from(40)).unwrap();

        assert_eq!(shares.total_supply(), U256::from(60));
        assert_eq!(shares.balance_of(ALICE), U256::from(60));
        assert_eq!(shares.burn(ALICE, U256::from(61)), Err(DexError::InsufficientBalance));
        assert_eq!(shares.mint(ALICE, U256::MAX), Err(DexError::Overflow));
        assert_eq!(shares.total_supply(), U256::from(60));
    }

    #[test]
    fn test_transfer() {
        let mut shares = ShareLedger::default();
        shares.mint(ALICE, U256::from(10)).unwrap();

        shares.transfer(ALICE, BOB, U256::from(3)).unwrap();
        shares.transfer(BOB, BOB, U256::from(3)).unwrap();
        assert_eq!(shares.balance_of(ALICE), U256::from(7));
        assert_eq!(shares.balance_of(BOB), U256::from(3));
        assert_eq!(shares.transfer(BOB, ALICE, U256::from(4)), Err(DexError::InsufficientBalance));
    }

    #[test]
    fn test_spend_allowance() {
        let mut shares = ShareLedger::default();
        shares.approve(ALICE, BOB, U256::from(5)).unwrap();
        shares.spend_allowance(ALICE, BOB, U256::from(2)).unwrap();
        assert_eq!(shares.allowance(ALICE, BOB), U256::from(3));
        assert_eq!(shares.spend_allowance(ALICE, BOB, U256::from(4)), Err(DexError::InsufficientAllowance));

        shares.approve(ALICE, BOB, U256::MAX).unwrap();
        shares.spend_allowance(ALICE, BOB, U256::from(1_000)).unwrap();
        assert_eq!(shares.allowance(ALICE, BOB), U256::MAX);
    }

    #[test]
    fn test_locked_shares_cannot_move() {
        let mut shares = ShareLedger::default();
        shares.mint(BURN_ADDRESS, U256::from(1_000)).unwrap();

        assert_eq!(shares.transfer(BURN_ADDRESS, BOB, U256::from(1_000)), Err(DexError::InvalidSender));
        assert_eq!(shares.approve(BURN_ADDRESS, BOB, U256::MAX), Err(DexError::InvalidSender));
        assert_eq!(shares.balance_of(BURN_ADDRESS), U256::from(1_000));
        assert_eq!(shares.allowance(BURN_ADDRESS, BOB), U256::ZERO);
    }
}
