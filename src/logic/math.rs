use crate::constants::{FEE_COMPLEMENT, FEE_PRECISION};
use crate::errors::{DexError, DexResult};
use alloy_primitives::U256;

pub(crate) fn checked_add(a: U256, b: U256) -> DexResult<U256> {
    a.checked_add(b).ok_or(DexError::Overflow)
}

pub(crate) fn checked_sub(a: U256, b: U256) -> DexResult<U256> {
    a.checked_sub(b).ok_or(DexError::Underflow)
}

pub(crate) fn checked_mul(a: U256, b: U256) -> DexResult<U256> {
    a.checked_mul(b).ok_or(DexError::Overflow)
}

/// Integer square root, rounded down (Babylonian method).
pub fn sqrt(y: U256) -> U256 {
    if y > U256::from(3) {
        let mut z = y;
        let mut x = y / U256::from(2) + U256::from(1);
        while x < z {
            z = x;
            x = (y / x + x) / U256::from(2);
        }
        z
    } else if y.is_zero() {
        U256::ZERO
    } else {
        U256::from(1)
    }
}

/// Amount of B worth `amount_a` of A at the current reserve ratio, without fee.
pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> DexResult<U256> {
    if amount_a.is_zero() {
        return Err(DexError::InsufficientAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    Ok(checked_mul(amount_a, reserve_b)? / reserve_a)
}

/// Largest output a swap of `amount_in` can take after the 0.3% fee.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> DexResult<U256> {
    if amount_in.is_zero() {
        return Err(DexError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    let amount_in_with_fee = checked_mul(amount_in, FEE_COMPLEMENT)?;
    let numerator = checked_mul(amount_in_with_fee, reserve_out)?;
    let denominator = checked_add(checked_mul(reserve_in, FEE_PRECISION)?, amount_in_with_fee)?;
    Ok(numerator / denominator)
}

/// Smallest input that buys exactly `amount_out`, rounded up by one unit.
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> DexResult<U256> {
    if amount_out.is_zero() {
        return Err(DexError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(DexError::InsufficientLiquidity);
    }
    let numerator = checked_mul(checked_mul(reserve_in, amount_out)?, FEE_PRECISION)?;
    let denominator = checked_mul(reserve_out - amount_out, FEE_COMPLEMENT)?;
    checked_add(numerator / denominator, U256::from(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(units: u64) -> U256 {
        U256::from(units) * U256::from(10).pow(U256::from(18))
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(sqrt(U256::ZERO), U256::ZERO);
        assert_eq!(sqrt(U256::from(3)), U256::from(1));
        assert_eq!(sqrt(U256::from(4)), U256::from(2));
        assert_eq!(sqrt(U256::from(99)), U256::from(9));
        assert_eq!(sqrt(ether(1) * ether(4)), ether(2));
        assert_eq!(sqrt(U256::MAX), U256::from(u128::MAX));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(ether(1), ether(1), ether(4)), Ok(ether(4)));
        assert_eq!(quote(U256::ZERO, ether(1), ether(4)), Err(DexError::InsufficientAmount));
        assert_eq!(quote(ether(1), U256::ZERO, ether(4)), Err(DexError::InsufficientLiquidity));
        assert_eq!(quote(U256::MAX, U256::from(1), U256::from(2)), Err(DexError::Overflow));
    }

    #[test]
    fn test_get_amount_out() {
        let amount_out = get_amount_out(ether(1_000), ether(999_000), ether(999_000));
        assert_eq!(amount_out, Ok(U256::from(996_005_988_017_964_053_892u128)));

        assert_eq!(get_amount_out(U256::from(1000), U256::from(1000), U256::from(1000)), Ok(U256::from(499)));
        assert_eq!(get_amount_out(U256::ZERO, ether(1), ether(1)), Err(DexError::InsufficientInputAmount));
        assert_eq!(get_amount_out(ether(1), ether(1), U256::ZERO), Err(DexError::InsufficientLiquidity));
    }

    #[test]
    fn test_get_amount_in() {
        let amount_in = get_amount_in(ether(996), ether(999_000), ether(999_000));
        assert_eq!(amount_in, Ok(U256::from(999_993_981_969_957_873_428u128)));

        assert_eq!(get_amount_in(U256::ZERO, ether(1), ether(1)), Err(DexError::InsufficientOutputAmount));
        assert_eq!(get_amount_in(ether(1), ether(1), ether(1)), Err(DexError::InsufficientLiquidity));
        assert_eq!(get_amount_in(ether(1), U256::ZERO, ether(2)), Err(DexError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_in_buys_at_least_amount_out() {
        let reserve_in = ether(3_000);
        let reserve_out = ether(7);
        for wanted in [U256::from(1), U256::from(12_345), ether(1), ether(6)] {
            let amount_in = get_amount_in(wanted, reserve_in, reserve_out).unwrap();
            let received = get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
            assert!(received >= wanted, "{wanted}: paid {amount_in} got {received}");
            if amount_in > U256::from(1) {
                let short = get_amount_out(amount_in - U256::from(1), reserve_in, reserve_out).unwrap_or_default();
                assert!(short <= received);
            }
        }
    }

    #[test]
    fn test_amount_out_never_costs_more_than_paid() {
        let reserves = [U256::from(1_000), ether(1), ether(7), ether(3_000), ether(999_000), U256::from(10).pow(U256::from(30))];
        let inputs = [U256::from(1), U256::from(1_000), U256::from(12_345), ether(1), ether(6), ether(1_000)];
        for reserve_in in reserves {
            for reserve_out in reserves {
                for amount_in in inputs {
                    let amount_out = get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
                    if amount_out.is_zero() {
                        continue;
                    }
                    let required = get_amount_in(amount_out, reserve_in, reserve_out).unwrap();
                    assert!(required <= amount_in, "{reserve_in}/{reserve_out}: paid {amount_in} requires {required}");
                }
            }
        }
    }
}
