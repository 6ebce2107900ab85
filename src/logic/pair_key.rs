use crate::constants::{CREATE2_PREFIX, PAIR_CODE};
use crate::errors::{DexError, DexResult};
use alloy_primitives::{Address, B256, keccak256};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Canonical, order-independent identity of a pair: `token0 < token1`.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PairKey {
    pub token0: Address,
    pub token1: Address,
}

impl PairKey {
    pub fn new(token_a: Address, token_b: Address) -> DexResult<Self> {
        if token_a == token_b {
            return Err(DexError::IdenticalTokens);
        }
        let (token0, token1) = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };
        if token0 == Address::ZERO {
            return Err(DexError::ZeroIdentity);
        }
        Ok(PairKey { token0, token1 })
    }

    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// Token on the other side of `token`, if `token` belongs to the pair.
    pub fn other(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    /// `keccak256(token0 ‖ token1)`, the packed 40-byte encoding.
    pub fn salt(&self) -> B256 {
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(self.token0.as_slice());
        packed[20..].copy_from_slice(self.token1.as_slice());
        keccak256(packed)
    }

    /// Deterministic address `keccak256(0xff ‖ factory ‖ salt ‖ code_hash)[12..]`.
    pub fn pair_address(&self, factory: Address, code_hash: B256) -> Address {
        let mut preimage = [0u8; 85];
        preimage[0] = CREATE2_PREFIX;
        preimage[1..21].copy_from_slice(factory.as_slice());
        preimage[21..53].copy_from_slice(self.salt().as_slice());
        preimage[53..].copy_from_slice(code_hash.as_slice());
        Address::from_word(keccak256(preimage))
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

impl Debug for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PairKey({}, {})", self.token0, self.token1)
    }
}

pub fn sort_tokens(token_a: Address, token_b: Address) -> DexResult<(Address, Address)> {
    let key = PairKey::new(token_a, token_b)?;
    Ok((key.token0, key.token1))
}

/// Address the pair of `token_a` and `token_b` has (or will have), without any registry lookup.
pub fn pair_for(factory: Address, code_hash: B256, token_a: Address, token_b: Address) -> DexResult<Address> {
    Ok(PairKey::new(token_a, token_b)?.pair_address(factory, code_hash))
}

pub fn default_pair_code_hash() -> B256 {
    keccak256(PAIR_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::KnownDeployment;
    use alloy_primitives::address;

    const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

    #[test]
    fn test_sorts_tokens() {
        let a = Address::repeat_byte(0x22);
        let b = Address::repeat_byte(0x11);
        assert_eq!(sort_tokens(a, b), Ok((b, a)));
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(sort_tokens(a, a), Err(DexError::IdenticalTokens));
        assert_eq!(sort_tokens(a, Address::ZERO), Err(DexError::ZeroIdentity));
        assert_eq!(sort_tokens(Address::ZERO, Address::ZERO), Err(DexError::IdenticalTokens));
    }

    #[test]
    fn test_matches_public_deployment() {
        let pair = pair_for(KnownDeployment::UNISWAP_V2_FACTORY, KnownDeployment::UNISWAP_V2_INIT_CODE_HASH, WETH, USDC);
        assert_eq!(pair, Ok(address!("0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc")));
    }

    #[test]
    fn test_agrees_with_create2() {
        let key = PairKey::new(Address::repeat_byte(0x11), Address::repeat_byte(0x22)).unwrap();
        let factory = Address::repeat_byte(0xfa);
        let code_hash = default_pair_code_hash();

        let expected = factory.create2(key.salt().0, code_hash.0);
        assert_eq!(key.pair_address(factory, code_hash), expected);
        assert_ne!(key.pair_address(Address::repeat_byte(0xfb), code_hash), expected);
    }

    #[test]
    fn test_other() {
        let key = PairKey::new(Address::repeat_byte(0x11), Address::repeat_byte(0x22)).unwrap();
        assert_eq!(key.other(Address::repeat_byte(0x11)), Some(Address::repeat_byte(0x22)));
        assert_eq!(key.other(Address::repeat_byte(0x33)), None);
        assert!(key.contains(Address::repeat_byte(0x22)));
        assert_eq!(key.to_string(), format!("{}/{}", Address::repeat_byte(0x11), Address::repeat_byte(0x22)));
    }

    #[test]
    fn test_serialize_pair_key() {
        let key = PairKey::new(Address::repeat_byte(0x22), Address::repeat_byte(0x11)).unwrap();
        let serialized = serde_json::to_string(&key).unwrap();
        let deserialized: PairKey = serde_json::from_str(&serialized).unwrap();
        assert_eq!(key, deserialized);
    }
}
