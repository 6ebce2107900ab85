use alloy_primitives::{Address, B256, U256, address, b256};

/// Shares locked forever to [`BURN_ADDRESS`] by the first deposit into a pair.
pub const MINIMUM_LIQUIDITY: U256 = U256::from_limbs([1_000, 0, 0, 0]);

/// Holder of the locked minimum liquidity.
pub const BURN_ADDRESS: Address = Address::ZERO;

// Swap fee of 0.3%: `FEE_RATE / FEE_PRECISION`.
pub const FEE_RATE: U256 = U256::from_limbs([3, 0, 0, 0]);
pub const FEE_PRECISION: U256 = U256::from_limbs([1_000, 0, 0, 0]);
/// Part of every input that is left after the fee (`FEE_PRECISION - FEE_RATE`).
pub const FEE_COMPLEMENT: U256 = U256::from_limbs([997, 0, 0, 0]);

/// Upper bound of a pair reserve, `2^112 - 1`.
pub const MAX_RESERVE: U256 = U256::from_limbs([u64::MAX, (1 << 48) - 1, 0, 0]);

/// Leading byte of the deterministic pair address preimage.
pub const CREATE2_PREFIX: u8 = 0xff;

/// Code tag whose keccak hash is the default pair code fingerprint.
pub const PAIR_CODE: &[u8] = b"pair-exchange/Pair/v1";

pub const DEFAULT_FACTORY_ADDRESS: Address = address!("0x00000000000000000000000000000000000fac70");
pub const DEFAULT_ROUTER_ADDRESS: Address = address!("0x000000000000000000000000000000000000a070");

/// Deployments whose pair addresses are public, used to cross-check address derivation.
#[non_exhaustive]
pub struct KnownDeployment;

impl KnownDeployment {
    pub const UNISWAP_V2_FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
    pub const UNISWAP_V2_INIT_CODE_HASH: B256 = b256!("0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
}
